use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("invalid transcript: {0}")]
    InvalidTranscript(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_error() {
        let err = CoreError::UnknownRole("tool".to_string());
        assert_eq!(err.to_string(), "unknown role: tool");
    }

    #[test]
    fn test_invalid_transcript_error() {
        let err = CoreError::InvalidTranscript("expected an array".to_string());
        assert_eq!(err.to_string(), "invalid transcript: expected an array");
    }

    #[test]
    fn test_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json");
        let err = CoreError::from(json_err.unwrap_err());
        assert!(err.to_string().contains("expected"));
    }
}
