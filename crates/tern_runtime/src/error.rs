//! Runtime error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The request could not be sent or the service rejected it.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response stream broke off or was malformed.
    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Turn cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<tern_llms::Error> for RuntimeError {
    fn from(err: tern_llms::Error) -> Self {
        use tern_llms::Error;
        match err {
            Error::Stream(_) | Error::InvalidResponse(_) | Error::Json(_) => {
                RuntimeError::Stream(err.to_string())
            }
            Error::MissingApiKey(_) | Error::ProviderNotFound(_) => {
                RuntimeError::Config(err.to_string())
            }
            Error::Http(_) | Error::Provider(_) | Error::Other(_) => {
                RuntimeError::Transport(err.to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
