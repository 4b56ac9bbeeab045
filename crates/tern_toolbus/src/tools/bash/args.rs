use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct BashArgs {
    pub command: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_timeout() -> u64 {
    crate::tools::default_timeout().as_secs()
}
