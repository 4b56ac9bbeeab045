use super::args::BashArgs;
use super::error::BashError;
use crate::tools::ToolOutput;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::process::Command;

#[derive(Default)]
pub struct BashExecutor {
    working_dir: Option<PathBuf>,
}

impl BashExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub async fn run(&self, args: &BashArgs) -> Result<ToolOutput, BashError> {
        if args.command.trim().is_empty() {
            return Err(BashError::EmptyCommand);
        }

        let timeout = Duration::from_secs(args.timeout);
        let start = Instant::now();

        let mut cmd = Command::new("/bin/bash");
        cmd.arg("-c").arg(&args.command).kill_on_drop(true);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let output = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| BashError::Timeout(args.timeout))?
            .map_err(|e| BashError::SpawnFailed(e.to_string()))?;

        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
