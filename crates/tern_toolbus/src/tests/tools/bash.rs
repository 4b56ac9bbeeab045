use crate::tools::{Bash, BashArgs, BashExecutor, Tool, ToolOutput};
use serde_json::json;
use tern_core::ToolOutcome;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().unwrap()
}

#[test]
fn test_bash_schema_parses() {
    let bash = Bash::new();
    assert_eq!(bash.name(), "bash");
    assert!(bash.description().contains("shell command"));

    let schema = bash.parameters_schema();
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["required"], json!(["command"]));
}

#[test]
fn test_bash_args_defaults() {
    let args: BashArgs = serde_json::from_value(json!({"command": "echo hello"})).unwrap();
    assert_eq!(args.command, "echo hello");
    assert_eq!(args.timeout, 120);
}

#[test]
fn test_bash_args_with_timeout() {
    let args: BashArgs =
        serde_json::from_value(json!({"command": "echo hello", "timeout": 30})).unwrap();
    assert_eq!(args.timeout, 30);
}

#[test]
fn test_output_success_appends_stderr() {
    let output = ToolOutput {
        stdout: "built".to_string(),
        stderr: "warning: unused".to_string(),
        exit_code: 0,
        duration_ms: 5,
    };
    assert_eq!(output.into_outcome(), ToolOutcome::success("built\nwarning: unused"));
}

#[test]
fn test_output_failure_keeps_stdout() {
    let output = ToolOutput {
        stdout: "partial".to_string(),
        stderr: "no such file\n".to_string(),
        exit_code: 2,
        duration_ms: 5,
    };
    let outcome = output.into_outcome();
    assert_eq!(outcome.error.as_deref(), Some("exit code 2: no such file"));
    assert_eq!(outcome.output.as_deref(), Some("partial"));
}

#[test]
fn test_bash_execute_ls() {
    let rt = runtime();
    rt.block_on(async {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();

        let bash = Bash::new().with_working_dir(dir.path());
        let outcome = bash.execute(json!({"command": "ls"})).await.unwrap();
        assert_eq!(outcome, ToolOutcome::success("a.txt\nb.txt\n"));
    });
}

#[test]
fn test_bash_execute_nonzero_exit() {
    let rt = runtime();
    rt.block_on(async {
        let bash = Bash::new();
        let outcome = bash
            .execute(json!({"command": "echo out; echo bad >&2; exit 3"}))
            .await
            .unwrap();
        assert_eq!(outcome.error.as_deref(), Some("exit code 3: bad"));
        assert_eq!(outcome.output.as_deref(), Some("out\n"));
    });
}

#[test]
fn test_bash_timeout_is_err() {
    let rt = runtime();
    rt.block_on(async {
        let executor = BashExecutor::new();
        let args: BashArgs =
            serde_json::from_value(json!({"command": "sleep 5", "timeout": 1})).unwrap();
        let err = executor.run(&args).await.unwrap_err();
        assert_eq!(err.to_string(), "Command timed out after 1 seconds");
    });
}

#[test]
fn test_bash_empty_command_is_err() {
    let rt = runtime();
    rt.block_on(async {
        let bash = Bash::new();
        assert!(bash.execute(json!({"command": "  "})).await.is_err());
    });
}
