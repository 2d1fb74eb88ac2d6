// Child process launcher
use crate::application::command_runner::CommandRunner;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Result<Option<i32>> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        tracing::debug!("Running {} {:?} in {:?}", program, args, cwd);
        let status = command
            .status()
            .await
            .with_context(|| format!("Failed to start {}", program))?;

        Ok(status.code())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exit_codes() {
        let runner = ProcessRunner;
        assert_eq!(runner.run("true", &[], None).await.unwrap(), Some(0));
        assert_eq!(runner.run("false", &[], None).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let runner = ProcessRunner;
        assert!(runner.run("./definitely-not-here", &[], None).await.is_err());
    }

    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner;
        let args = vec!["-c".to_string(), "touch ran-here".to_string()];
        runner.run("sh", &args, Some(dir.path())).await.unwrap();
        assert!(dir.path().join("ran-here").exists());
    }
}
