// Trait for launching the external refresh program and preview viewer
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` to completion and return its exit code (`None` if killed by a signal)
    async fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> anyhow::Result<Option<i32>>;
}
