// Transport trait for telemetry endpoint access
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryTransport: Send + Sync {
    /// GET `path` on the telemetry host and return the body of a successful response
    async fn get(&self, path: &str) -> anyhow::Result<String>;
}
