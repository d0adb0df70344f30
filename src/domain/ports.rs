use crate::domain::model::{CommandLine, Endpoint};
use crate::utils::error::Result;
use async_trait::async_trait;

/// A single readiness check. An error means "not ready yet", never a fatal condition.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, endpoint: &Endpoint) -> std::io::Result<()>;
}

#[async_trait]
pub trait MigrationTool: Send + Sync {
    async fn generate(&self, message: &str) -> Result<()>;
    async fn upgrade(&self, target: &str) -> Result<()>;
}

/// Replaces the running process. Real implementations only return on failure.
pub trait Handoff: Send + Sync {
    fn exec(&self, command: &CommandLine) -> Result<()>;
}
