use crate::config::database::normalize_sync_url;
use crate::domain::ports::MigrationTool;
use crate::utils::error::{EntrypointError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

pub const DEFAULT_PROGRAM: &str = "alembic";

/// Drives an alembic-style migration CLI:
///
/// - `<program> [-c cfg] revision --autogenerate -m <message>`
/// - `<program> [-c cfg] upgrade <target>`
///
/// Output is inherited so the tool's own logs land in the container log.
#[derive(Debug, Clone)]
pub struct MigrationCli {
    program: String,
    config_file: Option<PathBuf>,
    database_url: Option<String>,
}

impl MigrationCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            config_file: None,
            database_url: None,
        }
    }

    pub fn with_config_file(mut self, config_file: Option<PathBuf>) -> Self {
        self.config_file = config_file;
        self
    }

    /// The tool runs a sync engine, so async driver URLs are rewritten before
    /// being exported as `DATABASE_URL`.
    pub fn with_database_url(mut self, database_url: Option<&str>) -> Self {
        self.database_url = database_url.map(normalize_sync_url);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn generate_args(&self, message: &str) -> Vec<String> {
        let mut args = self.base_args();
        args.extend([
            "revision".to_string(),
            "--autogenerate".to_string(),
            "-m".to_string(),
            message.to_string(),
        ]);
        args
    }

    pub fn upgrade_args(&self, target: &str) -> Vec<String> {
        let mut args = self.base_args();
        args.extend(["upgrade".to_string(), target.to_string()]);
        args
    }

    fn base_args(&self) -> Vec<String> {
        match &self.config_file {
            Some(path) => vec!["-c".to_string(), path.to_string_lossy().into_owned()],
            None => Vec::new(),
        }
    }

    async fn invoke(&self, stage: &str, args: Vec<String>) -> Result<()> {
        tracing::debug!("Running {} {:?}", self.program, args);

        let mut command = Command::new(&self.program);
        command.args(&args).kill_on_drop(true);
        if let Some(url) = &self.database_url {
            command.env("DATABASE_URL", url);
        }

        let status = command
            .status()
            .await
            .map_err(|source| EntrypointError::CommandSpawn {
                stage: stage.to_string(),
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(EntrypointError::CommandFailed {
                stage: stage.to_string(),
                program: self.program.clone(),
                status: status.code(),
            })
        }
    }
}

impl Default for MigrationCli {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

#[async_trait]
impl MigrationTool for MigrationCli {
    async fn generate(&self, message: &str) -> Result<()> {
        self.invoke("revision", self.generate_args(message)).await
    }

    async fn upgrade(&self, target: &str) -> Result<()> {
        self.invoke("upgrade", self.upgrade_args(target)).await
    }
}
