#[cfg(feature = "cli")]
pub mod cli;
pub mod database;
pub mod toml_config;

use crate::adapters::migration_cli::DEFAULT_PROGRAM;
use crate::core::migration::{DEFAULT_MESSAGE, DEFAULT_REVISION_EXTENSION, DEFAULT_TARGET};
use crate::domain::model::{CommandLine, Endpoint};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_required_env,
    Validate,
};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_DB_HOST: &str = "postgres";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_WAIT_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_MIGRATIONS_DIR: &str = "migrations/versions";
pub const DEFAULT_COMMAND: [&str; 6] = [
    "uvicorn",
    "app.main:app",
    "--host",
    "0.0.0.0",
    "--port",
    "8000",
];

/// Values given on the command line or through the environment. These win over
/// the config file, which wins over the built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub db_host: Option<String>,
    pub db_port: Option<u16>,
    pub database_url: Option<String>,
    pub skip_wait: bool,
    pub wait_interval_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub wait_timeout_secs: Option<u64>,
    pub skip_migrations: bool,
    pub migrations_dir: Option<PathBuf>,
    pub migrate_program: Option<String>,
    pub migrate_config: Option<PathBuf>,
    pub no_autogenerate: bool,
    pub migration_message: Option<String>,
    pub migration_target: Option<String>,
    pub require_env: Vec<String>,
    pub command: Vec<OsString>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSettings {
    pub enabled: bool,
    pub interval: Duration,
    pub connect_timeout: Duration,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSettings {
    pub enabled: bool,
    pub directory: PathBuf,
    pub program: String,
    pub config_file: Option<PathBuf>,
    pub autogenerate: bool,
    pub message: String,
    pub target: String,
    pub revision_extension: String,
}

/// Fully resolved startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: Endpoint,
    pub database_url: Option<String>,
    pub wait: WaitSettings,
    pub migrations: MigrationSettings,
    pub required_env: Vec<String>,
    pub command: CommandLine,
}

impl Settings {
    pub fn resolve(overrides: &Overrides, file: TomlConfig) -> Result<Self> {
        let TomlConfig {
            database: db_file,
            wait: wait_file,
            migrations: migrations_file,
            startup: startup_file,
        } = file;

        // Readiness gate
        let wait = WaitSettings {
            enabled: !overrides.skip_wait && wait_file.enabled.unwrap_or(true),
            interval: Duration::from_millis(
                overrides
                    .wait_interval_ms
                    .or(wait_file.interval_ms)
                    .unwrap_or(DEFAULT_WAIT_INTERVAL_MS),
            ),
            connect_timeout: Duration::from_millis(
                overrides
                    .connect_timeout_ms
                    .or(wait_file.connect_timeout_ms)
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
            ),
            timeout: overrides
                .wait_timeout_secs
                .or(wait_file.timeout_secs)
                .map(Duration::from_secs),
        };

        // The URL is only parsed for an endpoint when something will probe it.
        let database_url = overrides.database_url.clone().or(db_file.url);
        let host = overrides.db_host.as_deref().or(db_file.host.as_deref());
        let port = overrides.db_port.or(db_file.port);
        let endpoint = if wait.enabled {
            database::resolve_endpoint(
                host,
                port,
                database_url.as_deref(),
                DEFAULT_DB_HOST,
                DEFAULT_DB_PORT,
            )?
        } else {
            Endpoint::new(host.unwrap_or(DEFAULT_DB_HOST), port.unwrap_or(DEFAULT_DB_PORT))
        };

        // Migrations
        let migrations = MigrationSettings {
            enabled: !overrides.skip_migrations && migrations_file.enabled.unwrap_or(true),
            directory: overrides
                .migrations_dir
                .clone()
                .or(migrations_file.directory)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MIGRATIONS_DIR)),
            program: overrides
                .migrate_program
                .clone()
                .or(migrations_file.program)
                .unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
            config_file: overrides.migrate_config.clone().or(migrations_file.config_file),
            autogenerate: !overrides.no_autogenerate && migrations_file.autogenerate.unwrap_or(true),
            message: overrides
                .migration_message
                .clone()
                .or(migrations_file.message)
                .unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            target: overrides
                .migration_target
                .clone()
                .or(migrations_file.target)
                .unwrap_or_else(|| DEFAULT_TARGET.to_string()),
            revision_extension: migrations_file
                .revision_extension
                .unwrap_or_else(|| DEFAULT_REVISION_EXTENSION.to_string()),
        };

        // Startup
        let required_env = if overrides.require_env.is_empty() {
            startup_file.required_env.unwrap_or_default()
        } else {
            overrides.require_env.clone()
        };

        let command = if !overrides.command.is_empty() {
            CommandLine::from_argv(overrides.command.clone())?
        } else if let Some(command) = startup_file.command {
            CommandLine::from_argv(command)?
        } else {
            CommandLine::from_argv(DEFAULT_COMMAND)?
        };

        Ok(Self {
            endpoint,
            database_url,
            wait,
            migrations,
            required_env,
            command,
        })
    }

    /// JSON summary for `--dry-run`. The database password is masked.
    pub fn plan(&self) -> serde_json::Value {
        serde_json::json!({
            "wait": {
                "enabled": self.wait.enabled,
                "endpoint": self.endpoint,
                "interval_ms": self.wait.interval.as_millis() as u64,
                "connect_timeout_ms": self.wait.connect_timeout.as_millis() as u64,
                "timeout_secs": self.wait.timeout.map(|t| t.as_secs()),
            },
            "migrations": {
                "enabled": self.migrations.enabled,
                "directory": self.migrations.directory,
                "program": self.migrations.program,
                "config_file": self.migrations.config_file,
                "autogenerate": self.migrations.autogenerate,
                "message": self.migrations.message,
                "target": self.migrations.target,
                "database_url": self.database_url.as_deref().map(database::redact),
            },
            "required_env": self.required_env,
            "command": self.command.display_argv(),
        })
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        if self.wait.enabled {
            validate_non_empty_string("database.host", &self.endpoint.host)?;
            validate_positive_number("database.port", u64::from(self.endpoint.port), 1)?;
            validate_positive_number("wait.interval_ms", self.wait.interval.as_millis() as u64, 1)?;
            validate_positive_number(
                "wait.connect_timeout_ms",
                self.wait.connect_timeout.as_millis() as u64,
                1,
            )?;
        }

        if self.migrations.enabled {
            validate_path("migrations.directory", &self.migrations.directory)?;
            validate_non_empty_string("migrations.program", &self.migrations.program)?;
            validate_non_empty_string("migrations.target", &self.migrations.target)?;
            validate_non_empty_string(
                "migrations.revision_extension",
                &self.migrations.revision_extension,
            )?;
            if let Some(config_file) = &self.migrations.config_file {
                validate_path("migrations.config_file", config_file)?;
            }
        }

        validate_required_env(&self.required_env, |name| std::env::var(name).ok())
    }
}
