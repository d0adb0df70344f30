use crate::config::Overrides;
use crate::utils::logger::LogFormat;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "entrygate")]
#[command(about = "Wait for the database, apply migrations, then exec the application")]
pub struct CliConfig {
    /// Optional TOML config file (flags and environment variables take precedence)
    #[arg(short, long, env = "ENTRYGATE_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "DB_HOST")]
    pub db_host: Option<String>,

    #[arg(long, env = "DB_PORT")]
    pub db_port: Option<u16>,

    /// Used for the endpoint when host/port are not given, and exported to the migration tool
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "SKIP_WAIT")]
    pub skip_wait: bool,

    #[arg(long, env = "WAIT_INTERVAL_MS")]
    pub wait_interval_ms: Option<u64>,

    #[arg(long, env = "CONNECT_TIMEOUT_MS")]
    pub connect_timeout_ms: Option<u64>,

    /// Give up waiting after this many seconds (default: wait forever)
    #[arg(long, env = "WAIT_TIMEOUT_SECS")]
    pub wait_timeout_secs: Option<u64>,

    #[arg(long, env = "SKIP_MIGRATIONS")]
    pub skip_migrations: bool,

    #[arg(long, env = "MIGRATIONS_DIR")]
    pub migrations_dir: Option<PathBuf>,

    #[arg(long, env = "MIGRATE_PROGRAM")]
    pub migrate_program: Option<String>,

    #[arg(long, env = "ALEMBIC_CONFIG")]
    pub migrate_config: Option<PathBuf>,

    /// Do not generate an initial revision when none exist
    #[arg(long)]
    pub no_autogenerate: bool,

    #[arg(long)]
    pub migration_message: Option<String>,

    #[arg(long)]
    pub migration_target: Option<String>,

    /// Environment variables that must be set and non-empty before starting
    #[arg(long, env = "REQUIRED_ENV", value_delimiter = ',')]
    pub require_env: Vec<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(long, help = "Log per-stage startup timings")]
    pub monitor: bool,

    /// Print the resolved startup plan as JSON and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Application command, exec'd verbatim after startup
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<OsString>,
}

impl CliConfig {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            db_host: self.db_host.clone(),
            db_port: self.db_port,
            database_url: self.database_url.clone(),
            skip_wait: self.skip_wait,
            wait_interval_ms: self.wait_interval_ms,
            connect_timeout_ms: self.connect_timeout_ms,
            wait_timeout_secs: self.wait_timeout_secs,
            skip_migrations: self.skip_migrations,
            migrations_dir: self.migrations_dir.clone(),
            migrate_program: self.migrate_program.clone(),
            migrate_config: self.migrate_config.clone(),
            no_autogenerate: self.no_autogenerate,
            migration_message: self.migration_message.clone(),
            migration_target: self.migration_target.clone(),
            require_env: self
                .require_env
                .iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
            command: self.command.clone(),
        }
    }
}
