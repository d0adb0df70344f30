use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EntrypointError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Required environment variable {name} is not set")]
    MissingEnvironment { name: String },

    #[error("{endpoint} not reachable after {attempts} attempts ({waited:?})")]
    ReadinessTimeout {
        endpoint: String,
        attempts: u32,
        waited: Duration,
    },

    #[error("Failed to start {program} for {stage}: {source}")]
    CommandSpawn {
        stage: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} failed: {program} exited with {}", describe_status(.status))]
    CommandFailed {
        stage: String,
        program: String,
        status: Option<i32>,
    },

    #[error("Failed to exec {}: {source}", .program.display())]
    ExecFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Startup interrupted by {signal}")]
    Interrupted { signal: &'static str },
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "no status (killed by signal)".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Migration,
    Process,
    System,
}

/// Every severity aborts startup; they only differ in exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EntrypointError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::MissingEnvironment { .. } => ErrorCategory::Configuration,
            Self::ReadinessTimeout { .. } => ErrorCategory::Network,
            Self::CommandSpawn { .. } | Self::CommandFailed { .. } => ErrorCategory::Migration,
            Self::ExecFailed { .. } | Self::Interrupted { .. } => ErrorCategory::Process,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ReadinessTimeout { .. } | Self::Interrupted { .. } => ErrorSeverity::Medium,
            Self::ExecFailed { .. } | Self::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupted { signal: "SIGINT" } => 130,
            Self::Interrupted { .. } => 143,
            _ => match self.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            },
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Check the flags, environment variables and config file passed to entrygate"
                    .to_string()
            }
            Self::MissingConfigError { field } => {
                format!("Provide a value for {}", field)
            }
            Self::MissingEnvironment { name } => {
                format!("Set {} in the container environment; no default is supplied", name)
            }
            Self::ReadinessTimeout { endpoint, .. } => format!(
                "Make sure the database at {} is running, or raise --wait-timeout-secs",
                endpoint
            ),
            Self::CommandSpawn { program, .. } => {
                format!("Install {} in the image or set --migrate-program", program)
            }
            Self::CommandFailed { .. } => {
                "Inspect the migration tool output above and fix the failing revision".to_string()
            }
            Self::ExecFailed { .. } => {
                "Check that the application command exists and is executable".to_string()
            }
            Self::Interrupted { .. } => "Startup was cancelled; restart the container".to_string(),
            Self::IoError(_) => "Check file permissions on the migrations directory".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid startup configuration: {}", self),
            ErrorCategory::Network => format!("Database never became ready: {}", self),
            ErrorCategory::Migration => format!("Schema migration failed: {}", self),
            ErrorCategory::Process => format!("Could not start the application: {}", self),
            ErrorCategory::System => format!("System error during startup: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EntrypointError>;
