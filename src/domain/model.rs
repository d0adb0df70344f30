use crate::utils::error::{EntrypointError, Result};
use serde::Serialize;
use std::ffi::OsString;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// The program to hand the process over to, with its arguments kept byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl CommandLine {
    pub fn from_argv<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv
            .next()
            .ok_or_else(|| EntrypointError::MissingConfigError {
                field: "command".to_string(),
            })?;
        if program.is_empty() {
            return Err(EntrypointError::InvalidConfigValueError {
                field: "command".to_string(),
                value: String::new(),
                reason: "Program name cannot be empty".to_string(),
            });
        }

        Ok(Self {
            program,
            args: argv.collect(),
        })
    }

    pub fn argv(&self) -> Vec<OsString> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Lossy rendering for logs and dry-run output.
    pub fn display_argv(&self) -> Vec<String> {
        self.argv()
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitReport {
    pub endpoint: Endpoint,
    pub attempts: u32,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub revisions_found: usize,
    pub generated: bool,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupReport {
    pub wait: Option<WaitReport>,
    pub migrations: Option<MigrationReport>,
}
