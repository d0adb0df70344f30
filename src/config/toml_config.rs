use crate::utils::error::{EntrypointError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Optional file layer, below flags and environment variables. Every field is
/// optional so a file only needs to name what it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub wait: WaitSection,
    #[serde(default)]
    pub migrations: MigrationsSection,
    #[serde(default)]
    pub startup: StartupSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitSection {
    pub enabled: Option<bool>,
    pub interval_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationsSection {
    pub enabled: Option<bool>,
    pub directory: Option<PathBuf>,
    pub program: Option<String>,
    pub config_file: Option<PathBuf>,
    pub autogenerate: Option<bool>,
    pub message: Option<String>,
    pub target: Option<String>,
    pub revision_extension: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartupSection {
    pub command: Option<Vec<String>>,
    pub required_env: Option<Vec<String>>,
}

impl TomlConfig {
    /// Loads and substitutes a config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            EntrypointError::config(format!(
                "Cannot read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content, |name| std::env::var(name).ok())?;

        toml::from_str(&processed_content).map_err(|e| EntrypointError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Expands `${VAR}` and `${VAR:-default}`. An unset `${VAR}` without a default
    /// is left as written.
    pub fn substitute_env_vars<F>(content: &str, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").map_err(|e| {
            EntrypointError::config(format!("Invalid substitution pattern: {}", e))
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match (lookup(var_name), caps.get(2)) {
                (Some(value), _) => value,
                (None, Some(default)) => default.as_str().to_string(),
                (None, None) => caps[0].to_string(),
            }
        });

        Ok(result.into_owned())
    }
}
