pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{ExecHandoff, MigrationCli, TcpProbe};
pub use config::{toml_config::TomlConfig, Overrides, Settings};
pub use crate::core::{engine::Entrypoint, migration::MigrationRunner, readiness::ReadinessGate};
pub use domain::model::{CommandLine, Endpoint};
pub use utils::error::{EntrypointError, Result};
