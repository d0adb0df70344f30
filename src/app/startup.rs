use crate::adapters::{ExecHandoff, MigrationCli, TcpProbe};
use crate::config::toml_config::TomlConfig;
use crate::config::{Overrides, Settings};
use crate::core::engine::Entrypoint;
use crate::core::migration::MigrationRunner;
use crate::core::readiness::ReadinessGate;
use crate::utils::error::Result;
use std::path::Path;

pub type ProductionEntrypoint = Entrypoint<TcpProbe, MigrationCli, ExecHandoff>;

/// Resolves settings from overrides and an optional config file.
pub fn load_settings(overrides: &Overrides, config_path: Option<&Path>) -> Result<Settings> {
    let file = match config_path {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            TomlConfig::from_file(path)?
        }
        None => TomlConfig::default(),
    };
    Settings::resolve(overrides, file)
}

pub fn readiness_gate(settings: &Settings) -> Option<ReadinessGate<TcpProbe>> {
    if !settings.wait.enabled {
        return None;
    }

    Some(
        ReadinessGate::new(
            TcpProbe::new(settings.wait.connect_timeout),
            settings.endpoint.clone(),
            settings.wait.interval,
        )
        .with_timeout(settings.wait.timeout),
    )
}

pub fn migration_runner(settings: &Settings) -> Option<MigrationRunner<MigrationCli>> {
    let migrations = &settings.migrations;
    if !migrations.enabled {
        return None;
    }

    let tool = MigrationCli::new(migrations.program.clone())
        .with_config_file(migrations.config_file.clone())
        .with_database_url(settings.database_url.as_deref());

    Some(
        MigrationRunner::new(tool, migrations.directory.clone())
            .with_extension(migrations.revision_extension.clone())
            .with_autogenerate(migrations.autogenerate)
            .with_message(migrations.message.clone())
            .with_target(migrations.target.clone()),
    )
}

pub fn build_entrypoint(settings: &Settings, monitor_enabled: bool) -> ProductionEntrypoint {
    Entrypoint::new_with_monitoring(
        readiness_gate(settings),
        migration_runner(settings),
        ExecHandoff,
        monitor_enabled,
    )
}
