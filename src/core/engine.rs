use crate::core::migration::MigrationRunner;
use crate::core::readiness::ReadinessGate;
use crate::domain::model::{CommandLine, StartupReport};
use crate::domain::ports::{Handoff, MigrationTool, Probe};
use crate::utils::error::{EntrypointError, Result};
use crate::utils::monitor::StartupMonitor;
use std::future::Future;

/// Runs the startup sequence: readiness gate, migrations, then handoff.
/// A failing step stops the sequence; later steps never run.
pub struct Entrypoint<P: Probe, M: MigrationTool, H: Handoff> {
    gate: Option<ReadinessGate<P>>,
    migrations: Option<MigrationRunner<M>>,
    handoff: H,
    monitor: StartupMonitor,
}

impl<P: Probe, M: MigrationTool, H: Handoff> Entrypoint<P, M, H> {
    pub fn new(
        gate: Option<ReadinessGate<P>>,
        migrations: Option<MigrationRunner<M>>,
        handoff: H,
    ) -> Self {
        Self::new_with_monitoring(gate, migrations, handoff, false)
    }

    pub fn new_with_monitoring(
        gate: Option<ReadinessGate<P>>,
        migrations: Option<MigrationRunner<M>>,
        handoff: H,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            gate,
            migrations,
            handoff,
            monitor: StartupMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self, command: &CommandLine) -> Result<StartupReport> {
        self.run_with_shutdown(command, std::future::pending()).await
    }

    /// Like [`run`](Self::run), but the wait and migrate steps race `shutdown`.
    /// When `shutdown` resolves first the sequence is abandoned (any running
    /// migration child is killed) and the command is never started.
    pub async fn run_with_shutdown<F>(
        &self,
        command: &CommandLine,
        shutdown: F,
    ) -> Result<StartupReport>
    where
        F: Future<Output = &'static str>,
    {
        let report = tokio::select! {
            report = self.prepare() => report?,
            signal = shutdown => {
                tracing::warn!("Received {}, aborting startup", signal);
                return Err(EntrypointError::Interrupted { signal });
            }
        };

        self.monitor.log_final_stats();
        self.handoff.exec(command)?;
        Ok(report)
    }

    async fn prepare(&self) -> Result<StartupReport> {
        let mut report = StartupReport::default();

        match &self.gate {
            Some(gate) => {
                report.wait = Some(gate.wait().await?);
                self.monitor.record("wait");
            }
            None => tracing::info!("Readiness gate disabled, not waiting for the database"),
        }

        match &self.migrations {
            Some(runner) => {
                report.migrations = Some(runner.run().await?);
                self.monitor.record("migrate");
            }
            None => tracing::info!("Migrations disabled, skipping"),
        }

        Ok(report)
    }
}
