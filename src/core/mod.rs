pub mod engine;
pub mod migration;
pub mod readiness;

pub use crate::domain::model::{CommandLine, Endpoint, MigrationReport, StartupReport, WaitReport};
pub use crate::domain::ports::{Handoff, MigrationTool, Probe};
pub use crate::utils::error::Result;
