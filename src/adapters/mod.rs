// Adapters layer: concrete implementations of the domain ports (network, migration tool, exec).

pub mod exec;
pub mod migration_cli;
pub mod tcp_probe;

pub use exec::ExecHandoff;
pub use migration_cli::MigrationCli;
pub use tcp_probe::TcpProbe;
