// Application layer: wires resolved settings to concrete adapters.

pub mod startup;

pub use startup::{build_entrypoint, load_settings, ProductionEntrypoint};
