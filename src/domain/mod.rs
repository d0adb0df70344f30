// Domain layer: startup models and the ports the engine drives.

pub mod model;
pub mod ports;
