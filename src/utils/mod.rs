pub mod error;
pub mod logger;
pub mod monitor;
pub mod signal;
pub mod validation;
