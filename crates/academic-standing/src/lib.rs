pub mod config;
pub mod error;
pub mod standing;
pub mod telemetry;
