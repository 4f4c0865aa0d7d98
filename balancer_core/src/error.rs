use thiserror::Error;

/// Session construction failures. Nothing inside a running session is
/// fatal (malformed telemetry and invalid operator input self-heal), so
/// the only typed errors live at build time.
#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
