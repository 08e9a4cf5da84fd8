//! Typed errors surfaced by the workflows and the pre-run checks.

use thiserror::Error;

use crate::core::types::Stage;

/// A capability call failed; the whole run is aborted.
///
/// `section` is the 0-based index into the split outline. Messages report it
/// 1-based.
#[derive(Debug, Error)]
#[error("section {} failed during {stage}", .section + 1)]
pub struct CapabilityError {
    pub section: usize,
    pub stage: Stage,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl CapabilityError {
    pub fn new(section: usize, stage: Stage, source: anyhow::Error) -> Self {
        Self {
            section,
            stage,
            source: source.into(),
        }
    }
}

/// The backend is not usable; the workflow must not start.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("backend.command is not configured")]
    MissingCommand,

    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<String>),

    #[error("invalid config: {0}")]
    Invalid(String),
}
