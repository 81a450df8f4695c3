use thiserror::Error;

use crate::chart::render::{ChartKind, RenderError};
use crate::ephemeris::provider::{EphemerisError, LookupError};

/// Errors surfaced by the engine and its orchestrator.
///
/// Collaborator failures are wrapped with the subject (and moment) they were
/// raised for and never swallowed.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Ephemeris lookup failed for {subject} at {moment}: {source}")]
    Ephemeris {
        subject: String,
        moment: String,
        #[source]
        source: EphemerisError,
    },
    #[error("Place lookup failed for {subject}: {source}")]
    Lookup {
        subject: String,
        #[source]
        source: LookupError,
    },
    #[error("Rendering the {chart} chart failed: {source}")]
    Render {
        chart: ChartKind,
        #[source]
        source: RenderError,
    },
}

impl EngineError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether the failure came from an external collaborator and may succeed
    /// on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Ephemeris { .. } => true,
            Self::Lookup { source, .. } => !matches!(source, LookupError::NotConfigured),
            Self::Render { source, .. } => !matches!(source, RenderError::NotConfigured),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
