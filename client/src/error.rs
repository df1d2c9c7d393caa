//! Errors surfaced to callers of the gateway and the stores.
//!
//! Every variant is recoverable: a failed operation leaves the stores exactly
//! as they were and hands the error back for presentation.

use crate::domain::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The request never produced a usable envelope (transport, status, decoding)
    #[error("Network error: {0}")]
    Network(String),
    /// The API answered `ok: false`, including authorization denials
    #[error("{message}")]
    Rejected { message: String },
    /// The API answered `ok: true` with data that breaks domain invariants
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    /// Input rejected locally before any request was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No pet is currently selected")]
    NoSelection,
    #[error("Runtime unavailable: {0}")]
    Runtime(String),
}

impl From<reqwest::Error> for TrackerError {
    fn from(e: reqwest::Error) -> Self {
        TrackerError::Network(e.to_string())
    }
}

impl TrackerError {
    pub fn rejected(message: impl Into<String>) -> Self {
        TrackerError::Rejected {
            message: message.into(),
        }
    }

    /// Whether the failure came from the API refusing the operation
    pub fn is_rejection(&self) -> bool {
        matches!(self, TrackerError::Rejected { .. })
    }
}
