//! Error kinds shared across the processing pipeline.

/// A typed processing error.
///
/// `InvalidInput`, `DuplicatePath`, and `MalformedElement` are recoverable:
/// the pipeline records a diagnostic and skips the affected document or
/// element. `EmissionFailure` is fatal to the run. `Cancelled` is an orderly
/// shutdown, surfaced so callers can tell it apart from completion.
#[derive(Debug, thiserror::Error)]
pub enum KbError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("duplicate path: {path:?} is already registered to {existing}")]
    DuplicatePath {
        path: String,
        existing: String,
        incoming: String,
    },

    #[error("malformed element: {0}")]
    MalformedElement(String),

    #[error("RDF emission failed: {0}")]
    EmissionFailure(String),

    #[error("run cancelled")]
    Cancelled,
}

impl KbError {
    /// Whether the pipeline may skip past this error and keep processing.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            KbError::InvalidInput(_) | KbError::DuplicatePath { .. } | KbError::MalformedElement(_)
        )
    }
}
