use std::time::Duration;

/// Why an analysis produced no result. Every variant is recoverable: the
/// caller may simply try again later.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("need at least {required} records for analysis, found {found}")]
    InsufficientData { found: usize, required: usize },

    #[error("analysis timed out after {0:?}")]
    Timeout(Duration),

    #[error("analysis service failed: {0}")]
    Service(String),

    #[error("analysis response was not understood: {0}")]
    MalformedResponse(String),
}
