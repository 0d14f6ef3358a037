use emotrace_core::ProfileError;
use thiserror::Error;

/// Why a simulation request was rejected. No partial result is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),

    #[error("intensity level must be between 1 and 7 (got {0})")]
    InvalidIntensity(u8),
}
