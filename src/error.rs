//! Error types for the tracker.

use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors raised while configuring a [`TrackStore`](crate::TrackStore).
///
/// Association itself never fails; only the configuration is checked.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("match threshold must be in (0, 1], got {0}")]
    InvalidMatchThreshold(f32),

    #[error("smoothing factor must be in [0, 1], got {0}")]
    InvalidSmoothing(f32),

    #[error("inactivity timeout must be finite and non-negative, got {0}")]
    InvalidTimeout(f64),

    #[error("frame stride must be at least 1")]
    InvalidFrameStride,
}
