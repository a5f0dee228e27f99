//! Online identity tracking for per-frame labelled detections.
//!
//! Detections (a box plus a label distribution) are associated greedily by IoU
//! to live tracks, their distributions are smoothed with an exponential moving
//! average, and tracks that stop appearing are evicted after a timeout.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{Result, TrackerError};
pub use integration::{DetectionBuilder, DetectionSource, TrackerPipeline};
pub use tracker::{Detection, LabelDistribution, Rect, Track, TrackStore, TrackerConfig};
