//! Integration module for connecting detection/classification backends with
//! the track store.
//!
//! This module provides traits and utilities for turning the output of an
//! inference backend (Burn, ONNX Runtime, etc.) into tracker detections.

mod builder;
mod detector;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::DetectionSource;
pub use pipeline::{DEFAULT_FRAME_STRIDE, TrackerPipeline};

#[cfg(feature = "burn-backend")]
mod burn_backend;

#[cfg(feature = "burn-backend")]
pub use burn_backend::{BurnClassifier, BurnClassifierError, BurnModel, RawDetection};
