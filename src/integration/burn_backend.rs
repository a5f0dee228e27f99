//! Burn inference backend for per-object label classification.
//!
//! This module provides a `BurnClassifier` that implements `DetectionSource`
//! for models built with the Burn framework that emit, for every object they
//! find, a box and one raw score per label (for example a face detector with
//! an emotion head).
//!
//! # Example
//!
//! ```ignore
//! use moodtrack_rs::integration::{BurnClassifier, BurnModel, RawDetection};
//! use burn::backend::NdArray;
//!
//! struct MyEmotionModel { /* ... */ }
//!
//! impl BurnModel<NdArray> for MyEmotionModel {
//!     fn forward(&self, input: burn::tensor::Tensor<NdArray, 4>) -> Vec<RawDetection> {
//!         // Run inference
//!     }
//!
//!     fn labels(&self) -> &[String] {
//!         &self.labels
//!     }
//! }
//!
//! let model = MyEmotionModel::load("model.bin");
//! let classifier = BurnClassifier::new(model, Default::default());
//! ```

use super::{DetectionBuilder, DetectionSource};
use crate::tracker::Detection;
use burn::prelude::*;
use burn::tensor::Tensor;
use thiserror::Error;

/// Error type for Burn classification failures.
#[derive(Error, Debug, Clone)]
pub enum BurnClassifierError {
    /// Input image has invalid dimensions.
    #[error("Invalid input dimensions: expected {expected:?}, got {got:?}")]
    InvalidInputDimensions {
        expected: (u32, u32, u32),
        got: (u32, u32, u32),
    },
    /// Preprocessing failed.
    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),
    /// The model returned a score vector that does not match its label set.
    #[error("Model returned {got} scores for {expected} labels")]
    LabelCountMismatch { expected: usize, got: usize },
}

/// Raw per-object output from the model.
#[derive(Debug, Clone)]
pub struct RawDetection {
    /// Bounding box: [x1, y1, x2, y2] or [cx, cy, w, h] depending on model
    pub bbox: [f32; 4],
    /// Unnormalized score per label, in the order of [`BurnModel::labels`]
    pub logits: Vec<f32>,
}

/// Trait for Burn-based classification models.
///
/// Implement this trait for your specific model architecture.
pub trait BurnModel<B: Backend>: Send + Sync {
    /// Run forward pass on the input tensor.
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape [batch, channels, height, width]
    fn forward(&self, input: Tensor<B, 4>) -> Vec<RawDetection>;

    /// Label names, one per logit.
    fn labels(&self) -> &[String];

    /// Get the expected input size (channels, height, width).
    fn input_size(&self) -> (u32, u32, u32) {
        (3, 640, 640)
    }

    /// Whether bbox output is in XYWH format (vs TLBR).
    fn bbox_is_xywh(&self) -> bool {
        false
    }
}

/// Burn-based classifier implementing `DetectionSource`.
pub struct BurnClassifier<B: Backend, M: BurnModel<B>> {
    model: M,
    device: B::Device,
}

impl<B: Backend, M: BurnModel<B>> BurnClassifier<B, M> {
    /// Create a new Burn classifier with the given model and device.
    pub fn new(model: M, device: B::Device) -> Self {
        Self { model, device }
    }

    /// Preprocess raw RGB bytes to a Burn tensor.
    pub fn preprocess(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Tensor<B, 4>, BurnClassifierError> {
        let (channels, target_h, target_w) = self.model.input_size();
        let row_len = height as usize * channels as usize;
        let expected_len = row_len * width as usize;

        if input.len() != expected_len {
            let got_width = u32::try_from(input.len() / row_len.max(1)).unwrap_or(u32::MAX);
            return Err(BurnClassifierError::InvalidInputDimensions {
                expected: (channels, height, width),
                got: (channels, height, got_width),
            });
        }

        if height != target_h || width != target_w {
            return Err(BurnClassifierError::PreprocessingError(format!(
                "Input size {}x{} doesn't match model size {}x{}",
                width, height, target_w, target_h
            )));
        }

        let data: Vec<f32> = input.iter().map(|&x| x as f32 / 255.0).collect();

        Ok(Tensor::<B, 1>::from_floats(data.as_slice(), &self.device).reshape([
            1,
            channels as usize,
            height as usize,
            width as usize,
        ]))
    }

    /// Convert raw model outputs to detections with softmaxed distributions.
    ///
    /// Objects with degenerate boxes are dropped and the rest are clamped to
    /// the frame.
    fn postprocess(
        &self,
        raw_detections: Vec<RawDetection>,
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, BurnClassifierError> {
        let labels = self.model.labels();
        let mut detections = Vec::with_capacity(raw_detections.len());

        for raw in raw_detections {
            if raw.logits.len() != labels.len() {
                return Err(BurnClassifierError::LabelCountMismatch {
                    expected: labels.len(),
                    got: raw.logits.len(),
                });
            }

            let scores = labels.iter().cloned().zip(raw.logits);
            let [a, b, c, d] = raw.bbox;
            let builder = DetectionBuilder::new().raw_scores(scores);
            let builder = if self.model.bbox_is_xywh() {
                builder.xywh(a, b, c, d)
            } else {
                builder.tlbr(a, b, c, d)
            };

            match builder.clamp_to(width, height).build_valid() {
                Some(det) => detections.push(det),
                None => log::debug!("Dropping degenerate box {:?}", raw.bbox),
            }
        }

        Ok(detections)
    }
}

impl<B: Backend, M: BurnModel<B>> DetectionSource for BurnClassifier<B, M> {
    type Error = BurnClassifierError;

    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error> {
        let tensor = self.preprocess(input, width, height)?;
        let raw_detections = self.model.forward(tensor);
        self.postprocess(raw_detections, width, height)
    }
}
