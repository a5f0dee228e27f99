//! Trait for detection and classification inference backends.

use crate::tracker::Detection;

/// Trait for inference backends that find objects and score their labels.
///
/// Implement this trait to connect any face/object classifier to the tracker.
///
/// # Example
///
/// ```ignore
/// use moodtrack_rs::{Detection, DetectionSource};
///
/// struct MyClassifier {
///     // Your model here
/// }
///
/// impl DetectionSource for MyClassifier {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return boxes with label distributions
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw image data and return detections.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}
