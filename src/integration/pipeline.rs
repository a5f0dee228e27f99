//! TrackerPipeline for combining detection with tracking.

use crate::error::{Result, TrackerError};
use crate::tracker::{Track, TrackStore, TrackerConfig};

use super::DetectionSource;

/// Run inference on every second frame by default.
pub const DEFAULT_FRAME_STRIDE: u32 = 2;

/// A combined tracker that bundles detection inference with a [`TrackStore`].
///
/// Inference is usually far more expensive than association, so the detector
/// only runs on every `frame_stride`-th frame. Skipped frames still run an
/// empty association cycle so idle tracks keep expiring on time.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    store: TrackStore,
    frame_stride: u32,
    frame_count: u64,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    /// Create a new tracking pipeline with the given detector and tracker config.
    pub fn new(detector: D, config: TrackerConfig) -> Result<Self> {
        Ok(Self {
            detector,
            store: TrackStore::new(config)?,
            frame_stride: DEFAULT_FRAME_STRIDE,
            frame_count: 0,
        })
    }

    /// Create a new tracking pipeline with default tracker configuration.
    pub fn with_default_config(detector: D) -> Self {
        Self {
            detector,
            store: TrackStore::default(),
            frame_stride: DEFAULT_FRAME_STRIDE,
            frame_count: 0,
        }
    }

    /// Run the detector on every `frame_stride`-th frame.
    pub fn with_frame_stride(mut self, frame_stride: u32) -> Result<Self> {
        if frame_stride == 0 {
            return Err(TrackerError::InvalidFrameStride);
        }
        self.frame_stride = frame_stride;
        Ok(self)
    }

    /// Process a single frame and return the live tracks.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `now` - Capture timestamp, non-decreasing across frames
    ///
    /// # Returns
    /// Every live `Track` ordered by id, or the detector's error. A failed
    /// frame is still associated as an empty batch before the error is
    /// returned, so idle tracks keep expiring while the detector is down.
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        now: f64,
    ) -> std::result::Result<Vec<Track>, D::Error> {
        self.frame_count += 1;

        let detections = if self.frame_count % u64::from(self.frame_stride) == 0 {
            match self.detector.detect(input, width, height) {
                Ok(detections) => detections,
                Err(err) => {
                    log::warn!(
                        "Detection failed on frame {}, associating empty batch",
                        self.frame_count
                    );
                    self.store.associate(Vec::new(), now);
                    return Err(err);
                }
            }
        } else {
            Vec::new()
        };

        Ok(self.store.associate(detections, now))
    }

    /// Number of frames handed to [`process_frame`](Self::process_frame) so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn frame_stride(&self) -> u32 {
        self.frame_stride
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying track store.
    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    /// Get a mutable reference to the underlying track store.
    pub fn store_mut(&mut self) -> &mut TrackStore {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::DetectionBuilder;
    use crate::tracker::Detection;

    struct MockDetector {
        detections: Vec<Detection>,
        calls: usize,
    }

    impl MockDetector {
        fn new(detections: Vec<Detection>) -> Self {
            Self {
                detections,
                calls: 0,
            }
        }
    }

    impl DetectionSource for MockDetector {
        type Error = std::convert::Infallible;

        fn detect(
            &mut self,
            _input: &[u8],
            _width: u32,
            _height: u32,
        ) -> std::result::Result<Vec<Detection>, Self::Error> {
            self.calls += 1;
            Ok(self.detections.clone())
        }
    }

    struct FailingDetector {
        fail: bool,
        detections: Vec<Detection>,
    }

    impl DetectionSource for FailingDetector {
        type Error = String;

        fn detect(
            &mut self,
            _input: &[u8],
            _width: u32,
            _height: u32,
        ) -> std::result::Result<Vec<Detection>, Self::Error> {
            if self.fail {
                Err("camera unplugged".to_string())
            } else {
                Ok(self.detections.clone())
            }
        }
    }

    fn face() -> Detection {
        DetectionBuilder::new()
            .tlwh(10.0, 20.0, 40.0, 60.0)
            .label("happy", 1.0)
            .build()
    }

    #[test]
    fn test_tracker_pipeline_runs_every_frame_with_stride_one() {
        let mut pipeline = TrackerPipeline::with_default_config(MockDetector::new(vec![face()]))
            .with_frame_stride(1)
            .unwrap();

        let tracks = pipeline.process_frame(&[], 640, 480, 0.0).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].track_id, 1);

        let tracks = pipeline.process_frame(&[], 640, 480, 0.1).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].track_id, 1);
        assert_eq!(pipeline.detector().calls, 2);
    }

    #[test]
    fn test_skipped_frames_still_evict() {
        let mut pipeline = TrackerPipeline::with_default_config(MockDetector::new(vec![face()]));
        assert_eq!(pipeline.frame_stride(), DEFAULT_FRAME_STRIDE);

        // Frame 1 is skipped, frame 2 runs the detector.
        assert!(pipeline.process_frame(&[], 640, 480, 0.0).unwrap().is_empty());
        assert_eq!(pipeline.process_frame(&[], 640, 480, 0.1).unwrap().len(), 1);
        assert_eq!(pipeline.detector().calls, 1);

        pipeline.detector_mut().detections.clear();
        assert_eq!(pipeline.process_frame(&[], 640, 480, 1.0).unwrap().len(), 1);
        assert!(pipeline.process_frame(&[], 640, 480, 3.0).unwrap().is_empty());
        assert_eq!(pipeline.frame_count(), 4);
    }

    #[test]
    fn test_zero_stride_rejected() {
        let result = TrackerPipeline::with_default_config(MockDetector::new(vec![]))
            .with_frame_stride(0);
        assert!(matches!(result, Err(TrackerError::InvalidFrameStride)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrackerConfig::default().with_smoothing(-0.1);
        assert!(TrackerPipeline::new(MockDetector::new(vec![]), config).is_err());
    }

    #[test]
    fn test_detector_error_still_evicts() {
        let detector = FailingDetector {
            fail: false,
            detections: vec![face()],
        };
        let mut pipeline = TrackerPipeline::with_default_config(detector)
            .with_frame_stride(1)
            .unwrap();
        assert_eq!(pipeline.process_frame(&[], 640, 480, 0.0).unwrap().len(), 1);

        pipeline.detector_mut().fail = true;
        let err = pipeline.process_frame(&[], 640, 480, 1.0).unwrap_err();
        assert_eq!(err, "camera unplugged");
        assert_eq!(pipeline.store().len(), 1);
        assert_eq!(pipeline.store().get(1).map(|t| t.last_seen), Some(0.0));

        assert!(pipeline.process_frame(&[], 640, 480, 2.5).is_err());
        assert!(pipeline.store().is_empty());
    }
}
