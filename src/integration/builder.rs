//! Builder for creating Detection objects from various input formats.

use crate::tracker::{Detection, LabelDistribution, Rect};

/// Builder for creating `Detection` objects from various input formats.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    bbox: Rect,
    distribution: LabelDistribution,
    frame: Option<(f32, f32)>,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = Rect::from_tlbr(x1, y1, x2, y2);
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::from_xywh(cx, cy, w, h);
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::new(x, y, w, h);
        self
    }

    /// Set the weight of a single label.
    pub fn label(mut self, label: impl Into<String>, weight: f32) -> Self {
        self.distribution.insert(label, weight);
        self
    }

    /// Replace the label distribution.
    pub fn distribution(mut self, distribution: LabelDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Use raw classifier scores, normalized with softmax.
    pub fn raw_scores<I, S>(mut self, scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        self.distribution = LabelDistribution::softmax(scores);
        self
    }

    /// Clamp the box into a frame of the given size when building.
    pub fn clamp_to(mut self, frame_width: u32, frame_height: u32) -> Self {
        self.frame = Some((frame_width as f32, frame_height as f32));
        self
    }

    /// Build the final `Detection`.
    ///
    /// No validation is applied; see [`build_valid`](Self::build_valid).
    pub fn build(self) -> Detection {
        let bbox = match self.frame {
            Some((w, h)) => self.bbox.clamp_to(w, h),
            None => self.bbox,
        };
        Detection::from_rect(bbox, self.distribution)
    }

    /// Build the `Detection`, or `None` if its box has no area.
    ///
    /// The check runs on the box as reported, before any frame clamping.
    pub fn build_valid(self) -> Option<Detection> {
        if self.bbox.is_degenerate() {
            return None;
        }
        Some(self.build())
    }
}
