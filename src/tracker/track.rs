//! A single tracked identity.

use crate::tracker::distribution::LabelDistribution;
use crate::tracker::matching::Detection;
use crate::tracker::rect::Rect;

/// Persistent identity maintained by the [`TrackStore`](crate::TrackStore).
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Unique track identifier, never reused
    pub track_id: u64,
    /// Box of the most recent matching detection
    pub bbox: Rect,
    /// EMA-smoothed label weights
    pub distribution: LabelDistribution,
    /// Timestamp of the last detection that updated this track
    pub last_seen: f64,
}

impl Track {
    /// Start a track from its first detection. The distribution is taken as-is.
    pub fn new(track_id: u64, detection: Detection, now: f64) -> Self {
        Self {
            track_id,
            bbox: detection.bbox,
            distribution: detection.distribution,
            last_seen: now,
        }
    }

    /// Fold a matching detection into the track.
    ///
    /// `alpha` is the weight kept on the existing distribution.
    pub fn update(&mut self, detection: Detection, alpha: f32, now: f64) {
        self.bbox = detection.bbox;
        self.distribution =
            LabelDistribution::blend(&self.distribution, &detection.distribution, alpha);
        self.last_seen = self.last_seen.max(now);
    }

    /// Time since the last update, negative if `now` went backwards.
    pub fn elapsed(&self, now: f64) -> f64 {
        now - self.last_seen
    }

    /// Whether the track has been idle for strictly longer than `timeout`.
    pub fn is_expired(&self, now: f64, timeout: f64) -> bool {
        self.elapsed(now) > timeout
    }

    /// Heaviest label of the smoothed distribution.
    pub fn dominant_label(&self) -> Option<(&str, f32)> {
        self.distribution.dominant()
    }
}
