//! Track store: greedy IoU association, EMA smoothing and time-based eviction.

use std::collections::BTreeMap;

use crate::error::{Result, TrackerError};
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::rect::{Rect, iou_batch};
use crate::tracker::track::Track;

/// Configuration for the [`TrackStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Minimum IoU for a detection to continue an existing track
    pub match_thresh: f32,
    /// EMA weight kept on a track's distribution history
    pub smoothing: f32,
    /// Idle time after which a track is evicted, in the unit of `now`
    pub max_time_lost: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            match_thresh: 0.3,
            smoothing: 0.7,
            max_time_lost: 2.0,
        }
    }
}

impl TrackerConfig {
    pub fn with_match_thresh(mut self, match_thresh: f32) -> Self {
        self.match_thresh = match_thresh;
        self
    }

    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn with_max_time_lost(mut self, max_time_lost: f64) -> Self {
        self.max_time_lost = max_time_lost;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.match_thresh > 0.0 && self.match_thresh <= 1.0) {
            return Err(TrackerError::InvalidMatchThreshold(self.match_thresh));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(TrackerError::InvalidSmoothing(self.smoothing));
        }
        if !(self.max_time_lost.is_finite() && self.max_time_lost >= 0.0) {
            return Err(TrackerError::InvalidTimeout(self.max_time_lost));
        }
        Ok(())
    }
}

/// Owns the live tracks and updates them once per frame.
///
/// The store is a single-writer object: callers that process frames
/// concurrently must serialize calls to [`associate`](Self::associate).
///
/// Matching is greedy and follows detection order. A detection claims the
/// unassigned track with the highest IoU (lowest id on ties); it never steals
/// a track from an earlier detection even when that would give a better
/// overall assignment.
#[derive(Debug, Clone)]
pub struct TrackStore {
    tracks: BTreeMap<u64, Track>,
    next_id: u64,
    last_updated: Vec<u64>,
    last_now: Option<f64>,
    config: TrackerConfig,
}

impl Default for TrackStore {
    fn default() -> Self {
        Self::from_valid_config(TrackerConfig::default())
    }
}

impl TrackStore {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: TrackerConfig) -> Self {
        Self {
            tracks: BTreeMap::new(),
            next_id: 1,
            last_updated: Vec::new(),
            last_now: None,
            config,
        }
    }

    /// Run one association cycle and return every live track, ordered by id.
    ///
    /// Detections are processed in the order given. Matched tracks take the
    /// detection's box and an EMA of its distribution; unmatched detections
    /// start new tracks. Tracks idle for longer than `max_time_lost` relative
    /// to `now` are evicted afterwards, also when `detections` is empty.
    ///
    /// `now` is expected to be non-decreasing across calls. A timestamp that
    /// goes backwards is accepted but only suppresses eviction.
    pub fn associate(&mut self, detections: Vec<Detection>, now: f64) -> Vec<Track> {
        if let Some(prev) = self.last_now {
            if now < prev {
                log::warn!("Timestamp went backwards ({} -> {}), eviction suppressed", prev, now);
            }
        }
        self.last_now = Some(self.last_now.map_or(now, |prev| prev.max(now)));
        self.last_updated.clear();

        // Tracks created during this cycle are never offered to later detections.
        let track_ids: Vec<u64> = self.tracks.keys().copied().collect();
        let track_rects: Vec<Rect> = self.tracks.values().map(|t| t.bbox).collect();
        let det_rects: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();
        let ious = iou_batch(&det_rects, &track_rects);

        let AssignmentResult { matches, .. } =
            matching::greedy_assignment(&ious, self.config.match_thresh);

        let mut assignment: Vec<Option<usize>> = vec![None; detections.len()];
        for (idet, itrack) in matches {
            assignment[idet] = Some(itrack);
        }

        let mut num_updated = 0;
        let mut num_created = 0;

        // Walk detections in input order so new ids follow arrival order.
        for (idet, (det, itrack)) in detections.into_iter().zip(assignment).enumerate() {
            match itrack {
                Some(itrack) => {
                    let track_id = track_ids[itrack];
                    if let Some(track) = self.tracks.get_mut(&track_id) {
                        log::trace!(
                            "Detection {} -> track {} (IoU {:.3})",
                            idet,
                            track_id,
                            ious[[idet, itrack]]
                        );
                        track.update(det, self.config.smoothing, now);
                        self.last_updated.push(track_id);
                        num_updated += 1;
                    }
                }
                None => {
                    let track_id = self.next_id;
                    self.next_id += 1;
                    log::trace!("Detection {} starts track {}", idet, track_id);
                    self.tracks.insert(track_id, Track::new(track_id, det, now));
                    self.last_updated.push(track_id);
                    num_created += 1;
                }
            }
        }

        let num_evicted = self.evict(now);

        log::debug!(
            "Associated {} detections: {} updated, {} created, {} evicted, {} live",
            det_rects.len(),
            num_updated,
            num_created,
            num_evicted,
            self.tracks.len()
        );

        self.tracks.values().cloned().collect()
    }

    /// Remove tracks idle for longer than the timeout; returns how many went.
    fn evict(&mut self, now: f64) -> usize {
        let timeout = self.config.max_time_lost;
        let before = self.tracks.len();
        self.tracks.retain(|&track_id, track| {
            let expired = track.is_expired(now, timeout);
            if expired {
                log::trace!("Evicting track {} (idle {:.3})", track_id, track.elapsed(now));
            }
            !expired
        });
        before - self.tracks.len()
    }

    /// Live tracks in ascending id order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn get(&self, track_id: u64) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Ids created or updated by the most recent [`associate`](Self::associate) call.
    pub fn last_updated(&self) -> &[u64] {
        &self.last_updated
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}
