//! Matching utilities for associating detections with tracks.

use crate::tracker::distribution::LabelDistribution;
use crate::tracker::rect::Rect;
use ndarray::Array2;

/// Detection input for the tracker.
///
/// Carries no identity; the store decides which track (if any) it belongs to.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Bounding box of the detected object
    pub bbox: Rect,
    /// Label weights reported by the classifier
    pub distribution: LabelDistribution,
}

impl Detection {
    /// Create a detection from a TLBR box.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, distribution: LabelDistribution) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            distribution,
        }
    }

    pub fn from_rect(bbox: Rect, distribution: LabelDistribution) -> Self {
        Self { bbox, distribution }
    }
}

/// Outcome of one association pass.
///
/// Indices refer to the rows (detections) and columns (tracks) of the IoU
/// matrix the pass was run on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// `(detection, track)` pairs in detection order
    pub matches: Vec<(usize, usize)>,
    pub unmatched_detections: Vec<usize>,
    pub unmatched_tracks: Vec<usize>,
}

/// Greedy IoU assignment in detection order.
///
/// Rows of `ious` are detections in the order supplied by the caller, columns
/// are tracks. Each row takes the still-unclaimed column with the greatest
/// IoU, provided it is at least `thresh`; among equal maxima the lowest
/// column wins. Earlier rows are never revisited, so the result is not a
/// globally optimal assignment.
pub fn greedy_assignment(ious: &Array2<f32>, thresh: f32) -> AssignmentResult {
    let (num_rows, num_cols) = ious.dim();

    let mut claimed = vec![false; num_cols];
    let mut matches = Vec::new();
    let mut unmatched_detections = Vec::new();

    for row in 0..num_rows {
        let mut best: Option<(usize, f32)> = None;
        for col in 0..num_cols {
            if claimed[col] {
                continue;
            }
            // Also rejects NaN from boxes with non-finite coordinates.
            let iou = ious[[row, col]];
            if !(iou >= thresh) {
                continue;
            }
            match best {
                Some((_, best_iou)) if iou <= best_iou => {}
                _ => best = Some((col, iou)),
            }
        }

        match best {
            Some((col, _)) => {
                claimed[col] = true;
                matches.push((row, col));
            }
            None => unmatched_detections.push(row),
        }
    }

    let unmatched_tracks = claimed
        .iter()
        .enumerate()
        .filter_map(|(i, &c)| if c { None } else { Some(i) })
        .collect();

    AssignmentResult {
        matches,
        unmatched_detections,
        unmatched_tracks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_empty_inputs() {
        let result = greedy_assignment(&Array2::zeros((0, 3)), 0.3);
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_tracks, vec![0, 1, 2]);

        let result = greedy_assignment(&Array2::zeros((2, 0)), 0.3);
        assert_eq!(result.unmatched_detections, vec![0, 1]);
        assert!(result.unmatched_tracks.is_empty());
    }

    #[test]
    fn test_picks_highest_iou_above_threshold() {
        let ious = array![[0.4, 0.9, 0.1], [0.2, 0.25, 0.29]];
        let result = greedy_assignment(&ious, 0.3);

        assert_eq!(result.matches, vec![(0, 1)]);
        assert_eq!(result.unmatched_detections, vec![1]);
        assert_eq!(result.unmatched_tracks, vec![0, 2]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let ious = array![[0.3]];
        assert_eq!(greedy_assignment(&ious, 0.3).matches, vec![(0, 0)]);
    }

    #[test]
    fn test_first_detection_claims_track() {
        // Both detections prefer track 0; the second falls back to track 1.
        let ious = array![[0.5, 0.0], [0.9, 0.4]];
        let result = greedy_assignment(&ious, 0.3);

        assert_eq!(result.matches, vec![(0, 0), (1, 1)]);
        assert!(result.unmatched_detections.is_empty());
    }

    #[test]
    fn test_claimed_track_not_reused() {
        let ious = array![[0.8], [0.8]];
        let result = greedy_assignment(&ious, 0.3);

        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_detections, vec![1]);
    }

    #[test]
    fn test_nan_iou_never_matches() {
        let ious = array![[f32::NAN, 0.5], [f32::NAN, f32::NAN]];
        let result = greedy_assignment(&ious, 0.3);

        assert_eq!(result.matches, vec![(0, 1)]);
        assert_eq!(result.unmatched_detections, vec![1]);
        assert_eq!(result.unmatched_tracks, vec![0]);
    }

    #[test]
    fn test_ties_resolve_to_lowest_column() {
        let ious = array![[0.6, 0.6, 0.6]];
        assert_eq!(greedy_assignment(&ious, 0.3).matches, vec![(0, 0)]);
    }
}
