mod distribution;
mod matching;
mod rect;
mod track;
mod track_store;

pub use distribution::LabelDistribution;
pub use matching::{AssignmentResult, Detection, greedy_assignment};
pub use rect::{Rect, iou_batch};
pub use track::Track;
pub use track_store::{TrackStore, TrackerConfig};
