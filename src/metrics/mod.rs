//! Overlap scoring and rate calculations.

pub mod iou;
pub mod polygon;
pub mod rates;

pub use iou::{calculate_iou, region_score, score_matrix};
pub use polygon::polygon_iou;
pub use rates::{detection_rate, format_rate, precision};
