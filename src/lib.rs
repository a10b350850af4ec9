//! # roi-eval
//!
//! A Rust library for scoring region-of-interest detectors against ground truth.
//!
//! Each image pairs a list of ground-truth regions with a list of computed
//! (detected) regions. Every pair is scored by geometric overlap, and the
//! overlaps are resolved into true positives, false positives and false
//! negatives under one of four exclusivity levels:
//!
//! - **Level 1, non-exclusive**: every overlap above threshold counts
//! - **Level 2, semi-exclusive**: a computed region credits only its best ground truth
//! - **Level 3, semi-exclusive-best**: as level 2, and each ground truth keeps only its best claimant
//! - **Level 4, exclusive**: strict one-to-one pairing, greedy or globally optimal
//!
//! ## Features
//!
//! - IoU for rectangles and arbitrary simple polygons
//! - Optimal one-to-one pairing with the Hungarian algorithm
//! - Confidence-score filtering that keeps original region indices
//! - Additive corpus statistics (detection rate, false alarms, precision)
//! - Sweeps over score and overlap thresholds, evaluated in parallel
//! - Text and JSON region-list loaders plus plain-text reports
//!
//! ## Quick Start
//!
//! ```rust
//! use roi_eval::evaluator::{evaluate_corpus, EvalParams};
//! use roi_eval::matching::MatchLevel;
//! use roi_eval::loader::{parse_computed_str, parse_truth_str};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let truth = parse_truth_str("frame1.png 1 : car 10 10 40 30\n")?;
//! let computed = parse_computed_str("frame1.png 2 : car 0.9 12 10 50 40 : car 0.4 200 200 220 220\n")?;
//!
//! let params = EvalParams::new(0.5, MatchLevel::Exclusive);
//! let result = evaluate_corpus(&truth, &computed, &params)?;
//!
//! println!("detection rate: {:.3}", result.stats.detection_rate());
//! println!("false alarms: {}", result.stats.false_alarms());
//! assert_eq!(result.stats.true_positives, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Input formats
//!
//! Ground truth, one image per line, upper-left corner plus size:
//!
//! ```text
//! <image> <n> : <label> <x> <y> <width> <height> : ...
//! ```
//!
//! Computed regions, one image per line, confidence plus corners:
//!
//! ```text
//! <image> <n> : <label> <score> <ulx> <uly> <lrx> <lry> : ...
//! ```
//!
//! Polygon regions are supplied as JSON arrays of [`ImageRecord`].

pub mod assignment;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod loader;
pub mod matching;
pub mod metrics;
pub mod ranking;
pub mod report;
pub mod stats;
pub mod threshold;
pub mod types;

// Re-export commonly used types and functions
pub use config::EvalConfig;
pub use error::{Result, RoiEvalError};
pub use evaluator::{evaluate_corpus, evaluate_image, sweep, EvalParams, ThresholdGrid};
pub use matching::{MatchLevel, MatchStrategy};
pub use stats::CorpusStats;
pub use types::{
    ClassificationOutcome, ImageRecord, LabeledRegion, Point, Polygon, PrecisionRecallPoint, Rect,
    Region,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_compiles() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.is_valid());
        assert_eq!(MatchLevel::default(), MatchLevel::NonExclusive);
    }
}
