/// Corpus-level detection statistics
///
/// Per-image classification outcomes are folded into running totals here.
/// Totals are plain sums, so partial statistics from separate batches (or
/// separate worker threads) merge into exactly the single-run result.

use crate::metrics::rates::{detection_rate, format_rate, precision};
use crate::types::ClassificationOutcome;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Running totals across all evaluated images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Number of images evaluated
    pub images: usize,

    /// Ground-truth regions judged detected
    pub true_positives: usize,

    /// Computed regions judged false alarms
    pub false_positives: usize,

    /// Ground-truth regions judged missed
    pub false_negatives: usize,

    /// Total ground-truth regions seen
    pub total_ground_truth: usize,

    /// Images holding at least one false alarm
    pub images_with_false_alarms: usize,
}

impl CorpusStats {
    /// Create a new `CorpusStats` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one image's outcome into the totals
    pub fn record(&mut self, outcome: &ClassificationOutcome) {
        self.images += 1;
        self.true_positives += outcome.true_positives;
        self.false_positives += outcome.false_positives;
        self.false_negatives += outcome.false_negatives;
        self.total_ground_truth += outcome.true_positives + outcome.false_negatives;
        if outcome.has_false_alarm() {
            self.images_with_false_alarms += 1;
        }
    }

    /// Build totals from a single outcome
    pub fn from_outcome(outcome: &ClassificationOutcome) -> Self {
        let mut stats = Self::new();
        stats.record(outcome);
        stats
    }

    /// Add another set of totals into this one
    pub fn merge(&mut self, other: &CorpusStats) {
        self.images += other.images;
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
        self.total_ground_truth += other.total_ground_truth;
        self.images_with_false_alarms += other.images_with_false_alarms;
    }

    /// True positives over total ground truth; `NaN` without ground truth
    pub fn detection_rate(&self) -> f64 {
        detection_rate(self.true_positives, self.total_ground_truth)
    }

    /// Raw false alarm count (not a rate)
    pub fn false_alarms(&self) -> usize {
        self.false_positives
    }

    /// True positives over all credited and false detections; `NaN` when both are zero
    pub fn precision(&self) -> f64 {
        precision(self.true_positives, self.false_positives)
    }

    /// Get a formatted string summary of the statistics
    pub fn summary_string(&self) -> String {
        format!(
            "CorpusStats {{ images: {}, ground_truth: {}, true_positives: {}, false_positives: {}, false_negatives: {}, detection_rate: {}, images_with_false_alarms: {} }}",
            self.images,
            self.total_ground_truth,
            self.true_positives,
            self.false_positives,
            self.false_negatives,
            format_rate(self.detection_rate()),
            self.images_with_false_alarms
        )
    }
}

impl AddAssign<&CorpusStats> for CorpusStats {
    fn add_assign(&mut self, rhs: &CorpusStats) {
        self.merge(rhs);
    }
}

impl Add for CorpusStats {
    type Output = CorpusStats;

    fn add(mut self, rhs: CorpusStats) -> CorpusStats {
        self.merge(&rhs);
        self
    }
}

impl Sum for CorpusStats {
    fn sum<I: Iterator<Item = CorpusStats>>(iter: I) -> Self {
        iter.fold(CorpusStats::new(), Add::add)
    }
}

impl<'a> Sum<&'a CorpusStats> for CorpusStats {
    fn sum<I: Iterator<Item = &'a CorpusStats>>(iter: I) -> Self {
        iter.fold(CorpusStats::new(), |mut acc, s| {
            acc.merge(s);
            acc
        })
    }
}
