//! Evaluation orchestrator: per-image scoring, corpus totals and threshold sweeps.
//!
//! Every image is scored independently and the per-image outcomes are reduced
//! into [`CorpusStats`] at the end, so images (and sweep rows) fan out across
//! the rayon pool without shared mutable state.

use crate::error::{RoiEvalError, Result};
use crate::matching::{check_strategy, resolve_assignment, resolve_ranked, MatchLevel, MatchStrategy};
use crate::ranking::{considered_scores, ensure_same_image, rank_candidates};
use crate::stats::CorpusStats;
use crate::threshold::{validate_overlap_threshold, validate_score_threshold, ThresholdRange};
use crate::types::{ClassificationOutcome, ImageRecord, PrecisionRecallPoint};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Scalar parameters of a single evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EvalParams {
    /// Overlap scores must be strictly greater than this to count.
    pub overlap_threshold: f64,
    pub match_level: MatchLevel,
    pub strategy: MatchStrategy,
    /// Computed regions scoring at or below this are ignored.
    pub score_threshold: Option<f64>,
}

impl EvalParams {
    pub fn new(overlap_threshold: f64, match_level: MatchLevel) -> Self {
        Self {
            overlap_threshold,
            match_level,
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    /// Check thresholds and the level/strategy combination.
    pub fn validate(&self) -> Result<()> {
        validate_overlap_threshold(self.overlap_threshold)?;
        if let Some(threshold) = self.score_threshold {
            validate_score_threshold(threshold)?;
        }
        check_strategy(self.match_level, self.strategy)
    }
}

/// Outcome for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEvaluation {
    pub image_id: String,
    pub outcome: ClassificationOutcome,
}

/// Per-image outcomes (in input order) and their totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEvaluation {
    pub images: Vec<ImageEvaluation>,
    pub stats: CorpusStats,
}

/// Check that ground truth and computed records pair up image-for-image.
///
/// # Errors
///
/// Returns [`RoiEvalError::ImageMismatch`] naming the first divergence.
pub fn validate_alignment(truth: &[ImageRecord], computed: &[ImageRecord]) -> Result<()> {
    if truth.len() != computed.len() {
        return Err(RoiEvalError::ImageMismatch(format!(
            "{} ground-truth images but {} computed images",
            truth.len(),
            computed.len()
        )));
    }

    if let Some((index, (t, c))) = truth
        .iter()
        .zip(computed)
        .enumerate()
        .find(|(_, (t, c))| t.image_id != c.image_id)
    {
        return Err(RoiEvalError::ImageMismatch(format!(
            "image {}: ground truth '{}' vs computed '{}'",
            index, t.image_id, c.image_id
        )));
    }

    Ok(())
}

fn classify(
    truth: &ImageRecord,
    computed: &ImageRecord,
    overlap_threshold: f64,
    level: MatchLevel,
    strategy: MatchStrategy,
    score_threshold: Option<f64>,
) -> Result<ClassificationOutcome> {
    match (level, strategy) {
        (MatchLevel::Exclusive, MatchStrategy::Optimal) => {
            let (scores, considered) = considered_scores(truth, computed, score_threshold);
            resolve_assignment(&scores, &considered, overlap_threshold)
        }
        _ => {
            let ranked = rank_candidates(truth, computed, score_threshold)?;
            Ok(resolve_ranked(&ranked, overlap_threshold, level))
        }
    }
}

/// Evaluate one image.
///
/// # Errors
///
/// Fails if the records name different images, the parameters are invalid,
/// or the assignment solver reports an infeasible result.
pub fn evaluate_image(
    truth: &ImageRecord,
    computed: &ImageRecord,
    params: &EvalParams,
) -> Result<ImageEvaluation> {
    ensure_same_image(truth, computed)?;
    params.validate()?;

    let outcome = classify(
        truth,
        computed,
        params.overlap_threshold,
        params.match_level,
        params.strategy,
        params.score_threshold,
    )?;

    debug!(
        image = %truth.image_id,
        tp = outcome.true_positives,
        fp = outcome.false_positives,
        fn_ = outcome.false_negatives,
        "image evaluated"
    );

    Ok(ImageEvaluation {
        image_id: truth.image_id.clone(),
        outcome,
    })
}

/// Evaluate a whole corpus.
///
/// Alignment is checked before any image is scored; a mismatched corpus
/// yields an error and no statistics.
///
/// # Example
///
/// ```
/// use roi_eval::evaluator::{evaluate_corpus, EvalParams};
/// use roi_eval::matching::MatchLevel;
/// use roi_eval::types::{ImageRecord, Rect};
///
/// let truth = vec![ImageRecord::from_rects("a.png", &[Rect::new(0.0, 0.0, 10.0, 10.0)])];
/// let computed = vec![ImageRecord::from_rects("a.png", &[Rect::new(1.0, 0.0, 10.0, 10.0)])];
///
/// let result = evaluate_corpus(&truth, &computed, &EvalParams::new(0.5, MatchLevel::Exclusive)).unwrap();
/// assert_eq!(result.stats.true_positives, 1);
/// assert_eq!(result.stats.detection_rate(), 1.0);
/// ```
pub fn evaluate_corpus(
    truth: &[ImageRecord],
    computed: &[ImageRecord],
    params: &EvalParams,
) -> Result<CorpusEvaluation> {
    params.validate()?;
    validate_alignment(truth, computed)?;

    let images: Vec<ImageEvaluation> = truth
        .par_iter()
        .zip(computed.par_iter())
        .map(|(t, c)| evaluate_image(t, c, params))
        .collect::<Result<Vec<_>>>()?;

    let stats: CorpusStats = images
        .iter()
        .map(|e| CorpusStats::from_outcome(&e.outcome))
        .sum();

    info!(
        images = stats.images,
        tp = stats.true_positives,
        fp = stats.false_positives,
        fn_ = stats.false_negatives,
        level = %params.match_level,
        "corpus evaluated"
    );

    Ok(CorpusEvaluation { images, stats })
}

/// Score thresholds x overlap thresholds to sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdGrid {
    pub score_thresholds: Vec<f64>,
    pub overlap_thresholds: Vec<f64>,
}

impl ThresholdGrid {
    /// Create a validated grid.
    ///
    /// # Errors
    ///
    /// Both axes must be non-empty; overlap thresholds must lie in [0, 1]
    /// and score thresholds must be finite.
    pub fn new(score_thresholds: Vec<f64>, overlap_thresholds: Vec<f64>) -> Result<Self> {
        let grid = Self {
            score_thresholds,
            overlap_thresholds,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Check a grid built by hand or deserialized.
    pub fn validate(&self) -> Result<()> {
        if self.score_thresholds.is_empty() || self.overlap_thresholds.is_empty() {
            return Err(RoiEvalError::InvalidThreshold(
                "threshold grid needs at least one score and one overlap threshold".to_string(),
            ));
        }
        for &t in &self.score_thresholds {
            validate_score_threshold(t)?;
        }
        for &t in &self.overlap_thresholds {
            validate_overlap_threshold(t)?;
        }
        Ok(())
    }

    /// Build a grid from two ranges.
    pub fn from_ranges(score: &ThresholdRange, overlap: &ThresholdRange) -> Result<Self> {
        Self::new(score.values()?, overlap.values()?)
    }
}

/// Totals for one (score threshold, overlap threshold) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepCell {
    pub score_index: usize,
    pub overlap_index: usize,
    pub score_threshold: f64,
    pub overlap_threshold: f64,
    pub stats: CorpusStats,
}

/// Result of a threshold sweep; cells are ordered by score index, then overlap index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub match_level: MatchLevel,
    pub strategy: MatchStrategy,
    pub grid: ThresholdGrid,
    pub cells: Vec<SweepCell>,
}

impl SweepResult {
    /// Cell at (`score_index`, `overlap_index`).
    pub fn cell(&self, score_index: usize, overlap_index: usize) -> Option<&SweepCell> {
        if score_index >= self.grid.score_thresholds.len()
            || overlap_index >= self.grid.overlap_thresholds.len()
        {
            return None;
        }
        self.cells
            .get(score_index * self.grid.overlap_thresholds.len() + overlap_index)
    }

    /// Precision-recall points across score thresholds at one overlap threshold.
    pub fn pr_curve(&self, overlap_index: usize) -> Vec<PrecisionRecallPoint> {
        (0..self.grid.score_thresholds.len())
            .filter_map(|s| self.cell(s, overlap_index))
            .map(|cell| PrecisionRecallPoint {
                precision: cell.stats.precision(),
                recall: cell.stats.detection_rate(),
                false_alarms: cell.stats.false_alarms(),
                threshold: cell.score_threshold,
            })
            .collect()
    }
}

/// Evaluate the corpus at every cell of a threshold grid.
///
/// Candidates are ranked once per image and score threshold, then resolved
/// at every overlap threshold. Rows of the grid run in parallel.
///
/// # Errors
///
/// Fails on an invalid grid or strategy and on misaligned records.
pub fn sweep(
    truth: &[ImageRecord],
    computed: &[ImageRecord],
    grid: &ThresholdGrid,
    level: MatchLevel,
    strategy: MatchStrategy,
) -> Result<SweepResult> {
    grid.validate()?;
    check_strategy(level, strategy)?;
    validate_alignment(truth, computed)?;

    let rows: Vec<Vec<SweepCell>> = grid
        .score_thresholds
        .par_iter()
        .enumerate()
        .map(|(score_index, &score_threshold)| -> Result<Vec<SweepCell>> {
            let mut totals = vec![CorpusStats::new(); grid.overlap_thresholds.len()];

            for (t, c) in truth.iter().zip(computed) {
                match (level, strategy) {
                    (MatchLevel::Exclusive, MatchStrategy::Optimal) => {
                        let (scores, considered) = considered_scores(t, c, Some(score_threshold));
                        for (total, &overlap) in totals.iter_mut().zip(&grid.overlap_thresholds) {
                            total.record(&resolve_assignment(&scores, &considered, overlap)?);
                        }
                    }
                    _ => {
                        let ranked = rank_candidates(t, c, Some(score_threshold))?;
                        for (total, &overlap) in totals.iter_mut().zip(&grid.overlap_thresholds) {
                            total.record(&resolve_ranked(&ranked, overlap, level));
                        }
                    }
                }
            }

            Ok(totals
                .into_iter()
                .zip(&grid.overlap_thresholds)
                .enumerate()
                .map(|(overlap_index, (stats, &overlap_threshold))| SweepCell {
                    score_index,
                    overlap_index,
                    score_threshold,
                    overlap_threshold,
                    stats,
                })
                .collect())
        })
        .collect::<Result<Vec<_>>>()?;

    let cells: Vec<SweepCell> = rows.into_iter().flatten().collect();
    info!(
        cells = cells.len(),
        images = truth.len(),
        level = %level,
        "threshold sweep finished"
    );

    Ok(SweepResult {
        match_level: level,
        strategy,
        grid: grid.clone(),
        cells,
    })
}
