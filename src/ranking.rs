//! Candidate ranking: every ground-truth region against every computed region.

use crate::error::{RoiEvalError, Result};
use crate::metrics::iou::score_matrix;
use crate::threshold::confidence_mask;
use crate::types::{CandidateMatch, ImageRecord};

/// Ranked candidates for every ground-truth region of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidates {
    /// One list per ground-truth region, sorted by descending score.
    pub per_truth: Vec<Vec<CandidateMatch>>,
    /// Whether each computed region took part in scoring.
    pub considered: Vec<bool>,
}

impl RankedCandidates {
    /// Best score for ground-truth region `truth_index`, or 0.0 without candidates.
    pub fn best_score(&self, truth_index: usize) -> f64 {
        self.per_truth
            .get(truth_index)
            .and_then(|c| c.first())
            .map_or(0.0, |c| c.score)
    }
}

/// Check that two records describe the same image.
pub fn ensure_same_image(truth: &ImageRecord, computed: &ImageRecord) -> Result<()> {
    if truth.image_id != computed.image_id {
        return Err(RoiEvalError::ImageMismatch(format!(
            "ground truth '{}' paired with computed '{}'",
            truth.image_id, computed.image_id
        )));
    }
    Ok(())
}

/// Full truth x computed score matrix for one image, plus the confidence mask.
///
/// Columns of computed regions that fail `score_threshold` are never scored
/// and hold zeros, so column indices match positions in `computed`.
pub fn considered_scores(
    truth: &ImageRecord,
    computed: &ImageRecord,
    score_threshold: Option<f64>,
) -> (Vec<Vec<f64>>, Vec<bool>) {
    let considered = confidence_mask(&computed.regions, score_threshold);
    let kept: Vec<usize> = (0..considered.len()).filter(|&j| considered[j]).collect();
    let kept_regions: Vec<_> = kept.iter().map(|&j| &computed.regions[j]).collect();

    let scores = score_matrix(&truth.regions, &kept_regions)
        .into_iter()
        .map(|dense| {
            let mut row = vec![0.0; considered.len()];
            for (&j, score) in kept.iter().zip(dense) {
                row[j] = score;
            }
            row
        })
        .collect();

    (scores, considered)
}

/// Rank computed regions against each ground-truth region of one image.
///
/// Every pair is scored; only scores above zero are kept, and each list is
/// sorted by descending score with a stable sort, so equal scores keep the
/// computed-region order.
///
/// Computed regions whose confidence does not exceed `score_threshold` are
/// skipped; candidate indices still refer to positions in `computed`.
///
/// # Errors
///
/// Returns [`RoiEvalError::ImageMismatch`] if the records name different images.
///
/// # Example
///
/// ```
/// use roi_eval::ranking::rank_candidates;
/// use roi_eval::types::{ImageRecord, Rect};
///
/// let truth = ImageRecord::from_rects("a.png", &[Rect::new(0.0, 0.0, 10.0, 10.0)]);
/// let computed = ImageRecord::from_rects(
///     "a.png",
///     &[Rect::new(5.0, 0.0, 10.0, 10.0), Rect::new(0.0, 0.0, 10.0, 10.0)],
/// );
/// let ranked = rank_candidates(&truth, &computed, None).unwrap();
/// assert_eq!(ranked.per_truth[0][0].computed_index, 1);
/// ```
pub fn rank_candidates(
    truth: &ImageRecord,
    computed: &ImageRecord,
    score_threshold: Option<f64>,
) -> Result<RankedCandidates> {
    ensure_same_image(truth, computed)?;

    let (scores, considered) = considered_scores(truth, computed, score_threshold);
    let per_truth = scores
        .into_iter()
        .map(|row| {
            let mut candidates: Vec<CandidateMatch> = row
                .into_iter()
                .enumerate()
                .filter(|&(j, score)| considered[j] && score > 0.0)
                .map(|(computed_index, score)| CandidateMatch {
                    computed_index,
                    score,
                })
                .collect();

            candidates.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            candidates
        })
        .collect();

    Ok(RankedCandidates {
        per_truth,
        considered,
    })
}
