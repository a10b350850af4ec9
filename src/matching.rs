//! Exclusivity resolution: turning ranked candidates into TP/FP/FN.
//!
//! Four mutually exclusive policies decide how one-to-many overlaps are
//! credited. Levels 1-3 work from the ranked candidate lists; level 4 either
//! pairs greedily by descending score or takes the optimal global assignment.

use crate::assignment::{solve, CostMatrix};
use crate::error::{RoiEvalError, Result};
use crate::ranking::RankedCandidates;
use crate::types::ClassificationOutcome;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// How overlaps between ground-truth and computed regions are credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchLevel {
    /// Level 1: every computed region above threshold is credited with every
    /// ground truth it overlaps.
    #[default]
    NonExclusive,
    /// Level 2: a computed region is credited only with its best ground truth.
    SemiExclusive,
    /// Level 3: as level 2, and each ground truth credits only its best
    /// computed region; the others become false positives.
    SemiExclusiveBest,
    /// Level 4: strict one-to-one pairing.
    Exclusive,
}

impl MatchLevel {
    pub const ALL: [MatchLevel; 4] = [
        MatchLevel::NonExclusive,
        MatchLevel::SemiExclusive,
        MatchLevel::SemiExclusiveBest,
        MatchLevel::Exclusive,
    ];

    /// Select a policy by its numeric level (1-4).
    ///
    /// # Errors
    ///
    /// Returns [`RoiEvalError::InvalidConfig`] for any other number.
    pub fn from_level(level: u8) -> Result<Self> {
        match level {
            1 => Ok(MatchLevel::NonExclusive),
            2 => Ok(MatchLevel::SemiExclusive),
            3 => Ok(MatchLevel::SemiExclusiveBest),
            4 => Ok(MatchLevel::Exclusive),
            other => Err(RoiEvalError::InvalidConfig(format!(
                "match level must be 1-4, got {}",
                other
            ))),
        }
    }

    /// Numeric level (1-4).
    pub fn level(self) -> u8 {
        match self {
            MatchLevel::NonExclusive => 1,
            MatchLevel::SemiExclusive => 2,
            MatchLevel::SemiExclusiveBest => 3,
            MatchLevel::Exclusive => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MatchLevel::NonExclusive => "non-exclusive",
            MatchLevel::SemiExclusive => "semi-exclusive",
            MatchLevel::SemiExclusiveBest => "semi-exclusive-best",
            MatchLevel::Exclusive => "exclusive",
        }
    }
}

impl fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.level())
    }
}

impl FromStr for MatchLevel {
    type Err = RoiEvalError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(level) = s.parse::<u8>() {
            return Self::from_level(level);
        }
        Self::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RoiEvalError::InvalidConfig(format!("unknown match level '{}'", s)))
    }
}

/// How level-4 pairs are chosen.
///
/// The default is `Greedy` at every level, including [`MatchLevel::Exclusive`].
/// `Optimal` must be selected explicitly and is rejected outside level 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// Pair by descending overlap score.
    #[default]
    Greedy,
    /// Pair by the minimum-cost global assignment.
    Optimal,
}

/// Check that a strategy can be used with a level.
///
/// The optimal assignment is one-to-one by construction, so it only makes
/// sense for [`MatchLevel::Exclusive`].
pub fn check_strategy(level: MatchLevel, strategy: MatchStrategy) -> Result<()> {
    if strategy == MatchStrategy::Optimal && level != MatchLevel::Exclusive {
        return Err(RoiEvalError::InvalidConfig(format!(
            "optimal assignment requires the exclusive level, got {}",
            level
        )));
    }
    Ok(())
}

fn by_score_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Count outcomes from the per-computed-region credit lists.
fn finalize(
    truth_count: usize,
    considered: &[bool],
    computed_matches: Vec<Vec<usize>>,
) -> ClassificationOutcome {
    let mut credited = vec![false; truth_count];
    for &truth in computed_matches.iter().flatten() {
        credited[truth] = true;
    }
    let true_positives = credited.iter().filter(|&&c| c).count();
    let false_positives = computed_matches
        .iter()
        .zip(considered)
        .filter(|(matches, considered)| **considered && matches.is_empty())
        .count();

    ClassificationOutcome {
        true_positives,
        false_positives,
        false_negatives: truth_count - true_positives,
        computed_matches,
        considered: considered.to_vec(),
    }
}

/// Resolve ranked candidates under `level` at overlap threshold `overlap_threshold`.
///
/// Only scores strictly greater than the threshold count. At
/// [`MatchLevel::Exclusive`] pairs are taken greedily by descending score;
/// use [`resolve_assignment`] for the optimal pairing.
///
/// # Example
///
/// ```
/// use roi_eval::matching::{resolve_ranked, MatchLevel};
/// use roi_eval::ranking::rank_candidates;
/// use roi_eval::types::{ImageRecord, Rect};
///
/// let truth = ImageRecord::from_rects("a", &[Rect::new(0.0, 0.0, 10.0, 10.0)]);
/// let computed = ImageRecord::from_rects(
///     "a",
///     &[Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(0.0, 0.0, 10.0, 10.0)],
/// );
/// let ranked = rank_candidates(&truth, &computed, None).unwrap();
///
/// let outcome = resolve_ranked(&ranked, 0.1, MatchLevel::NonExclusive);
/// assert_eq!((outcome.true_positives, outcome.false_positives), (1, 0));
///
/// let outcome = resolve_ranked(&ranked, 0.1, MatchLevel::Exclusive);
/// assert_eq!((outcome.true_positives, outcome.false_positives), (1, 1));
/// ```
pub fn resolve_ranked(
    ranked: &RankedCandidates,
    overlap_threshold: f64,
    level: MatchLevel,
) -> ClassificationOutcome {
    let truth_count = ranked.per_truth.len();
    let computed_matches = match level {
        MatchLevel::Exclusive => greedy_exclusive(ranked, overlap_threshold),
        _ => inbound_matches(ranked, overlap_threshold, level),
    };

    let outcome = finalize(truth_count, &ranked.considered, computed_matches);
    debug_assert!(
        level != MatchLevel::NonExclusive
            || outcome.true_positives
                == (0..truth_count)
                    .filter(|&i| ranked.best_score(i) > overlap_threshold)
                    .count()
    );
    outcome
}

/// Levels 1-3: invert per-truth candidates into per-computed inbound lists.
fn inbound_matches(
    ranked: &RankedCandidates,
    overlap_threshold: f64,
    level: MatchLevel,
) -> Vec<Vec<usize>> {
    let mut inbound: Vec<Vec<(usize, f64)>> = vec![Vec::new(); ranked.considered.len()];
    for (truth, candidates) in ranked.per_truth.iter().enumerate() {
        for c in candidates.iter().filter(|c| c.score > overlap_threshold) {
            inbound[c.computed_index].push((truth, c.score));
        }
    }
    for list in &mut inbound {
        list.sort_by(|a, b| by_score_desc(a.1, b.1));
    }

    if matches!(level, MatchLevel::SemiExclusive | MatchLevel::SemiExclusiveBest) {
        for list in &mut inbound {
            list.truncate(1);
        }
    }

    if level == MatchLevel::SemiExclusiveBest {
        // Each ground truth keeps only its strongest claimant; ties go to the
        // lower computed index.
        let mut best_claim: Vec<Option<(usize, f64)>> = vec![None; ranked.per_truth.len()];
        for (computed, list) in inbound.iter().enumerate() {
            for &(truth, score) in list {
                match best_claim[truth] {
                    Some((_, best)) if best >= score => {}
                    _ => best_claim[truth] = Some((computed, score)),
                }
            }
        }
        for (computed, list) in inbound.iter_mut().enumerate() {
            list.retain(|&(truth, _)| best_claim[truth].map(|(c, _)| c) == Some(computed));
        }
    }

    inbound
        .into_iter()
        .map(|list| list.into_iter().map(|(truth, _)| truth).collect())
        .collect()
}

/// Level 4, greedy: accept pairs by descending score while both sides are free.
fn greedy_exclusive(ranked: &RankedCandidates, overlap_threshold: f64) -> Vec<Vec<usize>> {
    let mut pairs: Vec<(usize, usize, f64)> = ranked
        .per_truth
        .iter()
        .enumerate()
        .flat_map(|(truth, candidates)| {
            candidates
                .iter()
                .filter(|c| c.score > overlap_threshold)
                .map(move |c| (truth, c.computed_index, c.score))
        })
        .collect();
    pairs.sort_by(|a, b| by_score_desc(a.2, b.2));

    let mut truth_used = vec![false; ranked.per_truth.len()];
    let mut computed_matches = vec![Vec::new(); ranked.considered.len()];
    for (truth, computed, _) in pairs {
        if !truth_used[truth] && computed_matches[computed].is_empty() {
            truth_used[truth] = true;
            computed_matches[computed].push(truth);
        }
    }
    computed_matches
}

/// Resolve level 4 with the optimal global assignment.
///
/// `scores[i][j]` is the overlap between ground truth `i` and computed region
/// `j`. Only computed regions flagged in `considered` take part. The pairing
/// minimizes total quantized cost; a pair is credited only if its score is
/// strictly greater than `overlap_threshold`.
///
/// # Errors
///
/// Returns [`RoiEvalError::InvalidCostMatrix`] if `scores` is ragged or does
/// not match `considered`, and [`RoiEvalError::AssignmentInfeasible`] if the
/// solver misbehaves.
pub fn resolve_assignment(
    scores: &[Vec<f64>],
    considered: &[bool],
    overlap_threshold: f64,
) -> Result<ClassificationOutcome> {
    if let Some(row) = scores.iter().position(|r| r.len() != considered.len()) {
        return Err(RoiEvalError::InvalidCostMatrix(format!(
            "score row {} has {} columns, expected {}",
            row,
            scores[row].len(),
            considered.len()
        )));
    }

    let active: Vec<usize> = (0..considered.len()).filter(|&j| considered[j]).collect();
    let active_scores: Vec<Vec<f64>> = scores
        .iter()
        .map(|row| active.iter().map(|&j| row[j]).collect())
        .collect();

    let assignment = solve(&CostMatrix::from_scores(&active_scores)?)?;

    let mut computed_matches = vec![Vec::new(); considered.len()];
    for (truth, k) in assignment.pairs() {
        let computed = active[k];
        if scores[truth][computed] > overlap_threshold {
            computed_matches[computed].push(truth);
        }
    }

    Ok(finalize(scores.len(), considered, computed_matches))
}
