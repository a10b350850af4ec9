//! Run configuration loaded from JSON.
//!
//! Any path may contain `%s`, which [`EvalConfig::apply_input_value`] replaces
//! with `input_value`. One config file can then drive runs over many inputs.

use crate::error::{RoiEvalError, Result};
use crate::evaluator::{EvalParams, ThresholdGrid};
use crate::loader::InputFormat;
use crate::matching::{check_strategy, MatchLevel, MatchStrategy};
use crate::threshold::{validate_overlap_threshold, validate_score_threshold, ThresholdRange};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::warn;

/// Placeholder replaced by `input_value` in every path.
pub const PLACEHOLDER: &str = "%s";

/// Score and overlap ranges for a threshold sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub score: ThresholdRange,
    pub overlap: ThresholdRange,
    /// Grid cell (score index, overlap index) whose per-image lines go to
    /// `output_results_path`.
    pub results_cell: (usize, usize),
}

impl Default for SweepConfig {
    /// Ten score levels from 200 to 290 and overlaps from 0 to 1 in steps of 0.05.
    /// Per-image lines come from the last score level at overlap 0.2.
    fn default() -> Self {
        Self {
            score: ThresholdRange::new(200.0, 290.0, 10),
            overlap: ThresholdRange::new(0.0, 1.0, 21),
            results_cell: (9, 4),
        }
    }
}

/// Everything needed to run one evaluation or sweep.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    pub truth_path: Option<String>,
    pub computed_path: Option<String>,
    pub input_format: InputFormat,
    pub overlap_threshold: f64,
    pub match_level: MatchLevel,
    pub strategy: MatchStrategy,
    pub score_threshold: Option<f64>,
    pub sweep: Option<SweepConfig>,
    /// Per-image target/background lines.
    pub output_results_path: Option<String>,
    /// Sweep false alarms vs. detection rate.
    pub fa_tp_path: Option<String>,
    /// Sweep precision vs. recall.
    pub pr_re_path: Option<String>,
    pub input_value: Option<String>,
}

impl EvalConfig {
    /// Parse a config from a JSON string.
    ///
    /// # Example
    ///
    /// ```
    /// use roi_eval::config::EvalConfig;
    /// use roi_eval::matching::MatchLevel;
    ///
    /// let config = EvalConfig::from_json_str(r#"{
    ///     "truth_path": "truth_%s.txt",
    ///     "computed_path": "computed_%s.txt",
    ///     "match_level": "exclusive",
    ///     "overlap_threshold": 0.5
    /// }"#).unwrap();
    /// assert_eq!(config.match_level, MatchLevel::Exclusive);
    /// assert!(config.sweep.is_none());
    /// ```
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load a config from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    fn paths_mut(&mut self) -> [&mut Option<String>; 5] {
        [
            &mut self.truth_path,
            &mut self.computed_path,
            &mut self.output_results_path,
            &mut self.fa_tp_path,
            &mut self.pr_re_path,
        ]
    }

    /// Replace every `%s` in every path with `input_value`.
    ///
    /// Does nothing when `input_value` is unset.
    pub fn apply_input_value(&mut self) {
        let Some(value) = self.input_value.clone() else {
            if self.paths_mut().into_iter().flatten().any(|p| p.contains(PLACEHOLDER)) {
                warn!("config paths contain '{}' but no input value was given", PLACEHOLDER);
            }
            return;
        };

        for path in self.paths_mut().into_iter().flatten() {
            *path = path.replace(PLACEHOLDER, &value);
        }
    }

    /// Check that the config describes a runnable evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`RoiEvalError::InvalidConfig`] for missing input paths or an
    /// incompatible strategy, and [`RoiEvalError::InvalidThreshold`] for bad
    /// thresholds or sweep ranges.
    pub fn validate(&self) -> Result<()> {
        if self.truth_path.is_none() {
            return Err(RoiEvalError::InvalidConfig("truth_path is required".to_string()));
        }
        if self.computed_path.is_none() {
            return Err(RoiEvalError::InvalidConfig("computed_path is required".to_string()));
        }

        validate_overlap_threshold(self.overlap_threshold)?;
        if let Some(threshold) = self.score_threshold {
            validate_score_threshold(threshold)?;
        }
        check_strategy(self.match_level, self.strategy)?;

        match (&self.sweep, self.grid()?) {
            (Some(sweep), Some(grid)) => {
                if self.fa_tp_path.is_some() != self.pr_re_path.is_some() {
                    return Err(RoiEvalError::InvalidConfig(
                        "fa_tp_path and pr_re_path must be set together".to_string(),
                    ));
                }
                if self.output_results_path.is_some() {
                    self.results_params(&grid)?;
                }
                if self.score_threshold.is_some() {
                    warn!(
                        cell = ?sweep.results_cell,
                        "score_threshold is ignored by the sweep"
                    );
                }
            }
            _ => {
                if self.fa_tp_path.is_some() || self.pr_re_path.is_some() {
                    warn!("sweep report paths are set but no sweep is configured");
                }
            }
        }
        Ok(())
    }

    /// Parameters for a single evaluation run.
    pub fn params(&self) -> EvalParams {
        EvalParams {
            overlap_threshold: self.overlap_threshold,
            match_level: self.match_level,
            strategy: self.strategy,
            score_threshold: self.score_threshold,
        }
    }

    /// Parameters of the sweep cell reported in `output_results_path`.
    ///
    /// Without a sweep these are the single-run [`params`](Self::params).
    ///
    /// # Errors
    ///
    /// Returns [`RoiEvalError::InvalidConfig`] if the configured cell lies
    /// outside `grid`.
    pub fn results_params(&self, grid: &ThresholdGrid) -> Result<EvalParams> {
        let Some(sweep) = &self.sweep else {
            return Ok(self.params());
        };
        let (s, l) = sweep.results_cell;
        match (grid.score_thresholds.get(s), grid.overlap_thresholds.get(l)) {
            (Some(&score_threshold), Some(&overlap_threshold)) => Ok(EvalParams {
                overlap_threshold,
                match_level: self.match_level,
                strategy: self.strategy,
                score_threshold: Some(score_threshold),
            }),
            _ => Err(RoiEvalError::InvalidConfig(format!(
                "results_cell ({}, {}) is outside the {}x{} sweep grid",
                s,
                l,
                grid.score_thresholds.len(),
                grid.overlap_thresholds.len()
            ))),
        }
    }

    /// Threshold grid of the configured sweep, if any.
    pub fn grid(&self) -> Result<Option<ThresholdGrid>> {
        self.sweep
            .as_ref()
            .map(|sweep| ThresholdGrid::from_ranges(&sweep.score, &sweep.overlap))
            .transpose()
    }
}
