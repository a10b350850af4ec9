//! Plain-text result files.

use crate::error::Result;
use crate::evaluator::{CorpusEvaluation, SweepResult};
use crate::metrics::rates::format_rate;
use crate::types::{ClassificationOutcome, ImageRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Describe the considered computed regions of one image as target or background.
///
/// A region is a target when it was credited with at least one ground truth.
/// Each region is written as its label (`-` when unlabeled) and bounding-box
/// corners: `<image> <n> : target car 10 20 40 60 : background - 0 0 5 5`.
pub fn format_image_line(computed: &ImageRecord, outcome: &ClassificationOutcome) -> String {
    let mut line = String::new();
    let mut count = 0;

    for (index, region) in computed.regions.iter().enumerate() {
        if !outcome.considered.get(index).copied().unwrap_or(false) {
            continue;
        }
        let Some(bbox) = region.region.bounding_box() else {
            continue;
        };

        let kind = if outcome.computed_matches.get(index).is_some_and(|m| !m.is_empty()) {
            "target"
        } else {
            "background"
        };
        line.push_str(&format!(
            " : {} {} {} {} {} {}",
            kind,
            region.label.as_deref().unwrap_or("-"),
            bbox.x,
            bbox.y,
            bbox.right(),
            bbox.bottom()
        ));
        count += 1;
    }

    format!("{} {}{}", computed.image_id, count, line)
}

/// Write one [`format_image_line`] per image.
pub fn write_image_lines<P: AsRef<Path>>(
    path: P,
    computed: &[ImageRecord],
    evaluation: &CorpusEvaluation,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(path.as_ref())?);
    for (record, image) in computed.iter().zip(&evaluation.images) {
        writeln!(out, "{}", format_image_line(record, &image.outcome))?;
    }
    out.flush()?;
    debug!(path = %path.as_ref().display(), "wrote per-image results");
    Ok(())
}

/// Write the two sweep tables, overlap index outermost.
///
/// The first file holds false alarm counts against detection rate, the second
/// precision against recall. Undefined rates are written as `n/a`.
pub fn write_sweep_results<P: AsRef<Path>, Q: AsRef<Path>>(
    fa_tp_path: P,
    pr_re_path: Q,
    sweep: &SweepResult,
) -> Result<()> {
    let mut fa_tp = BufWriter::new(File::create(fa_tp_path.as_ref())?);
    let mut pr_re = BufWriter::new(File::create(pr_re_path.as_ref())?);

    for l in 0..sweep.grid.overlap_thresholds.len() {
        for s in 0..sweep.grid.score_thresholds.len() {
            let Some(cell) = sweep.cell(s, l) else {
                continue;
            };
            writeln!(
                fa_tp,
                "s = {} l = {} false_alarms= {} true_detection_rate= {}",
                s,
                l,
                cell.stats.false_alarms(),
                format_rate(cell.stats.detection_rate())
            )?;
            writeln!(
                pr_re,
                "s = {} l = {} precision= {} recall= {}",
                s,
                l,
                format_rate(cell.stats.precision()),
                format_rate(cell.stats.detection_rate())
            )?;
        }
    }

    fa_tp.flush()?;
    pr_re.flush()?;
    debug!(cells = sweep.cells.len(), "wrote sweep results");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{evaluate_corpus, sweep, EvalParams, ThresholdGrid};
    use crate::matching::{MatchLevel, MatchStrategy};
    use crate::types::{LabeledRegion, Rect};
    use std::fs;

    fn records() -> (Vec<ImageRecord>, Vec<ImageRecord>) {
        let truth = vec![ImageRecord::from_rects("a.png", &[Rect::new(0.0, 0.0, 10.0, 10.0)])];
        let computed = vec![ImageRecord::new(
            "a.png",
            vec![
                LabeledRegion::new(Rect::new(0.0, 0.0, 10.0, 10.0))
                    .with_label("car")
                    .with_score(0.9),
                LabeledRegion::new(Rect::new(40.0, 40.0, 5.0, 5.0)).with_score(0.8),
                LabeledRegion::new(Rect::new(80.0, 80.0, 5.0, 5.0)).with_score(0.1),
            ],
        )];
        (truth, computed)
    }

    #[test]
    fn test_format_image_line() {
        let (truth, computed) = records();
        let params = EvalParams::new(0.5, MatchLevel::Exclusive).with_score_threshold(0.5);
        let evaluation = evaluate_corpus(&truth, &computed, &params).unwrap();

        let line = format_image_line(&computed[0], &evaluation.images[0].outcome);
        assert_eq!(line, "a.png 2 : target car 0 0 10 10 : background - 40 40 45 45");
    }

    #[test]
    fn test_write_image_lines() {
        let (truth, computed) = records();
        let evaluation =
            evaluate_corpus(&truth, &computed, &EvalParams::new(0.5, MatchLevel::Exclusive)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");

        write_image_lines(&path, &computed, &evaluation).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("a.png 3 : target car"));
    }

    #[test]
    fn test_write_sweep_results() {
        let (truth, computed) = records();
        let grid = ThresholdGrid::new(vec![0.0, 0.95], vec![0.5]).unwrap();
        let result = sweep(&truth, &computed, &grid, MatchLevel::Exclusive, MatchStrategy::Greedy).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let fa_tp = dir.path().join("fa_tp.txt");
        let pr_re = dir.path().join("pr_re.txt");
        write_sweep_results(&fa_tp, &pr_re, &result).unwrap();

        let fa_tp = fs::read_to_string(fa_tp).unwrap();
        let lines: Vec<&str> = fa_tp.lines().collect();
        assert_eq!(lines[0], "s = 0 l = 0 false_alarms= 2 true_detection_rate= 1.000000");
        assert_eq!(lines[1], "s = 1 l = 0 false_alarms= 0 true_detection_rate= 0.000000");

        let pr_re = fs::read_to_string(pr_re).unwrap();
        let lines: Vec<&str> = pr_re.lines().collect();
        assert_eq!(lines[0], "s = 0 l = 0 precision= 0.333333 recall= 1.000000");
        assert_eq!(lines[1], "s = 1 l = 0 precision= n/a recall= 0.000000");
    }
}
