//! Stress tests with large corpora and crowded images.

use roi_eval::evaluator::{evaluate_corpus, sweep, EvalParams, ThresholdGrid};
use roi_eval::matching::{MatchLevel, MatchStrategy};
use roi_eval::types::{ImageRecord, LabeledRegion, Rect};

/// A 10x10 grid of 8x8 boxes, with detections shifted by `shift` pixels.
fn grid_image(image_id: &str, shift: f64) -> (ImageRecord, ImageRecord) {
    let mut truth = Vec::new();
    let mut computed = Vec::new();
    for i in 0..100 {
        let x = (i % 10) as f64 * 10.0;
        let y = (i / 10) as f64 * 10.0;
        truth.push(LabeledRegion::new(Rect::new(x, y, 8.0, 8.0)));
        computed.push(
            LabeledRegion::new(Rect::new(x + shift, y, 8.0, 8.0)).with_score(0.9 - i as f64 / 1000.0),
        );
    }
    (ImageRecord::new(image_id, truth), ImageRecord::new(image_id, computed))
}

#[test]
fn test_crowded_image_all_levels() {
    let (truth, computed) = grid_image("crowded", 0.0);

    for level in MatchLevel::ALL {
        let stats = evaluate_corpus(
            std::slice::from_ref(&truth),
            std::slice::from_ref(&computed),
            &EvalParams::new(0.5, level),
        )
        .unwrap()
        .stats;
        assert_eq!(stats.true_positives, 100, "level {}", level);
        assert_eq!(stats.false_positives, 0);
    }
}

#[test]
fn test_crowded_image_optimal_assignment() {
    // A 2-pixel shift keeps IoU at 48/80 = 0.6 with the intended box only.
    let (truth, computed) = grid_image("shifted", 2.0);
    let params = EvalParams::new(0.5, MatchLevel::Exclusive).with_strategy(MatchStrategy::Optimal);

    let stats = evaluate_corpus(&[truth], &[computed], &params).unwrap().stats;
    assert_eq!(stats.true_positives, 100);
    assert_eq!(stats.false_negatives, 0);
}

#[test]
fn test_many_images() {
    let (truth, computed): (Vec<_>, Vec<_>) = (0..500)
        .map(|i| grid_image(&format!("img{:04}", i), (i % 5) as f64))
        .unzip();

    let result = evaluate_corpus(&truth, &computed, &EvalParams::new(0.5, MatchLevel::Exclusive)).unwrap();
    assert_eq!(result.images.len(), 500);
    assert_eq!(result.images[499].image_id, "img0499");
    assert_eq!(result.stats.total_ground_truth, 50_000);

    // Shifts 0-2 keep IoU above 0.5; shifts 3 and 4 fall to 0.45 and 0.33.
    assert_eq!(result.stats.true_positives, 30_000);
    assert_eq!(result.stats.false_positives, 20_000);
}

#[test]
fn test_large_sweep() {
    let (truth, computed): (Vec<_>, Vec<_>) = (0..50)
        .map(|i| grid_image(&format!("img{}", i), (i % 3) as f64))
        .unzip();
    let grid = ThresholdGrid::new(
        (0..10).map(|i| 0.8 + i as f64 * 0.01).collect(),
        (0..21).map(|i| i as f64 * 0.05).collect(),
    )
    .unwrap();

    let result = sweep(&truth, &computed, &grid, MatchLevel::Exclusive, MatchStrategy::Greedy).unwrap();
    assert_eq!(result.cells.len(), 210);

    // Raising the score threshold never adds true positives.
    for l in 0..21 {
        let curve = result.pr_curve(l);
        assert!(curve.windows(2).all(|w| w[0].recall >= w[1].recall || w[1].recall.is_nan()));
    }
}
