//! Basic evaluation example demonstrating core functionality.

use roi_eval::{
    evaluator::{evaluate_corpus, sweep, EvalParams, ThresholdGrid},
    loader::{parse_computed_str, parse_truth_str},
    metrics::{format_rate, iou::calculate_iou},
    MatchLevel, MatchStrategy, Rect,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== ROI Evaluation Example ===\n");

    // Example 1: IoU Calculation
    println!("1. IoU Calculation");
    let rect1 = Rect::new(10.0, 10.0, 50.0, 50.0);
    let rect2 = Rect::new(30.0, 30.0, 50.0, 50.0);
    println!("   IoU between overlapping rects: {:.4}", calculate_iou(&rect1, &rect2));
    println!();

    // Example 2: Load region lists
    println!("2. Loading Region Lists");
    let truth = parse_truth_str(
        "frame1.png 2 : vehicle 100 100 60 40 : vehicle 300 120 50 50\n\
         frame2.png 1 : vehicle 20 20 40 40\n",
    )?;
    let computed = parse_computed_str(
        "frame1.png 3 : vehicle 280 102 98 162 142 : vehicle 250 104 100 164 138 : vehicle 210 500 500 540 540\n\
         frame2.png 1 : vehicle 260 22 18 62 58\n",
    )?;
    println!("   Loaded {} images", truth.len());
    println!();

    // Example 3: Compare exclusivity levels
    println!("3. Exclusivity Levels (overlap > 0.5)");
    for level in MatchLevel::ALL {
        let result = evaluate_corpus(&truth, &computed, &EvalParams::new(0.5, level))?;
        println!(
            "   {:<28} TP={} FP={} FN={} detection rate={}",
            level.to_string(),
            result.stats.true_positives,
            result.stats.false_positives,
            result.stats.false_negatives,
            format_rate(result.stats.detection_rate())
        );
    }
    println!();

    // Example 4: Threshold sweep
    println!("4. Score Threshold Sweep");
    let grid = ThresholdGrid::new(vec![200.0, 255.0, 270.0], vec![0.5])?;
    let result = sweep(&truth, &computed, &grid, MatchLevel::Exclusive, MatchStrategy::Optimal)?;
    for point in result.pr_curve(0) {
        println!(
            "   score > {:>5}: false alarms={} precision={} recall={}",
            point.threshold,
            point.false_alarms,
            format_rate(point.precision),
            format_rate(point.recall)
        );
    }

    Ok(())
}
