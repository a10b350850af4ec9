use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use roi_eval::assignment::{solve, CostMatrix};
use roi_eval::evaluator::{evaluate_corpus, sweep, EvalParams, ThresholdGrid};
use roi_eval::matching::{resolve_ranked, MatchLevel, MatchStrategy};
use roi_eval::metrics::{calculate_iou, polygon_iou};
use roi_eval::ranking::rank_candidates;
use roi_eval::threshold::generate_threshold_range;
use roi_eval::types::{ImageRecord, LabeledRegion, Point, Polygon, Rect};

fn overlapping_image(image_id: &str, count: usize) -> (ImageRecord, ImageRecord) {
    let truth = (0..count)
        .map(|i| LabeledRegion::new(Rect::new(i as f64 * 12.0, 0.0, 20.0, 20.0)))
        .collect();
    let computed = (0..count)
        .map(|i| {
            LabeledRegion::new(Rect::new(i as f64 * 12.0 + 3.0, 2.0, 20.0, 20.0))
                .with_score(0.9 - i as f64 * 0.001)
        })
        .collect();
    (ImageRecord::new(image_id, truth), ImageRecord::new(image_id, computed))
}

fn bench_iou_calculation(c: &mut Criterion) {
    let rect1 = Rect::new(10.0, 10.0, 50.0, 50.0);
    let rect2 = Rect::new(30.0, 30.0, 50.0, 50.0);

    c.bench_function("iou_single", |b| {
        b.iter(|| calculate_iou(black_box(&rect1), black_box(&rect2)));
    });

    let poly1 = Polygon::from(rect1);
    let poly2 = Polygon::new(vec![
        Point::new(30.0, 30.0),
        Point::new(80.0, 40.0),
        Point::new(60.0, 90.0),
        Point::new(25.0, 70.0),
    ]);
    c.bench_function("polygon_iou_single", |b| {
        b.iter(|| polygon_iou(black_box(&poly1), black_box(&poly2)));
    });
}

fn bench_rank_and_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_and_resolve");

    for size in [10, 50, 100, 500].iter() {
        let (truth, computed) = overlapping_image("bench", *size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let ranked = rank_candidates(black_box(&truth), black_box(&computed), None).unwrap();
                for level in MatchLevel::ALL {
                    black_box(resolve_ranked(&ranked, 0.3, level));
                }
            });
        });
    }
    group.finish();
}

fn bench_hungarian(c: &mut Criterion) {
    let mut group = c.benchmark_group("hungarian");

    for size in [10, 50, 100, 200].iter() {
        let rows: Vec<Vec<i64>> = (0..*size)
            .map(|i| (0..*size).map(|j| ((i * 7919 + j * 104_729) % 1000) as i64).collect())
            .collect();
        let costs = CostMatrix::from_rows(rows).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| solve(black_box(&costs)).unwrap());
        });
    }
    group.finish();
}

fn bench_corpus(c: &mut Criterion) {
    let (truth, computed): (Vec<_>, Vec<_>) = (0..200)
        .map(|i| overlapping_image(&format!("img{}", i), 30))
        .unzip();

    c.bench_function("corpus_200_greedy", |b| {
        let params = EvalParams::new(0.3, MatchLevel::Exclusive);
        b.iter(|| evaluate_corpus(black_box(&truth), black_box(&computed), &params).unwrap());
    });

    c.bench_function("corpus_200_optimal", |b| {
        let params = EvalParams::new(0.3, MatchLevel::Exclusive).with_strategy(MatchStrategy::Optimal);
        b.iter(|| evaluate_corpus(black_box(&truth), black_box(&computed), &params).unwrap());
    });

    let grid = ThresholdGrid::new(
        generate_threshold_range(0.5, 0.9, 10).unwrap(),
        generate_threshold_range(0.0, 1.0, 21).unwrap(),
    )
    .unwrap();
    c.bench_function("sweep_200_10x21", |b| {
        b.iter(|| {
            sweep(
                black_box(&truth),
                black_box(&computed),
                &grid,
                MatchLevel::SemiExclusiveBest,
                MatchStrategy::Greedy,
            )
            .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_iou_calculation,
    bench_rank_and_resolve,
    bench_hungarian,
    bench_corpus,
);
criterion_main!(benches);
