//! roi-eval CLI: score computed regions of interest against ground truth.

use clap::{Parser, ValueEnum};
use roi_eval::config::EvalConfig;
use roi_eval::evaluator::{evaluate_corpus, sweep};
use roi_eval::loader::{load_computed, load_truth, InputFormat};
use roi_eval::matching::{MatchLevel, MatchStrategy};
use roi_eval::report::{write_image_lines, write_sweep_results};
use std::path::PathBuf;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for InputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => InputFormat::Text,
            FormatArg::Json => InputFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "roi-eval")]
#[command(about = "Score detected regions of interest against ground truth")]
#[command(version)]
struct Cli {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ground-truth region list.
    #[arg(long)]
    truth: Option<String>,

    /// Computed region list.
    #[arg(long)]
    computed: Option<String>,

    /// Input file format.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Overlap threshold in [0, 1]; scores must exceed it.
    #[arg(long)]
    overlap: Option<f64>,

    /// Exclusivity level: 1-4 or its name (e.g. "exclusive").
    #[arg(long, value_parser = parse_level)]
    level: Option<MatchLevel>,

    /// Use the optimal one-to-one assignment (exclusive level only).
    #[arg(long)]
    optimal: bool,

    /// Ignore computed regions whose score does not exceed this.
    #[arg(long)]
    score_threshold: Option<f64>,

    /// Value substituted for %s in every path.
    #[arg(long, short = 'i')]
    input_value: Option<String>,

    /// Write per-image target/background lines here.
    #[arg(long)]
    output: Option<String>,

    /// Print the totals as JSON instead of a summary line.
    #[arg(long)]
    json: bool,
}

fn parse_level(s: &str) -> Result<MatchLevel, String> {
    s.parse::<MatchLevel>().map_err(|e| e.to_string())
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    run(&config, cli.json)
}

fn build_config(cli: &Cli) -> CliResult<EvalConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading config: {}", path.display());
            EvalConfig::load_from_file(path)?
        }
        None => EvalConfig::default(),
    };

    if let Some(truth) = &cli.truth {
        config.truth_path = Some(truth.clone());
    }
    if let Some(computed) = &cli.computed {
        config.computed_path = Some(computed.clone());
    }
    if let Some(format) = cli.format {
        config.input_format = format.into();
    }
    if let Some(overlap) = cli.overlap {
        config.overlap_threshold = overlap;
    }
    if let Some(level) = cli.level {
        config.match_level = level;
    }
    if cli.optimal {
        config.strategy = MatchStrategy::Optimal;
    }
    if let Some(threshold) = cli.score_threshold {
        config.score_threshold = Some(threshold);
    }
    if let Some(value) = &cli.input_value {
        config.input_value = Some(value.clone());
    }
    if let Some(output) = &cli.output {
        config.output_results_path = Some(output.clone());
    }

    config.apply_input_value();
    config.validate()?;
    Ok(config)
}

fn run(config: &EvalConfig, json: bool) -> CliResult<()> {
    let (Some(truth_path), Some(computed_path)) = (&config.truth_path, &config.computed_path) else {
        return Err("both --truth and --computed are required".into());
    };

    let truth = load_truth(truth_path, config.input_format)?;
    let computed = load_computed(computed_path, config.input_format)?;
    tracing::info!(
        "Loaded {} ground-truth and {} computed images",
        truth.len(),
        computed.len()
    );

    if let Some(grid) = config.grid()? {
        let result = sweep(&truth, &computed, &grid, config.match_level, config.strategy)?;

        for (l, overlap) in grid.overlap_thresholds.iter().enumerate() {
            for point in result.pr_curve(l) {
                println!(
                    "overlap {:.2} score {}: false alarms {} detection rate {} precision {}",
                    overlap,
                    point.threshold,
                    point.false_alarms,
                    roi_eval::metrics::format_rate(point.recall),
                    roi_eval::metrics::format_rate(point.precision)
                );
            }
        }

        if let (Some(fa_tp), Some(pr_re)) = (&config.fa_tp_path, &config.pr_re_path) {
            write_sweep_results(fa_tp, pr_re, &result)?;
            tracing::info!("Sweep results written to {} and {}", fa_tp, pr_re);
        }

        if let Some(output) = &config.output_results_path {
            let params = config.results_params(&grid)?;
            let evaluation = evaluate_corpus(&truth, &computed, &params)?;
            write_image_lines(output, &computed, &evaluation)?;
            tracing::info!(
                "Per-image results at score {:?} overlap {} written to {}",
                params.score_threshold,
                params.overlap_threshold,
                output
            );
        }
        return Ok(());
    }

    let evaluation = evaluate_corpus(&truth, &computed, &config.params())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation.stats)?);
    } else {
        println!("{}", evaluation.stats.summary_string());
    }

    if let Some(output) = &config.output_results_path {
        write_image_lines(output, &computed, &evaluation)?;
        tracing::info!("Per-image results written to {}", output);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "roi-eval",
            "--truth",
            "truth_%s.txt",
            "--computed",
            "computed_%s.txt",
            "--level",
            "4",
            "--optimal",
            "--overlap",
            "0.5",
            "-i",
            "day1",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.truth_path.as_deref(), Some("truth_day1.txt"));
        assert_eq!(config.match_level, MatchLevel::Exclusive);
        assert_eq!(config.strategy, MatchStrategy::Optimal);
        assert_eq!(config.overlap_threshold, 0.5);
    }

    #[test]
    fn test_sweep_with_single_report_path_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            r#"{"sweep": {}, "fa_tp_path": "fa_tp.txt", "match_level": "exclusive"}"#,
        )
        .unwrap();

        let cli = Cli::parse_from([
            "roi-eval",
            "--config",
            config_path.to_str().unwrap(),
            "--truth",
            "t.txt",
            "--computed",
            "c.txt",
        ]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_invalid_combination_rejected() {
        let cli = Cli::parse_from([
            "roi-eval",
            "--truth",
            "t.txt",
            "--computed",
            "c.txt",
            "--level",
            "semi-exclusive",
            "--optimal",
        ]);
        assert!(build_config(&cli).is_err());
        assert!(Cli::try_parse_from(["roi-eval", "--level", "7"]).is_err());
    }
}
