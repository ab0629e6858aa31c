//! Evaluation commands

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use super::report::render_summary;
use crate::build_application;
use crate::infrastructure::evaluation::{load_test_set, EvaluationReport};
use crate::infrastructure::observability::init_metrics;

/// Arguments for the eval command
#[derive(Args, Clone)]
pub struct EvalArgs {
    /// JSON array of {question, gold_source}
    #[arg(long, default_value = "data/test_set.json")]
    pub test_set: PathBuf,

    #[arg(long)]
    pub k: Option<usize>,

    /// Collect answers only; judge later with `judge`
    #[arg(long)]
    pub no_judge: bool,

    /// Questions evaluated concurrently (overrides config)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Backend label written to every row (overrides config)
    #[arg(long)]
    pub backend: Option<String>,

    /// Report path; defaults to <output_dir>/<backend>.csv
    #[arg(long = "out", short)]
    pub output: Option<PathBuf>,

    /// Also write a Prometheus snapshot next to the report
    #[arg(long)]
    pub metrics: bool,
}

/// Arguments for the judge command
#[derive(Args, Clone)]
pub struct JudgeArgs {
    /// Report produced by `eval --no-judge`
    #[arg(long, short)]
    pub input: PathBuf,

    /// Where to write the judged report; defaults to overwriting the input
    #[arg(long = "out", short)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub k: Option<usize>,
}

/// Run the eval command
pub async fn run(args: EvalArgs) -> anyhow::Result<()> {
    let mut config = super::bootstrap()?;
    if let Some(backend) = args.backend {
        config.evaluation.backend_label = backend;
    }
    let metrics = if args.metrics { Some(init_metrics()?) } else { None };
    let app = build_application(&config).await?;

    let cases = load_test_set(&args.test_set)?;
    let k = args.k.unwrap_or(config.pipeline.default_k);
    let concurrency = args.concurrency.unwrap_or(config.evaluation.concurrency);

    let records = app
        .evaluator()
        .evaluate_dataset(&cases, k, !args.no_judge, concurrency)
        .await?;
    let report = EvaluationReport::new(records);

    let output = args.output.unwrap_or_else(|| {
        default_report_path(&config.evaluation.output_dir, &config.evaluation.backend_label)
    });
    report.write_csv(&output)?;
    info!(path = %output.display(), rows = report.len(), "Report written");

    if let Some(metrics) = metrics {
        let path = metrics_path_for(&output);
        std::fs::write(&path, metrics.render())?;
        info!(path = %path.display(), "Metrics snapshot written");
    }

    print!("{}", render_summary(&report.summary()));
    Ok(())
}

/// Run the judge command
pub async fn run_judge(args: JudgeArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let app = build_application(&config).await?;

    if !app.judge_enabled() {
        anyhow::bail!("judge is disabled; set judge.enabled = true to score answers");
    }

    let report = EvaluationReport::read_csv(&args.input)?;
    let k = args.k.unwrap_or(config.pipeline.default_k);

    let judged = app
        .evaluator()
        .judge_existing_answers(report.into_records(), k)
        .await?;
    let judged = EvaluationReport::new(judged);

    let output = args.output.unwrap_or(args.input);
    judged.write_csv(&output)?;
    info!(path = %output.display(), rows = judged.len(), "Judged report written");

    print!("{}", render_summary(&judged.summary()));
    Ok(())
}

fn default_report_path(output_dir: &str, backend_label: &str) -> PathBuf {
    let file = backend_label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect::<String>();

    Path::new(output_dir).join(format!("{}.csv", file))
}

fn metrics_path_for(report: &Path) -> PathBuf {
    report.with_extension("prom")
}
