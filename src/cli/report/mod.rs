//! Report combination and summary rendering

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::domain::evaluation::BackendSummary;
use crate::infrastructure::evaluation::EvaluationReport;

/// Arguments for the combine command
#[derive(Args, Clone)]
pub struct CombineArgs {
    /// Reports to concatenate, in order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Write the combined report here
    #[arg(long = "out", short)]
    pub output: Option<PathBuf>,
}

/// Run the combine command
pub async fn run(args: CombineArgs) -> anyhow::Result<()> {
    super::bootstrap()?;

    let reports = args
        .inputs
        .iter()
        .map(EvaluationReport::read_csv)
        .collect::<Result<Vec<_>, _>>()?;
    let combined = EvaluationReport::concat(reports);

    if let Some(ref output) = args.output {
        combined.write_csv(output)?;
        info!(path = %output.display(), rows = combined.len(), "Combined report written");
    }

    print!("{}", render_summary(&combined.summary()));
    Ok(())
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

/// Plain-text table with one row per backend
pub fn render_summary(summaries: &[BackendSummary]) -> String {
    let mut out = format!(
        "{:<16} {:>5} {:>7} {:>7} {:>7} {:>8} {:>7} {:>9} {:>9}\n",
        "backend", "n", "hit@k", "faith", "help", "overlap%", "suspect", "retr_ms", "llm_ms"
    );

    for s in summaries {
        out.push_str(&format!(
            "{:<16} {:>5} {:>7.2} {:>7} {:>7} {:>8.1} {:>7} {:>9.1} {:>9.1}\n",
            s.backend,
            s.questions,
            s.hit_rate,
            optional(s.mean_faithfulness),
            optional(s.mean_helpfulness),
            s.mean_overlap_percent,
            s.suspect_api_answers,
            s.mean_latency_retrieval_ms,
            s.mean_latency_llm_ms,
        ));
    }

    out
}
