//! Ask and retrieve commands

use clap::Args;
use tracing::info;

use crate::build_application;
use crate::domain::answer::AnswerResult;
use crate::domain::retrieval::{truncate_chars, RetrievedPassage};
use crate::infrastructure::services::GuardedAnswer;

/// Arguments for the ask command
#[derive(Args, Clone)]
pub struct AskArgs {
    /// Question to answer
    pub question: String,

    /// Number of passages to retrieve (overrides config)
    #[arg(long)]
    pub k: Option<usize>,

    /// Characters kept from each passage (overrides config)
    #[arg(long)]
    pub max_chars: Option<usize>,

    /// Verify the answer against its context with the judge
    #[arg(long)]
    pub guarded: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the retrieve command
#[derive(Args, Clone)]
pub struct RetrieveArgs {
    pub question: String,

    #[arg(long)]
    pub k: Option<usize>,
}

/// Run the ask command
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let app = build_application(&config).await?;

    if args.guarded {
        let mut guarded = app.guarded()?;
        if let Some(k) = args.k {
            guarded = guarded.with_verification_k(k);
        }

        let run = guarded.run(&args.question).await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&run)?);
        } else {
            print!("{}", render_guarded(&run));
        }
        return Ok(());
    }

    let k = args.k.unwrap_or(config.pipeline.default_k);
    let max_chars = args.max_chars.unwrap_or(config.pipeline.max_chars_per_passage);
    let result = app.pipeline.answer(&args.question, k, max_chars).await?;

    info!(sources = result.sources.len(), "Answer ready");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_answer(&result));
    }

    Ok(())
}

/// Run the retrieve command
pub async fn run_retrieve(args: RetrieveArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let app = build_application(&config).await?;

    let k = args.k.unwrap_or(config.pipeline.default_k);
    let passages = app.pipeline.inspect_retrieval(&args.question, k).await?;

    print!("{}", render_passages(&passages, config.pipeline.preview_chars));
    Ok(())
}

fn render_answer(result: &AnswerResult) -> String {
    let mut out = format!("{}\n", result.answer_text);

    if result.has_sources() {
        out.push_str("\nSources:\n");
        for (i, source) in result.sources.iter().enumerate() {
            out.push_str(&format!("  [{}] {}\n", i + 1, source.source_id));
        }
    }

    out
}

fn render_guarded(run: &GuardedAnswer) -> String {
    let verdict = &run.verification;
    let mut out = format!("{}\n", run.answer);

    out.push_str(&format!(
        "\nVerification: grounded={} out_of_scope={} faithfulness={}/5\n  {}\n",
        verdict.is_grounded, verdict.out_of_scope, verdict.faithfulness_score, verdict.reason
    ));

    if !run.sources.is_empty() {
        out.push_str("\nSources:\n");
        for (i, source) in run.sources.iter().enumerate() {
            out.push_str(&format!("  [{}] {}\n", i + 1, source.source_id));
        }
    }

    out
}

fn render_passages(passages: &[RetrievedPassage], preview_chars: usize) -> String {
    if passages.is_empty() {
        return "No passages retrieved.\n".to_string();
    }

    passages
        .iter()
        .map(|p| {
            format!(
                "#{} {}\n{}\n\n",
                p.rank + 1,
                p.source_id,
                truncate_chars(&p.content, preview_chars)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::answer::{SourceRef, NO_CONTEXT_ANSWER};
    use crate::domain::verification::VerificationResult;

    #[test]
    fn test_render_answer_lists_sources() {
        let passage = RetrievedPassage::new("ql.Date(15, 6, 2020)", "data/quantlib_md/dates.md", 0);
        let result = AnswerResult::new("q", "ql.Date(15, 6, 2020)", vec![SourceRef::from_passage(&passage, 10)]);

        assert_eq!(render_answer(&result), "ql.Date(15, 6, 2020)\n\nSources:\n  [1] dates.md\n");
        assert_eq!(
            render_answer(&AnswerResult::no_context("q")),
            format!("{}\n", NO_CONTEXT_ANSWER)
        );
    }

    #[test]
    fn test_render_guarded_shows_verdict() {
        let run = GuardedAnswer {
            question: "q".into(),
            answer: "a".into(),
            sources: vec![],
            contexts: vec![],
            verification: VerificationResult::new(false, true, 1, "not in context"),
        };

        let text = render_guarded(&run);

        assert!(text.contains("grounded=false out_of_scope=true faithfulness=1/5"));
        assert!(text.contains("not in context"));
    }

    #[test]
    fn test_render_passages() {
        let passages = vec![RetrievedPassage::new("abcdef", "a.md", 0)];

        assert_eq!(render_passages(&passages, 3), "#1 a.md\nabc\n\n");
        assert_eq!(render_passages(&[], 3), "No passages retrieved.\n");
    }
}
