//! CLI module for the docs RAG engine
//!
//! Subcommands:
//! - `ask`: answer a question (optionally with grounding verification)
//! - `retrieve`: show the passages retrieved for a question
//! - `eval`: run the evaluation test set and write a CSV report
//! - `judge`: score answers of an earlier report with the judge
//! - `combine`: merge reports and print per-backend summaries

pub mod ask;
pub mod eval;
pub mod report;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Docs RAG - quote-only answers over a documentation corpus
#[derive(Parser)]
#[command(name = "docs-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Answer a question from the documentation
    Ask(ask::AskArgs),

    /// Show the passages retrieved for a question
    Retrieve(ask::RetrieveArgs),

    /// Evaluate the pipeline against a test set
    Eval(eval::EvalArgs),

    /// Judge the answers of an existing report
    Judge(eval::JudgeArgs),

    /// Combine reports and print summaries
    Combine(report::CombineArgs),
}

/// Load `.env`, layered configuration and the tracing subscriber
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from(["docs-rag", "ask", "How do I build a Date?", "--k", "3", "--guarded"])
            .unwrap();

        match cli.command {
            Command::Ask(args) => {
                assert_eq!(args.question, "How do I build a Date?");
                assert_eq!(args.k, Some(3));
                assert!(args.guarded);
                assert_eq!(args.max_chars, None);
                assert!(!args.json);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_eval_defaults() {
        let cli = Cli::try_parse_from(["docs-rag", "eval"]).unwrap();

        match cli.command {
            Command::Eval(args) => {
                assert_eq!(args.test_set.to_str(), Some("data/test_set.json"));
                assert!(!args.no_judge);
                assert!(!args.metrics);
                assert_eq!(args.output, None);
            }
            _ => panic!("expected eval"),
        }
    }

    #[test]
    fn test_parse_eval_and_judge_flags() {
        let cli = Cli::try_parse_from([
            "docs-rag", "eval", "--backend", "cloud", "--out", "data/eval/cloud.csv", "--no-judge",
        ])
        .unwrap();
        match cli.command {
            Command::Eval(args) => {
                assert_eq!(args.backend.as_deref(), Some("cloud"));
                assert!(args.no_judge);
                assert_eq!(args.output.as_deref().and_then(|p| p.to_str()), Some("data/eval/cloud.csv"));
            }
            _ => panic!("expected eval"),
        }

        let cli = Cli::try_parse_from(["docs-rag", "judge", "--input", "local.csv", "--k", "3"]).unwrap();
        match cli.command {
            Command::Judge(args) => {
                assert_eq!(args.input.to_str(), Some("local.csv"));
                assert_eq!(args.k, Some(3));
                assert_eq!(args.output, None);
            }
            _ => panic!("expected judge"),
        }
    }

    #[test]
    fn test_parse_combine_requires_inputs() {
        assert!(Cli::try_parse_from(["docs-rag", "combine"]).is_err());

        let cli = Cli::try_parse_from(["docs-rag", "combine", "local.csv", "cloud.csv", "--out", "all.csv"])
            .unwrap();
        match cli.command {
            Command::Combine(args) => {
                assert_eq!(args.inputs.len(), 2);
                assert_eq!(args.output.as_deref().and_then(|p| p.to_str()), Some("all.csv"));
            }
            _ => panic!("expected combine"),
        }
    }
}
