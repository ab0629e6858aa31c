use clap::Parser;
use docs_rag_engine::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Ask(args) => cli::ask::run(args).await,
        Command::Retrieve(args) => cli::ask::run_retrieve(args).await,
        Command::Eval(args) => cli::eval::run(args).await,
        Command::Judge(args) => cli::eval::run_judge(args).await,
        Command::Combine(args) => cli::report::run(args).await,
    }
}
