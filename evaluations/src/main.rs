mod analyze;
mod args;
mod bench;
mod compare;
mod corpus;
mod dataset;
mod provider;
mod report;
mod train;

use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let cli = args::parse()?;

    match &cli.command {
        args::Command::Train(train_args) => train::run(train_args, &cli.embedding).await,
        args::Command::CreateDataset(create_args) => dataset::run_create(create_args),
        args::Command::Analyze(analyze_args) => {
            analyze::run(analyze_args, &cli.embedding, &cli.report_dir).await
        }
        args::Command::Compare(compare_args) => {
            compare::run(compare_args, &cli.embedding, &cli.report_dir).await
        }
        args::Command::Bench(bench_args) => {
            bench::run(bench_args, &cli.embedding, &cli.report_dir).await
        }
    }
}
