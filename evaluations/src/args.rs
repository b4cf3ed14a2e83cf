use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.parent().unwrap_or(&manifest_dir).to_path_buf()
}

fn default_report_dir() -> PathBuf {
    workspace_root().join("evaluations/reports")
}

fn default_checkpoint_path() -> PathBuf {
    workspace_root().join("data/models/checkpoint.json")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    Hashed,
    FastEmbed,
}

impl Default for EmbeddingBackend {
    fn default() -> Self {
        Self::FastEmbed
    }
}

impl std::fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hashed => write!(f, "hashed"),
            Self::FastEmbed => write!(f, "fastembed"),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct EmbeddingArgs {
    /// Embedding backend
    #[arg(long, default_value_t = EmbeddingBackend::FastEmbed)]
    pub embedding_backend: EmbeddingBackend,

    /// FastEmbed model code
    #[arg(long)]
    pub embedding_model: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct TrainArgs {
    /// JSON dataset to train from
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Directory of .py files to build a dataset from instead
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Where to write the trained checkpoint
    #[arg(long, default_value_os_t = default_checkpoint_path())]
    pub output: PathBuf,

    /// Limit the number of samples used (0 = all)
    #[arg(long = "limit", default_value_t = 0)]
    pub limit_arg: usize,

    // Computed field (not an argument)
    #[arg(skip)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct CreateDatasetArgs {
    /// Directory of .py files to scan
    #[arg(long)]
    pub source_dir: PathBuf,

    /// Where to write the dataset
    #[arg(long, default_value = "dataset.json")]
    pub output: PathBuf,

    /// Limit the number of samples collected (0 = all)
    #[arg(long = "limit", default_value_t = 0)]
    pub limit_arg: usize,

    #[arg(skip)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct AnalyzeArgs {
    /// Python file to analyze
    #[arg(long)]
    pub file: PathBuf,

    /// Review model id; the configured default is used when omitted
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CompareArgs {
    /// Python file to review; a built-in snippet is used when omitted
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Also run backends that report themselves unavailable
    #[arg(long)]
    pub include_unavailable: bool,
}

#[derive(Debug, Clone, Args)]
pub struct BenchArgs {
    /// Static-check iterations per snippet
    #[arg(long, default_value_t = 20)]
    pub iterations: usize,

    /// Skip the AI backend timings and bench only the static checks
    #[arg(long)]
    pub static_only: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Embed a training dataset and save the centroid checkpoint
    Train(TrainArgs),
    /// Scan a directory of Python files into a labelled dataset
    CreateDataset(CreateDatasetArgs),
    /// Run the static checks and one AI review on a file, writing a report
    Analyze(AnalyzeArgs),
    /// Run one snippet through every review backend side by side
    Compare(CompareArgs),
    /// Time the static checks and the review backends
    Bench(BenchArgs),
}

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub embedding: EmbeddingArgs,

    /// Directory to write evaluation reports
    #[arg(long, default_value_os_t = default_report_dir())]
    pub report_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn finalize(&mut self) -> Result<()> {
        if self.embedding.embedding_backend == EmbeddingBackend::Hashed
            && self.embedding.embedding_model.is_some()
        {
            return Err(anyhow!(
                "--embedding-model cannot be used with the 'hashed' embedding backend"
            ));
        }

        match &mut self.command {
            Command::Train(args) => {
                if args.dataset.is_some() == args.source_dir.is_some() {
                    return Err(anyhow!(
                        "train needs exactly one of --dataset or --source-dir"
                    ));
                }
                args.limit = (args.limit_arg > 0).then_some(args.limit_arg);
            }
            Command::CreateDataset(args) => {
                args.limit = (args.limit_arg > 0).then_some(args.limit_arg);
            }
            Command::Bench(args) => {
                if args.iterations == 0 {
                    return Err(anyhow!("--iterations must be greater than zero"));
                }
            }
            Command::Analyze(_) | Command::Compare(_) => {}
        }

        Ok(())
    }
}

pub fn parse() -> Result<Cli> {
    let mut cli = Cli::parse();
    cli.finalize()?;
    Ok(cli)
}

pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating parent directory for {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_requires_one_input_source() {
        let mut cli = Cli::parse_from(["granska-eval", "train"]);
        assert!(cli.finalize().is_err());

        let mut cli = Cli::parse_from(["granska-eval", "train", "--dataset", "d.json"]);
        assert!(cli.finalize().is_ok());

        let mut cli = Cli::parse_from([
            "granska-eval",
            "train",
            "--dataset",
            "d.json",
            "--source-dir",
            "src",
        ]);
        assert!(cli.finalize().is_err());
    }

    #[test]
    fn hashed_backend_rejects_model_override() {
        let mut cli = Cli::parse_from([
            "granska-eval",
            "--embedding-backend",
            "hashed",
            "--embedding-model",
            "jina-embeddings-v2-base-code",
            "compare",
        ]);
        assert!(cli.finalize().is_err());
    }

    #[test]
    fn limit_zero_means_unbounded() {
        let mut cli = Cli::parse_from(["granska-eval", "train", "--dataset", "d.json"]);
        cli.finalize().expect("finalize");
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert!(args.limit.is_none());

        let mut cli = Cli::parse_from([
            "granska-eval",
            "train",
            "--dataset",
            "d.json",
            "--limit",
            "25",
        ]);
        cli.finalize().expect("finalize");
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(args.limit, Some(25));
    }
}
