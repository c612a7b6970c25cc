use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "tokenplan",
    version,
    about = "Measure corpus token counts per tokenizer and estimate training time"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence terminal logging and the progress bar.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write logs to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List configured models and their fine-tune methods.
    Models(ModelsArgs),
    /// Tokenize a dataset with the selected models and compare the counts.
    Compare(CompareArgs),
    /// Estimate training time from a saved measurement or a token count.
    Estimate(EstimateArgs),
}

#[derive(Debug, Args)]
pub struct ModelsArgs {
    /// YAML configuration file.
    #[arg(short, long)]
    pub config: PathBuf,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// YAML configuration file.
    #[arg(short, long)]
    pub config: PathBuf,

    /// Dataset name or 1-based index; defaults to the first dataset.
    #[arg(short, long)]
    pub dataset: Option<String>,

    /// Models by 1-based index or name; empty selects every model.
    #[arg(short, long, value_delimiter = ',')]
    pub models: Vec<String>,

    /// Directory for measurement reports; defaults to `reports/` beside the config.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Do not save the measurement.
    #[arg(long)]
    pub no_save: bool,

    #[command(flatten)]
    pub estimate: EstimateOptions,
}

#[derive(Debug, Args)]
pub struct EstimateOptions {
    /// Fine-tune method to estimate, e.g. `full` or `lora`.
    #[arg(long)]
    pub method: Option<String>,

    /// Number of passes over the corpus.
    #[arg(long, default_value_t = 1)]
    pub epochs: u32,

    /// Scale counts to this corpus size, e.g. `500MB` or `2.5GB` (bare numbers are KB).
    #[arg(long, value_parser = parse_size_arg, requires = "method")]
    pub target_size: Option<u64>,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["report", "tokens"])))]
pub struct EstimateArgs {
    /// YAML configuration file.
    #[arg(short, long)]
    pub config: PathBuf,

    /// Measurement saved by `compare`.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Literal token count of one epoch.
    #[arg(long, requires = "model", conflicts_with = "target_size")]
    pub tokens: Option<u64>,

    /// Model to estimate; with `--report` limits the output to this model.
    #[arg(long)]
    pub model: Option<String>,

    /// Fine-tune method, e.g. `full` or `lora`.
    #[arg(long)]
    pub method: String,

    #[arg(long, default_value_t = 1)]
    pub epochs: u32,

    /// Scale the report's counts to this corpus size.
    #[arg(long, value_parser = parse_size_arg)]
    pub target_size: Option<u64>,
}

fn parse_size_arg(input: &str) -> Result<u64, String> {
    tokenplan_core::parse_size(input).map_err(|err| err.to_string())
}
