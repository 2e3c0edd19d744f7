use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::source::LogicalSource;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Detect, merge, and filter multi-source feedback CSV exports",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode local CSV files and report their detected schema and key columns
    Detect(DetectArgs),
    /// List the files of a collection and the feedback sources they feed
    Files(FilesArgs),
    /// Aggregate a feedback source and show categories, entries, and verbatims
    Report(ReportArgs),
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// One or more CSV files to inspect
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Args, Default)]
pub struct BackendArgs {
    /// YAML configuration file supplying defaults for the options below
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Local directory acting as the file store
    #[arg(long, conflicts_with = "drive_folder")]
    pub folder: Option<PathBuf>,
    /// Collection (subdirectory of --folder) to list; defaults to the root
    #[arg(long, conflicts_with = "drive_folder")]
    pub collection: Option<String>,
    /// Google Drive folder id acting as the file store; the folder itself is
    /// the collection
    #[arg(long = "drive-folder")]
    pub drive_folder: Option<String>,
    /// Google service-account JSON key for Drive requests
    #[arg(long = "service-account")]
    pub service_account: Option<PathBuf>,
    /// Bearer token for Drive requests
    #[arg(long = "access-token", env = "FEEDBACK_LENS_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
    /// OAuth credentials JSON file holding an access_token
    #[arg(long = "token-file")]
    pub token_file: Option<PathBuf>,
    /// API key for publicly shared Drive folders
    #[arg(long = "api-key", env = "FEEDBACK_LENS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Debug, Args)]
pub struct FilesArgs {
    #[command(flatten)]
    pub backend: BackendArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub backend: BackendArgs,
    /// Feedback source to aggregate
    #[arg(short = 's', long = "source", value_enum, default_value = "all")]
    pub source: LogicalSource,
    /// Category (reason value) to filter on; `All` disables filtering
    #[arg(short = 'c', long = "category", default_value = "All")]
    pub category: String,
    /// List every category instead of the most frequent few
    #[arg(long = "all-categories")]
    pub all_categories: bool,
    /// Number of categories shown when not listing all of them
    #[arg(long = "category-limit")]
    pub category_limit: Option<usize>,
    /// Number of feedback entries to include in the sample
    #[arg(long = "sample-rows")]
    pub sample_rows: Option<usize>,
    /// Output format
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,
}
