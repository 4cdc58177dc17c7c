use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "envrisk",
    about = "envrisk - Score how suspicious a client environment looks from collected detection signals",
    version
)]
pub struct Args {
    /// Signal bundle JSON file (reads stdin when omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Engine configuration file (.toml or .json) with weights and penalties
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Treat the input as a JSON array of bundles and assess them in parallel
    #[arg(short, long)]
    pub batch: bool,

    /// Number of parallel assessment threads in batch mode (0 = auto-detect)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,

    /// Enable verbose logging of all pipeline stages
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, ValueEnum, PartialEq)]
pub enum OutputFormat {
    /// Full report as pretty-printed JSON
    Json,
    /// Colored terminal summary
    Text,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}
