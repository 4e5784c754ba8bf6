//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use jtgrow::AdmissionStrategy;

#[derive(Parser)]
#[command(name = "jtgrow")]
#[command(author, version, about = "Grow bounded-width junction trees over grid MRFs", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. info, jtgrow=debug)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log line format
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Don't load configuration file
    #[arg(long, global = true)]
    pub no_config: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Grow a junction tree and print its shape
    Build(RunArgs),

    /// Grow a junction tree, run the sequential engine and check completion
    Sample(RunArgs),

    /// Configuration file management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Grid rows
    #[arg(long)]
    pub rows: Option<usize>,

    /// Grid columns
    #[arg(long)]
    pub cols: Option<usize>,

    /// States per variable
    #[arg(long)]
    pub arity: Option<u32>,

    /// Root variable (defaults to the grid center)
    #[arg(long)]
    pub root: Option<u32>,

    /// Admission strategy
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Maximum variables per clique
    #[arg(short = 'w', long)]
    pub max_width: Option<usize>,

    /// Maximum product of arities per clique
    #[arg(long)]
    pub max_factor_size: Option<u64>,

    /// Stop after accepting this many variables
    #[arg(long)]
    pub max_vertices: Option<usize>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Initialize default configuration file
    Init,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Insert into the live tree, widening ancestors
    Incremental,
    /// Replay the accepted order after each addition
    Replay,
    /// Recompute min-fill from scratch after each addition
    MinFill,
}

impl From<StrategyArg> for AdmissionStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Incremental => AdmissionStrategy::Incremental,
            StrategyArg::Replay => AdmissionStrategy::Replay,
            StrategyArg::MinFill => AdmissionStrategy::MinFill,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human-readable records
    Compact,
    /// Newline-delimited JSON records
    Json,
}
