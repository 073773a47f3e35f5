// src/cli/args.rs
use crate::auc::AucMode;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "linkshield",
    version,
    about = "How exposed are hidden edges to link prediction?"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    pub verbose: bool,
    /// Config file (defaults to ./linkshield.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Hide one edge of the best-connected node and rank every predictor by AUC
    Auc {
        #[command(flatten)]
        graph: GraphArgs,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        #[arg(long)]
        json: bool,
    },
    /// List the non-edges a predictor scores highest
    Predict {
        #[command(flatten)]
        graph: GraphArgs,
        #[arg(long, default_value = "commonNeighbours")]
        predictor: String,
        #[arg(long, default_value_t = 10)]
        top: usize,
        #[arg(long)]
        json: bool,
    },
    /// Find the edge removals that best hide an edge from every predictor
    Shield {
        #[command(flatten)]
        graph: GraphArgs,
        /// Edges removed per candidate
        #[arg(long, default_value_t = 1)]
        budget: usize,
        /// Incident edges considered for removal
        #[arg(long, default_value_t = 8)]
        pool: usize,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct GraphArgs {
    #[arg(long, value_enum, default_value_t = ModelArg::Ba)]
    pub model: ModelArg,
    #[arg(long, default_value_t = 100)]
    pub nodes: usize,
    /// Average degree (ignored by cycle and grid)
    #[arg(long, default_value_t = 4)]
    pub degree: usize,
    /// Rewiring probability of the small-world model
    #[arg(long, default_value_t = 0.1)]
    pub beta: f64,
    #[arg(long)]
    pub directed: bool,
    /// Overrides the config seed
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelArg {
    /// Barabási–Albert
    Ba,
    /// Erdős–Rényi
    Er,
    /// Watts–Strogatz
    Ws,
    Cycle,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Auto,
    Exact,
    Mc,
}

impl From<ModeArg> for AucMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => AucMode::Auto,
            ModeArg::Exact => AucMode::Exact,
            ModeArg::Mc => AucMode::MonteCarlo,
        }
    }
}
