//! Command-line parsing for the sequential grid posterior tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the inference code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::LikelihoodMode;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "bg",
    version,
    about = "Sequential Bayesian grid posterior for a normal population's mean and sd"
)]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run sequential inference over an observation stream and print snapshot summaries.
    Run(RunArgs),
    /// Write a synthetic normal observation stream.
    Simulate(SimulateArgs),
    /// Print summaries for a previously exported history JSON.
    Summarize(SummarizeArgs),
}

/// Grid axes. All six values are required.
#[derive(Debug, Args, Clone)]
pub struct GridArgs {
    /// Smallest candidate mean.
    #[arg(long, allow_hyphen_values = true)]
    pub mean_lo: f64,

    /// Largest candidate mean.
    #[arg(long, allow_hyphen_values = true)]
    pub mean_hi: f64,

    /// Spacing between candidate means.
    #[arg(long)]
    pub mean_step: f64,

    /// Smallest candidate sd (must be > 0).
    #[arg(long, allow_hyphen_values = true)]
    pub sd_lo: f64,

    /// Largest candidate sd.
    #[arg(long, allow_hyphen_values = true)]
    pub sd_hi: f64,

    /// Spacing between candidate sds.
    #[arg(long)]
    pub sd_step: f64,
}

/// Options for `bg run`.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Observations file (one number per line, or CSV).
    #[arg(short, long, value_name = "FILE", conflicts_with = "simulate_n")]
    pub input: Option<PathBuf>,

    /// CSV column holding the observations (first record is then a header).
    #[arg(long, requires = "input")]
    pub column: Option<String>,

    /// Fail on the first unparseable row instead of skipping it.
    #[arg(long, requires = "input")]
    pub strict: bool,

    /// Simulate this many observations instead of reading a file.
    #[arg(long)]
    pub simulate_n: Option<usize>,

    /// Mean of the simulated population.
    #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
    pub simulate_mean: f64,

    /// Sd of the simulated population.
    #[arg(long, default_value_t = 1.0)]
    pub simulate_sd: f64,

    /// Random seed for simulation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// How likelihoods are combined.
    #[arg(long, value_enum, default_value_t = LikelihoodMode::Log)]
    pub mode: LikelihoodMode,

    /// Print every K-th snapshot summary (the final one is always printed).
    #[arg(long, default_value_t = 1)]
    pub every: usize,

    /// Export the full history to long-format CSV.
    #[arg(long = "export-csv")]
    pub export_csv: Option<PathBuf>,

    /// Export the full history to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for `bg simulate`.
#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Population mean.
    #[arg(long, allow_hyphen_values = true)]
    pub mean: f64,

    /// Population sd.
    #[arg(long)]
    pub sd: f64,

    /// Number of observations.
    #[arg(short = 'n', long)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output file (stdout if omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Options for `bg summarize`.
#[derive(Debug, Args, Clone)]
pub struct SummarizeArgs {
    /// History JSON produced by `bg run --export-json`.
    #[arg(long, value_name = "JSON")]
    pub history: PathBuf,

    /// Print every K-th snapshot summary.
    #[arg(long, default_value_t = 1)]
    pub every: usize,
}
