//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - loads or simulates observations
//! - runs the sequential grid update
//! - prints summaries and writes optional exports

use std::io::Write;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Command, RunArgs, SimulateArgs, SummarizeArgs};
use crate::domain::{GridConfig, GridRange, ObservationSource, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `bg` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::Summarize(args) => handle_summarize(args),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    // A second initialisation (e.g. from tests) is harmless; keep the first.
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let run = pipeline::run_inference(&config)?;

    println!(
        "{}",
        crate::report::format_run_header(
            &config,
            run.history.grid(),
            run.observations.len(),
            run.data_moments(),
        )
    );
    if !run.row_errors.is_empty() {
        println!("Skipped {} unparseable rows.\n", run.row_errors.len());
    }

    println!("{}", crate::report::format_summary_table(&run.summaries, config.every));
    if let Some(last) = run.history.last() {
        println!("{}", crate::report::format_marginals(run.history.grid(), last));
    }

    // Exports cover whatever history was produced, including a partial one.
    if let Some(path) = &config.export_csv {
        crate::io::export::write_history_csv(path, &run.history)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::history::write_history_json(path, &run.history, config.mode)?;
    }

    if let Some(failure) = run.failure {
        warn!(
            observations_seen = failure.observations_seen,
            total = run.observations.len(),
            "history is partial"
        );
        return Err(failure.into());
    }

    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let values = crate::data::generate_observations(args.mean, args.sd, args.count, args.seed)?;

    let mut text = String::with_capacity(values.len() * 20);
    for v in &values {
        text.push_str(&format!("{v}\n"));
    }

    match &args.output {
        Some(path) => std::fs::write(path, text)
            .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))?,
        None => std::io::stdout()
            .write_all(text.as_bytes())
            .map_err(|e| AppError::new(2, format!("Failed to write to stdout: {e}")))?,
    }
    Ok(())
}

fn handle_summarize(args: SummarizeArgs) -> Result<(), AppError> {
    let doc = crate::io::history::read_history_json(&args.history)?;
    let history = doc.to_history()?;
    let summaries = crate::report::summarize_history(&history);

    println!(
        "History: {} snapshots | mode={} | generated {}",
        history.len(),
        doc.mode.label(),
        doc.generated_at.to_rfc3339()
    );
    println!("{}", crate::report::format_summary_table(&summaries, args.every));
    if let Some(last) = history.last() {
        println!("{}", crate::report::format_marginals(history.grid(), last));
    }
    Ok(())
}

/// Resolve CLI flags into a `RunConfig`.
pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    let source = match (&args.input, args.simulate_n) {
        (Some(path), None) => ObservationSource::File {
            path: path.clone(),
            column: args.column.clone(),
            strict: args.strict,
        },
        (None, Some(n)) => ObservationSource::Simulated {
            mean: args.simulate_mean,
            sd: args.simulate_sd,
            n,
            seed: args.seed,
        },
        (Some(_), Some(_)) => {
            return Err(AppError::new(2, "Use either --input or --simulate-n, not both."));
        }
        (None, None) => {
            return Err(AppError::new(2, "No observations: pass --input FILE or --simulate-n N."));
        }
    };

    if args.every == 0 {
        return Err(AppError::new(2, "--every must be >= 1."));
    }

    Ok(RunConfig {
        grid: GridConfig {
            mean: GridRange::new(args.grid.mean_lo, args.grid.mean_hi, args.grid.mean_step),
            sd: GridRange::new(args.grid.sd_lo, args.grid.sd_hi, args.grid.sd_step),
        },
        mode: args.mode,
        source,
        every: args.every,
        export_csv: args.export_csv.clone(),
        export_json: args.export_json.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec![
            "bg", "run", "--mean-lo", "0", "--mean-hi", "4", "--mean-step", "1", "--sd-lo", "1",
            "--sd-hi", "2", "--sd-step", "1",
        ];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Command::Run(args) => args,
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn config_from_simulation_flags() {
        let cfg = run_config_from_args(&run_args(&["--simulate-n", "5", "--seed", "9"])).unwrap();
        assert_eq!(cfg.grid.mean, GridRange::new(0.0, 4.0, 1.0));
        assert_eq!(
            cfg.source,
            ObservationSource::Simulated {
                mean: 0.0,
                sd: 1.0,
                n: 5,
                seed: 9
            }
        );
    }

    #[test]
    fn config_requires_a_source() {
        let err = run_config_from_args(&run_args(&[])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn config_rejects_zero_every() {
        let err = run_config_from_args(&run_args(&["--simulate-n", "5", "--every", "0"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
