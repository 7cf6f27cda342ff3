//! Solves the simple ODE battery model and plots the result.
//!
//! ```text
//! simple-ode [CONFIG.toml]
//! ```
//!
//! Without an argument the default configuration is used. Build with
//! `--features plot` to open a plot window after the solve.

use std::{error::Error, process::ExitCode};

use log::{info, warn};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use cellsim_battery::{RunConfig, checks, model, simulate};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // The logger may not be installed yet.
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    TermLogger::init(
        config.log_level()?,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let solution = simulate(&config)?;

    if let (Some(t), Some(voltage)) = (
        solution.final_time(),
        solution.variable(model::VOLTAGE).and_then(<[f64]>::last),
    ) {
        info!("final state: t = {t:.6}, voltage = {voltage:.4} V");
    }

    let violations = checks::discharge_consistency(&solution, 1e-12);
    if !violations.is_empty() {
        warn!(
            "{} discharge inconsistencies in the solution",
            violations.len()
        );
    }

    #[cfg(feature = "plot")]
    cellsim_observers::quick_plot(
        &solution,
        &config.output_names(),
        cellsim_observers::ShowConfig::new().time_label("Time"),
    )?;

    Ok(())
}
