use log::info;
use thiserror::Error;

use cellsim_observers::ProgressLog;
use cellsim_symbolic::{self as symbolic, Simulation, Solution};

use crate::{ConfigError, RunConfig, chen2020_parameter_values, simple_ode_model};

/// Errors that can occur while running the battery model.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("simulation failed")]
    Simulation(#[from] symbolic::Error),

    #[error("`{0}` is not an output of the model")]
    UnknownOutput(String),
}

/// Solves the battery model with the Chen 2020 parameters over `[0, t_end]`,
/// applying the overrides and solver settings of `config`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, an override or output
/// names an unknown quantity, or the solve fails.
pub fn simulate(config: &RunConfig) -> Result<Solution, RunError> {
    let model = simple_ode_model();
    let mut values = chen2020_parameter_values();
    config.apply_parameters(&mut values)?;

    if let Some(unknown) = config
        .outputs
        .iter()
        .find(|name| !model.variables().iter().any(|(output, _)| output == *name))
    {
        return Err(RunError::UnknownOutput(unknown.clone()));
    }

    let sim = Simulation::new(&model, &values)?.with_solver(config.solver.solver()?);
    let solution =
        sim.solve_observed([0.0, config.t_end], ProgressLog::new(model.name()).every(50))?;

    info!(
        "{}: {} samples, stopped by {}",
        solution.model_name(),
        solution.len(),
        solution.termination()
    );
    Ok(solution)
}
