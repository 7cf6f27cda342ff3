//! A lumped ODE battery model.
//!
//! Two states track the stoichiometry of each electrode as a sinusoidal
//! current drains the cell. The terminal voltage combines the Chen 2020
//! LG M50 open-circuit voltages with an ohmic drop, and the solve stops when
//! either electrode is empty or full.
//!
//! ```no_run
//! use cellsim_battery::{RunConfig, simulate};
//!
//! let solution = simulate(&RunConfig::default())?;
//! println!("stopped by {}", solution.termination());
//! # Ok::<(), cellsim_battery::RunError>(())
//! ```

pub mod checks;
pub mod config;
pub mod model;
pub mod ocv;

mod parameters;
mod run;

pub use config::{ConfigError, RunConfig, SolverConfig};
pub use model::simple_ode_model;
pub use parameters::{chen2020_parameter_values, sinusoidal_current};
pub use run::{RunError, simulate};
