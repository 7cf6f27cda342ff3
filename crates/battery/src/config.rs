//! Run configuration for the `simple-ode` binary, read from TOML.
//!
//! Every field is optional:
//!
//! ```toml
//! t_end = 1.0
//! log_level = "info"
//! outputs = ["Voltage [V]", "Current [A]"]
//!
//! [solver]
//! kind = "dopri"
//! rtol = 1e-6
//! atol = 1e-8
//! max_steps = 100000
//!
//! [parameters]
//! "Electrode resistance [Ohm]" = 0.2
//! ```
//!
//! `[solver]` may instead be `kind = "euler"` with a step `dt`. Entries in
//! `[parameters]` override existing parameter values with scalars.

use std::{collections::BTreeMap, fs, io, path::Path, str::FromStr};

use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

use cellsim_solvers::transient::dopri;
use cellsim_symbolic::{self as symbolic, ParameterValues, Solver};

use crate::model::DEFAULT_OUTPUTS;

/// Errors that can occur when loading or applying a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid run configuration")]
    Parse(#[from] toml::de::Error),

    #[error("t_end must be finite and positive, got {0}")]
    EndTime(f64),

    #[error("unknown log level `{0}`")]
    LogLevel(String),

    #[error("Euler step must be finite and positive, got {0}")]
    EulerStep(f64),

    #[error("invalid solver settings")]
    Solver(#[from] dopri::ConfigError),

    #[error("invalid parameter override")]
    Parameters(#[source] symbolic::Error),
}

/// Integrator settings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SolverConfig {
    Dopri {
        #[serde(default = "default_rtol")]
        rtol: f64,
        #[serde(default = "default_atol")]
        atol: f64,
        #[serde(default = "default_max_steps")]
        max_steps: usize,
    },
    Euler {
        dt: f64,
    },
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig::Dopri {
            rtol: default_rtol(),
            atol: default_atol(),
            max_steps: default_max_steps(),
        }
    }
}

impl SolverConfig {
    /// Builds the validated solver.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance, step budget, or step size is invalid.
    pub fn solver(&self) -> Result<Solver, ConfigError> {
        match *self {
            SolverConfig::Dopri {
                rtol,
                atol,
                max_steps,
            } => {
                let config = dopri::Config::new(rtol, atol)?.with_max_steps(max_steps)?;
                Ok(Solver::Dopri(config))
            }
            SolverConfig::Euler { dt } => {
                if !dt.is_finite() || dt <= 0.0 {
                    return Err(ConfigError::EulerStep(dt));
                }
                Ok(Solver::Euler { dt })
            }
        }
    }
}

fn default_rtol() -> f64 {
    dopri::Config::default().rtol()
}

fn default_atol() -> f64 {
    dopri::Config::default().atol()
}

fn default_max_steps() -> usize {
    dopri::Config::default().max_steps()
}

fn default_t_end() -> f64 {
    1.0
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_outputs() -> Vec<String> {
    DEFAULT_OUTPUTS.iter().map(|&name| name.to_owned()).collect()
}

/// Settings for one run of the battery model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// End of the time window; the run starts at zero.
    #[serde(default = "default_t_end")]
    pub t_end: f64,

    #[serde(default)]
    pub solver: SolverConfig,

    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output variables to report and plot.
    #[serde(default = "default_outputs")]
    pub outputs: Vec<String>,

    /// Scalar overrides of existing parameter values.
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            t_end: default_t_end(),
            solver: SolverConfig::default(),
            log_level: default_log_level(),
            outputs: default_outputs(),
            parameters: BTreeMap::new(),
        }
    }
}

impl FromStr for RunConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: RunConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl RunConfig {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML for
    /// this schema, or holds invalid values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        content.parse()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.t_end.is_finite() || self.t_end <= 0.0 {
            return Err(ConfigError::EndTime(self.t_end));
        }
        self.log_level()?;
        self.solver.solver()?;
        Ok(())
    }

    /// Returns the logging threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the level name is not recognized.
    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    /// Applies the parameter overrides.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving `values` unchanged, if any override names a
    /// parameter that does not exist.
    pub fn apply_parameters(&self, values: &mut ParameterValues) -> Result<(), ConfigError> {
        values
            .update(
                self.parameters
                    .iter()
                    .map(|(name, &value)| (name.as_str(), value)),
            )
            .map_err(ConfigError::Parameters)
    }

    /// The output names as string slices.
    #[must_use]
    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(String::as_str).collect()
    }
}
