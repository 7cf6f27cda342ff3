use thiserror::Error;

use crate::equation::bisection;

/// Configuration for the Dormand–Prince solver.
///
/// Construct with [`Config::new`] or [`Config::default`] and refine with the
/// `with_*` methods, each of which validates its input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    rtol: f64,
    atol: f64,
    initial_step: Option<f64>,
    min_step: f64,
    max_step: f64,
    max_steps: usize,
    event: bisection::Config,
}

/// Errors that can occur when validating a Dormand–Prince config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rtol must be finite and positive")]
    Rtol,

    #[error("atol must be finite and positive")]
    Atol,

    #[error("initial step must be finite and positive")]
    InitialStep,

    #[error("step bounds must satisfy 0 <= min_step <= max_step, with max_step positive")]
    StepBounds,

    #[error("max_steps must be positive")]
    MaxSteps,

    #[error("invalid event location settings: {0}")]
    Event(#[from] bisection::ConfigError),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-8,
            initial_step: None,
            min_step: 1e-12,
            max_step: f64::INFINITY,
            max_steps: 100_000,
            event: bisection::Config::default(),
        }
    }
}

impl Config {
    /// Creates a config with the given tolerances and default step settings.
    ///
    /// # Errors
    ///
    /// Returns an error if either tolerance is non-positive or non-finite.
    pub fn new(rtol: f64, atol: f64) -> Result<Self, ConfigError> {
        if !rtol.is_finite() || rtol <= 0.0 {
            return Err(ConfigError::Rtol);
        }
        if !atol.is_finite() || atol <= 0.0 {
            return Err(ConfigError::Atol);
        }
        Ok(Self {
            rtol,
            atol,
            ..Self::default()
        })
    }

    /// Sets a fixed initial step instead of the automatic estimate.
    ///
    /// # Errors
    ///
    /// Returns an error if `step` is non-positive or non-finite.
    pub fn with_initial_step(self, step: f64) -> Result<Self, ConfigError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::InitialStep);
        }
        Ok(Self {
            initial_step: Some(step),
            ..self
        })
    }

    /// Sets the smallest and largest allowed step sizes.
    ///
    /// `max_step` may be infinite.
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds are negative, NaN, or out of order.
    pub fn with_step_bounds(self, min_step: f64, max_step: f64) -> Result<Self, ConfigError> {
        if !min_step.is_finite() || min_step < 0.0 || max_step.is_nan() || max_step <= 0.0 {
            return Err(ConfigError::StepBounds);
        }
        if min_step > max_step {
            return Err(ConfigError::StepBounds);
        }
        Ok(Self {
            min_step,
            max_step,
            ..self
        })
    }

    /// Sets the maximum number of attempted steps (accepted plus rejected).
    ///
    /// # Errors
    ///
    /// Returns an error if `max_steps` is zero.
    pub fn with_max_steps(self, max_steps: usize) -> Result<Self, ConfigError> {
        if max_steps == 0 {
            return Err(ConfigError::MaxSteps);
        }
        Ok(Self { max_steps, ..self })
    }

    /// Sets the absolute time tolerance used when locating event crossings.
    ///
    /// The other bisection settings are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if `tol` is negative or non-finite.
    pub fn with_event_tolerance(self, tol: f64) -> Result<Self, ConfigError> {
        let event = bisection::Config::new(
            self.event.max_iters(),
            tol,
            self.event.x_rel_tol(),
            self.event.residual_tol(),
        )?;
        Ok(Self { event, ..self })
    }

    #[must_use]
    pub fn rtol(&self) -> f64 {
        self.rtol
    }

    #[must_use]
    pub fn atol(&self) -> f64 {
        self.atol
    }

    #[must_use]
    pub fn initial_step(&self) -> Option<f64> {
        self.initial_step
    }

    #[must_use]
    pub fn min_step(&self) -> f64 {
        self.min_step
    }

    #[must_use]
    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Returns the bisection settings used to locate event crossings.
    #[must_use]
    pub fn event(&self) -> &bisection::Config {
        &self.event
    }
}
