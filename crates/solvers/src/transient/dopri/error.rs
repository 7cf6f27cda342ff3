use std::error::Error as StdError;

use thiserror::Error;

use crate::transient::LocateError;

/// Errors that can occur during Dormand–Prince integration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid time span [{start}, {end}]")]
    InvalidSpan { start: f64, end: f64 },

    #[error("state or derivative is not finite at t = {time}")]
    NonFiniteState { time: f64 },

    #[error("derivative has {found} entries but the state has {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("step size {step:e} fell below the minimum at t = {time}")]
    StepSizeUnderflow { time: f64, step: f64 },

    #[error("exceeded {max_steps} steps at t = {time}")]
    MaxStepsExceeded { time: f64, max_steps: usize },

    #[error("event location failed")]
    EventLocation(#[from] LocateError),

    #[error("model error: {0}")]
    Model(#[source] Box<dyn StdError + Send + Sync>),

    #[error("problem error: {0}")]
    Problem(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn model<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Model(Box::new(err))
    }

    pub(crate) fn problem<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Problem(Box::new(err))
    }
}
