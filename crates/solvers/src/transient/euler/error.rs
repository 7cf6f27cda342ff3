use std::error::Error as StdError;

use crate::transient::LocateError;

/// Errors that can occur during Euler integration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("time step must be finite and positive, got {dt}")]
    InvalidStep { dt: f64 },

    #[error("state or derivative is not finite at t = {time}")]
    NonFiniteState { time: f64 },

    #[error("derivative has {found} entries but the state has {expected}")]
    DimensionMismatch { expected: usize, found: usize },

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
