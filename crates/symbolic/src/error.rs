use thiserror::Error;

use cellsim_solvers::transient::{dopri, euler};

use crate::ModelError;

/// Errors from binding, discretising, or solving a model.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parameter `{0}` is referenced but has no value")]
    UndefinedParameter(String),

    #[error("parameter `{name}` must be bound to a {expected}")]
    ParameterKind { name: String, expected: &'static str },

    #[error("cannot update `{0}`: no such parameter")]
    UnknownParameter(String),

    #[error("ill-posed model")]
    Model(#[from] ModelError),

    #[error("invalid time span [{start}, {end}]")]
    InvalidSpan { start: f64, end: f64 },

    #[error("evaluation times must be finite, non-decreasing, and at least two")]
    InvalidEvaluationTimes,

    #[error("Euler step must be finite and positive, got {0}")]
    InvalidStep(f64),

    #[error("integration failed")]
    Dopri(#[from] dopri::Error),

    #[error("integration failed")]
    Euler(#[from] euler::Error),
}
