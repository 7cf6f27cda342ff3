//! Scalar root finding.
//!
//! An [`EquationProblem`] maps a solver variable to a model input and reads a
//! residual back from the model call. The transient integrators build one per
//! crossed event, with the step's interpolated time as the solver variable.
//!
//! [`EquationProblem`]: cellsim_core::EquationProblem

mod evaluate;

pub use evaluate::{EvalError, EvaluateResult, Evaluation, evaluate};

pub mod bisection;
