//! Numerical solvers for cellsim.
//!
//! - [`equation`]: root finding for [`EquationProblem`]s
//! - [`transient`]: time integration of [`OdeProblem`]s with event detection
//!
//! Every solver takes a [`Model`], a problem that adapts solver variables to
//! model inputs, and an [`Observer`] that can watch or steer the solve.
//!
//! [`EquationProblem`]: cellsim_core::EquationProblem
//! [`OdeProblem`]: cellsim_core::OdeProblem
//! [`Model`]: cellsim_core::Model
//! [`Observer`]: cellsim_core::Observer

pub mod equation;
pub mod transient;
