//! Solvers for ODE problems: integrating a state forward in time.
//!
//! An [`OdeProblem`] exposes a flat state vector, its derivative, and a set of
//! event values. Solvers in this module advance the state and watch the event
//! values after every accepted step. When an event value reaches or crosses
//! zero, the crossing time is located with [`bisection`] on a cubic
//! [`Hermite`] interpolant of the step.
//!
//! # Solvers
//!
//! - [`dopri`]: adaptive Dormand–Prince 5(4) with error control
//! - [`euler`]: fixed-step forward Euler
//!
//! [`OdeProblem`]: cellsim_core::OdeProblem
//! [`bisection`]: crate::equation::bisection

mod crossing;
mod hermite;

pub use crossing::{Crossing, LocateError};
pub use hermite::Hermite;

pub mod dopri;
pub mod euler;
