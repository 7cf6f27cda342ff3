//! Capability traits for cross-solver observers.
//!
//! These traits abstract over solver-specific event and action types, so one
//! observer can watch a Dormand–Prince solve, an Euler solve, or a whole
//! [`Simulation`](cellsim_symbolic::Simulation).
//!
//! # Event traits
//!
//! - [`HasTime`]: events from time integration
//! - [`HasResidual`]: events that carry a residual value
//!
//! # Action traits
//!
//! - [`CanStopEarly`]: actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use cellsim_core::Observer;
//! use cellsim_observers::traits::{CanStopEarly, HasTime};
//!
//! struct Deadline(f64);
//!
//! impl<E: HasTime, A: CanStopEarly> Observer<E, A> for Deadline {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.time() >= self.0).then(A::stop_early)
//!     }
//! }
//! ```

use cellsim_core::{EquationProblem, Model};
use cellsim_solvers::{
    equation::bisection,
    transient::{dopri, euler},
};
use cellsim_symbolic::{self as symbolic, Progress};

/// An event emitted during time integration.
pub trait HasTime {
    /// Returns the time of the snapshot this event reports.
    fn time(&self) -> f64;

    /// Returns the step number, with 0 for the initial state.
    fn step(&self) -> usize;
}

/// An event that carries a residual value.
pub trait HasResidual {
    /// Returns the residual for this event.
    ///
    /// Returns `f64::NAN` when the event represents an error and no residual
    /// is available.
    fn residual(&self) -> f64;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the solver early.
    fn stop_early() -> Self;
}

// --- HasTime impls ---

impl<I, O> HasTime for dopri::Event<I, O> {
    fn time(&self) -> f64 {
        self.time
    }

    fn step(&self) -> usize {
        self.step
    }
}

impl<I, O> HasTime for euler::Event<I, O> {
    fn time(&self) -> f64 {
        self.time
    }

    fn step(&self) -> usize {
        self.step
    }
}

impl HasTime for Progress {
    fn time(&self) -> f64 {
        self.time
    }

    fn step(&self) -> usize {
        self.step
    }
}

// --- HasResidual for bisection::Event ---

impl<M, P> HasResidual for bisection::Event<'_, M, P>
where
    M: Model,
    P: EquationProblem<Input = M::Input, Output = M::Output>,
{
    fn residual(&self) -> f64 {
        match self.result() {
            Ok(eval) => eval.residual,
            Err(_) => f64::NAN,
        }
    }
}

// --- CanStopEarly impls ---

impl CanStopEarly for bisection::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for dopri::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for euler::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for symbolic::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
