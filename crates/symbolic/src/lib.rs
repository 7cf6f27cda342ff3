//! Declarative lumped ODE models and their simulation.
//!
//! A model is written with [`Expr`] trees over time, named state
//! [`Variable`]s, and named parameters. [`ParameterValues`] binds the
//! parameters to scalars or functions and compiles the model into a
//! [`DiscretisedModel`], which the solvers in `cellsim-solvers` integrate.
//! [`Simulation`] ties the steps together and returns a [`Solution`] with
//! every output variable sampled over time.
//!
//! ```
//! use cellsim_symbolic::{BaseModel, Event, Expr, ParameterValues, Simulation, Variable};
//!
//! let x = Variable::new("x");
//! let model = BaseModel::new("drain")
//!     .with_rhs(&x, -Expr::parameter("rate"))
//!     .with_initial_condition(&x, 1.0)
//!     .with_variable("x", x.expr())
//!     .with_event(Event::termination("empty", x.expr()));
//!
//! let values = ParameterValues::new().with_scalar("rate", 2.0);
//! let solution = Simulation::new(&model, &values)?.solve([0.0, 1.0])?;
//!
//! assert!((solution.final_time().unwrap() - 0.5).abs() < 1e-9);
//! # Ok::<(), cellsim_symbolic::Error>(())
//! ```

mod discretise;
mod error;
mod event;
mod expr;
mod model;
mod parameters;
mod simulation;
mod solution;

pub use discretise::{DiscretisedModel, Evaluation, Point};
pub use error::Error;
pub use event::{Event, EventKind};
pub use expr::{BinaryOp, Expr, UnaryOp, Variable};
pub use model::{BaseModel, ModelError};
pub use parameters::{Function, ParameterValues, Value};
pub use simulation::{Action, Progress, Simulation, Solver};
pub use solution::{FlaggedEvent, Solution, Termination};
