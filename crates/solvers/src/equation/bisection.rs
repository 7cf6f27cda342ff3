//! Bisection for scalar root finding.
//!
//! # Algorithm
//!
//! Both bracket endpoints are evaluated first and must have residuals of
//! opposite sign. The solver then evaluates the midpoint and keeps the half
//! whose endpoints still disagree. It stops when the bracket is narrower than
//! the x tolerances, when a residual is within `residual_tol` of zero, or
//! after `max_iters` midpoints.
//!
//! The reported solution is the evaluation closest to zero. Ties go to the
//! non-positive residual, which is the side of a bracket where an event
//! function has fired.
//!
//! # Observer Events
//!
//! One [`Event`] per evaluation: [`Event::Left`] and [`Event::Right`] for the
//! endpoints, then [`Event::Midpoint`] for each iteration. Returning
//! [`Action::StopEarly`] ends the search with the closest evaluation so far.

mod action;
mod bracket;
mod closest;
mod config;
mod error;
mod event;
mod solution;

pub use action::Action;
pub use bracket::{Bracket, BracketError, Sign};
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use cellsim_core::{EquationProblem, Model, Observer};

use crate::equation::{EvaluateResult, evaluate};

use bracket::Bounds;
use closest::Closest;

/// Finds a root of a scalar equation problem on a bracket.
///
/// # Errors
///
/// Returns an error if the bracket is invalid, the endpoint residuals share a
/// sign, a residual is not finite, or the model or problem fails.
pub fn solve<M, P, Obs>(
    model: &M,
    problem: &P,
    bracket: [f64; 2],
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: EquationProblem<Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M, P>, Action>,
{
    let bounds = Bounds::new(bracket)?;
    let [left, right] = bounds.as_array();
    let mut closest = Closest::none();

    let result = evaluate(model, problem, left);
    let action = observer.observe(&Event::Left {
        x: left,
        result: &result,
    });
    let Some(left_sign) = settle::<M, P>(action, result, &mut closest)? else {
        return closest.finish(Status::StoppedByObserver, 0);
    };

    let result = evaluate(model, problem, right);
    let action = observer.observe(&Event::Right {
        x: right,
        result: &result,
    });
    let Some(right_sign) = settle::<M, P>(action, result, &mut closest)? else {
        return closest.finish(Status::StoppedByObserver, 0);
    };

    if closest.within(config.residual_tol()) {
        return closest.finish(Status::Converged, 0);
    }

    let mut bracket = Bracket::new(bounds, left_sign, right_sign)?;

    for iter in 1..=config.max_iters() {
        if bracket.is_x_converged(config.x_abs_tol(), config.x_rel_tol()) {
            return closest.finish(Status::Converged, iter - 1);
        }

        let x = bracket.midpoint();
        let result = evaluate(model, problem, x);
        let action = observer.observe(&Event::Midpoint {
            x,
            bracket: &bracket,
            result: &result,
        });
        let Some(sign) = settle::<M, P>(action, result, &mut closest)? else {
            return closest.finish(Status::StoppedByObserver, iter);
        };
        bracket.shrink(x, sign);

        if closest.within(config.residual_tol()) {
            return closest.finish(Status::Converged, iter);
        }
    }

    closest.finish(Status::MaxIters, config.max_iters())
}

/// Finds a root without observer support.
///
/// # Errors
///
/// Returns an error under the same conditions as [`solve`].
pub fn solve_unobserved<M, P>(
    model: &M,
    problem: &P,
    bracket: [f64; 2],
    config: &Config,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: EquationProblem<Input = M::Input, Output = M::Output>,
{
    solve(model, problem, bracket, config, ())
}

/// Records an evaluation and returns its residual sign, or `None` if the
/// observer stopped the search.
///
/// A failed evaluation is only an error if the search continues.
fn settle<M, P>(
    action: Option<Action>,
    result: EvaluateResult<M, P>,
    closest: &mut Closest<M::Input, M::Output>,
) -> Result<Option<Sign>, Error>
where
    M: Model,
    P: EquationProblem<Input = M::Input, Output = M::Output>,
{
    let evaluated = result.map_err(Error::from).and_then(|eval| {
        if eval.residual.is_finite() {
            Ok(eval)
        } else {
            Err(Error::NonFiniteResidual {
                x: eval.x,
                residual: eval.residual,
            })
        }
    });

    match (action, evaluated) {
        (Some(Action::StopEarly), Ok(eval)) => {
            closest.update(eval);
            Ok(None)
        }
        (Some(Action::StopEarly), Err(_)) => Ok(None),
        (None, Ok(eval)) => {
            let sign = Sign::of(eval.residual);
            closest.update(eval);
            Ok(Some(sign))
        }
        (None, Err(error)) => Err(error),
    }
}

#[cfg(test)]
mod tests;
