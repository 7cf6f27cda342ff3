use std::error::Error as StdError;

use log::debug;
use thiserror::Error;

use cellsim_core::{EquationProblem, Model, OdeProblem, Snapshot};

use crate::equation::bisection;

use super::Hermite;

/// A located zero crossing of an event value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    /// Index of the event in [`OdeProblem::events`].
    pub index: usize,
    /// Time at which the event value reached zero.
    pub time: f64,
}

/// Errors that can occur while locating an event crossing.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("problem error")]
    Problem(#[source] Box<dyn StdError + Send + Sync>),

    #[error("could not locate the crossing of event {index}")]
    Bisection {
        index: usize,
        #[source]
        source: bisection::Error,
    },
}

/// Crossings located within one accepted step.
pub(crate) struct Located<I, O> {
    /// Non-terminal crossings before the first terminal one, in time order.
    pub(crate) flagged: Vec<Crossing>,
    /// The earliest terminal crossing and the snapshot taken there.
    pub(crate) terminal: Option<(Crossing, Snapshot<I, O>)>,
}

/// Returns the indices of events that went from positive to non-positive.
pub(crate) fn crossed(before: &[f64], after: &[f64]) -> Vec<usize> {
    before
        .iter()
        .zip(after)
        .enumerate()
        .filter(|(_, (b, a))| **b > 0.0 && **a <= 0.0)
        .map(|(index, _)| index)
        .collect()
}

/// Returns the first terminal event whose value is already non-positive.
pub(crate) fn active_at_start<P: OdeProblem>(problem: &P, values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .find(|(index, value)| **value <= 0.0 && problem.is_terminal(*index))
        .map(|(index, _)| index)
}

/// Locates each crossed event within the step from `prev` to `next`.
///
/// # Errors
///
/// Returns an error if the step cannot be interpolated or bisection fails.
pub(crate) fn locate<M, P>(
    model: &M,
    problem: &P,
    prev: &Snapshot<M::Input, M::Output>,
    next: &Snapshot<M::Input, M::Output>,
    indices: &[usize],
    config: &bisection::Config,
) -> Result<Located<M::Input, M::Output>, LocateError>
where
    M: Model,
    P: OdeProblem<Input = M::Input, Output = M::Output>,
{
    let boxed = |e: P::Error| LocateError::Problem(Box::new(e));

    let t0 = problem.time(&prev.input);
    let t1 = problem.time(&next.input);
    let y0 = problem.state(&prev.input).map_err(boxed)?;
    let y1 = problem.state(&next.input).map_err(boxed)?;
    let f0 = problem
        .derivative(&prev.input, &prev.output)
        .map_err(boxed)?;
    let f1 = problem
        .derivative(&next.input, &next.output)
        .map_err(boxed)?;
    let step = Hermite::new(t0, &y0, &f0, t1, &y1, &f1);

    let mut found = Vec::with_capacity(indices.len());
    for &index in indices {
        let residual = EventResidual {
            problem,
            base: &prev.input,
            step,
            index,
        };
        let solution = bisection::solve_unobserved(model, &residual, [t0, t1], config)
            .map_err(|source| LocateError::Bisection { index, source })?;
        debug!("event {index} crossed zero at t = {}", solution.x);
        found.push((
            Crossing {
                index,
                time: solution.x,
            },
            solution.snapshot,
        ));
    }
    found.sort_by(|a, b| a.0.time.total_cmp(&b.0.time));

    let mut flagged = Vec::new();
    for (crossing, snapshot) in found {
        if problem.is_terminal(crossing.index) {
            return Ok(Located {
                flagged,
                terminal: Some((crossing, snapshot)),
            });
        }
        flagged.push(crossing);
    }

    Ok(Located {
        flagged,
        terminal: None,
    })
}

/// The value of one event along an interpolated step, as a root-finding problem.
struct EventResidual<'a, P: OdeProblem> {
    problem: &'a P,
    base: &'a P::Input,
    step: Hermite<'a>,
    index: usize,
}

impl<P: OdeProblem> EquationProblem for EventResidual<'_, P> {
    type Input = P::Input;
    type Output = P::Output;
    type Error = P::Error;

    fn input(&self, time: f64) -> Result<Self::Input, Self::Error> {
        let state = self.step.state_at(time);
        self.problem.build_input(self.base, time, &state)
    }

    fn residual(&self, input: &Self::Input, output: &Self::Output) -> Result<f64, Self::Error> {
        let values = self.problem.events(input, output)?;
        Ok(values.get(self.index).copied().unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_downward_crossings_only() {
        let before = [1.0, -1.0, 0.5, 2.0];
        let after = [-0.1, 1.0, 0.0, 1.0];
        assert_eq!(crossed(&before, &after), vec![0, 2]);
    }

    #[test]
    fn value_already_at_zero_is_not_a_new_crossing() {
        assert!(crossed(&[0.0], &[-1.0]).is_empty());
    }
}
