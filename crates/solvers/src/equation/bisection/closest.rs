use crate::equation::Evaluation;

use super::{Error, Solution, Status};

/// The evaluation whose residual is nearest zero.
///
/// On equal magnitudes a non-positive residual wins, so a located event is
/// reported on the side where it has already fired.
pub(super) struct Closest<I, O> {
    eval: Option<Evaluation<I, O>>,
}

impl<I, O> Closest<I, O> {
    pub(super) fn none() -> Self {
        Self { eval: None }
    }

    #[allow(clippy::float_cmp)]
    pub(super) fn update(&mut self, eval: Evaluation<I, O>) {
        let replace = match &self.eval {
            None => true,
            Some(kept) => {
                let (new, old) = (eval.residual.abs(), kept.residual.abs());
                new < old || (new == old && eval.residual <= 0.0 && kept.residual > 0.0)
            }
        };
        if replace {
            self.eval = Some(eval);
        }
    }

    /// Returns true if the closest residual is within `tol` of zero.
    pub(super) fn within(&self, tol: f64) -> bool {
        self.eval
            .as_ref()
            .is_some_and(|eval| eval.residual.abs() <= tol)
    }

    /// # Errors
    ///
    /// Returns `Error::NoSuccessfulEvaluation` if nothing was recorded.
    pub(super) fn finish(self, status: Status, iters: usize) -> Result<Solution<I, O>, Error> {
        let eval = self.eval.ok_or(Error::NoSuccessfulEvaluation)?;
        Ok(Solution {
            status,
            x: eval.x,
            residual: eval.residual,
            snapshot: eval.snapshot,
            iters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cellsim_core::Snapshot;

    fn eval(x: f64, residual: f64) -> Evaluation<(), ()> {
        Evaluation {
            x,
            residual,
            snapshot: Snapshot::new((), ()),
        }
    }

    #[test]
    fn keeps_the_smallest_magnitude() {
        let mut closest = Closest::none();
        closest.update(eval(0.0, 2.0));
        closest.update(eval(0.5, -0.25));
        closest.update(eval(0.75, 1.0));

        let solution = closest.finish(Status::Converged, 3).expect("recorded");

        assert_eq!(solution.x, 0.5);
        assert_eq!(solution.residual, -0.25);
        assert_eq!(solution.iters, 3);
    }

    #[test]
    fn ties_go_to_the_fired_side() {
        let mut closest = Closest::none();
        closest.update(eval(0.25, 0.5));
        closest.update(eval(0.75, -0.5));
        closest.update(eval(0.5, 0.5));

        let solution = closest.finish(Status::MaxIters, 2).expect("recorded");

        assert_eq!(solution.x, 0.75);
    }

    #[test]
    fn tolerance_needs_an_evaluation() {
        let mut closest: Closest<(), ()> = Closest::none();
        assert!(!closest.within(1.0));

        closest.update(eval(1.0, 1e-2));
        assert!(!closest.within(1e-3));
        assert!(closest.within(1e-1));
    }

    #[test]
    fn finishing_empty_is_an_error() {
        let closest: Closest<(), ()> = Closest::none();
        assert!(matches!(
            closest.finish(Status::StoppedByObserver, 0),
            Err(Error::NoSuccessfulEvaluation)
        ));
    }
}
