use cellsim_core::Observer;

use crate::traits::{CanStopEarly, HasTime};

/// Stops integration once a step count or a time is reached.
///
/// The event that reaches the limit is kept; the solver stops after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limit {
    max_steps: Option<usize>,
    max_time: Option<f64>,
}

impl Limit {
    #[must_use]
    pub fn steps(max_steps: usize) -> Self {
        Self {
            max_steps: Some(max_steps),
            max_time: None,
        }
    }

    #[must_use]
    pub fn time(max_time: f64) -> Self {
        Self {
            max_steps: None,
            max_time: Some(max_time),
        }
    }

    fn reached(&self, step: usize, time: f64) -> bool {
        self.max_steps.is_some_and(|max| step >= max)
            || self.max_time.is_some_and(|max| time >= max)
    }
}

impl<E: HasTime, A: CanStopEarly> Observer<E, A> for Limit {
    fn observe(&mut self, event: &E) -> Option<A> {
        self.reached(event.step(), event.time()).then(A::stop_early)
    }
}
