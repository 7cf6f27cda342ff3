use log::{Level, log};

use cellsim_core::Observer;

use crate::traits::HasTime;

/// Logs integration progress through the `log` facade.
///
/// Every `every`-th step is logged at the configured level, starting with
/// the initial state. Never stops the solver.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    label: String,
    every: usize,
    level: Level,
}

impl ProgressLog {
    /// Logs every step at debug level.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            every: 1,
            level: Level::Debug,
        }
    }

    /// Logs only every `every`-th step. Zero is treated as one.
    #[must_use]
    pub fn every(self, every: usize) -> Self {
        Self {
            every: every.max(1),
            ..self
        }
    }

    #[must_use]
    pub fn level(self, level: Level) -> Self {
        Self { level, ..self }
    }

    fn should_log(&self, step: usize) -> bool {
        step % self.every == 0
    }
}

impl<E: HasTime, A> Observer<E, A> for ProgressLog {
    fn observe(&mut self, event: &E) -> Option<A> {
        if self.should_log(event.step()) {
            log!(
                self.level,
                "{}: step {} at t = {}",
                self.label,
                event.step(),
                event.time()
            );
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_on_multiples_of_every() {
        let log = ProgressLog::new("test").every(5);
        assert!(log.should_log(0));
        assert!(!log.should_log(4));
        assert!(log.should_log(10));
    }

    #[test]
    fn zero_interval_logs_every_step() {
        let log = ProgressLog::new("test").every(0);
        assert!(log.should_log(1));
    }
}
