use cellsim_core::Snapshot;

use crate::transient::Crossing;

/// Indicates how the solver terminated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    /// Completed all requested steps.
    Complete,

    /// Stopped at the crossing of a terminal event.
    EventTriggered(Crossing),

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The result of an Euler integration.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    /// How the solver terminated.
    pub status: Status,

    /// History of snapshots from each step (including initial state).
    ///
    /// When a terminal event fires, the last snapshot is taken at the
    /// located crossing time.
    pub history: Vec<Snapshot<I, O>>,

    /// Non-terminal event crossings, in time order.
    pub crossings: Vec<Crossing>,

    /// Number of integration steps completed.
    pub steps: usize,
}
