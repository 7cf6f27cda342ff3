use cellsim_core::Snapshot;

use crate::transient::Crossing;

/// Indicates how the solver terminated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    /// Reached the end of the requested time span.
    Complete,

    /// Stopped at the crossing of a terminal event.
    EventTriggered(Crossing),

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// Work counters for a solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Accepted steps.
    pub accepted: usize,
    /// Steps rejected by error control.
    pub rejected: usize,
    /// Model calls made by the integrator, excluding event location.
    pub evaluations: usize,
}

/// The result of a Dormand–Prince integration.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    /// How the solver terminated.
    pub status: Status,

    /// Snapshots at the initial state and every accepted step.
    ///
    /// When a terminal event fires, the last snapshot is taken at the
    /// located crossing time.
    pub history: Vec<Snapshot<I, O>>,

    /// Non-terminal event crossings, in time order.
    pub crossings: Vec<Crossing>,

    /// Work counters.
    pub stats: Stats,
}
