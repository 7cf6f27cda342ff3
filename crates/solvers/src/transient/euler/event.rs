use cellsim_core::Snapshot;

/// Event emitted by the Euler solver for each snapshot.
///
/// Step 0 is the initial state. When a terminal event fires, the final
/// event carries the snapshot at the crossing rather than a full step.
#[derive(Debug, Clone)]
pub struct Event<I, O> {
    pub step: usize,

    /// Time of the snapshot.
    pub time: f64,

    pub snapshot: Snapshot<I, O>,
}
