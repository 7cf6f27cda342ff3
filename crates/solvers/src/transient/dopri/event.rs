use cellsim_core::Snapshot;

/// Event emitted by the Dormand–Prince solver for each accepted step.
///
/// Step 0 is the initial state and has a step size of zero.
#[derive(Debug, Clone)]
pub struct Event<I, O> {
    /// The accepted step number (0 for the initial state).
    pub step: usize,

    /// Time at the end of the step.
    pub time: f64,

    /// Size of the step that produced this snapshot.
    pub step_size: f64,

    /// Snapshot of the model input and output at the end of the step.
    pub snapshot: Snapshot<I, O>,
}
