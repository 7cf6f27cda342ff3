/// Defines an ODE (ordinary differential equation) problem to be solved.
///
/// An ODE problem reads the time and a flat state vector from model input,
/// computes the state derivative and event values from model input and
/// output, and rebuilds model input from a new time and state. This lets
/// generic integrators advance any model whose state can be written as a
/// vector of `f64`.
///
/// # Events
///
/// Event values are scalars that stay positive while integration may proceed.
/// Integrators watch for a value reaching or crossing zero between two accepted
/// steps, locate the crossing, and either stop there (terminal events) or
/// record it and continue.
pub trait OdeProblem {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the independent variable (time) of a model input.
    fn time(&self, input: &Self::Input) -> f64;

    /// Extracts the state vector from model input.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the state cannot be extracted from the input.
    fn state(&self, input: &Self::Input) -> Result<Vec<f64>, Self::Error>;

    /// Computes the derivative of the state from model input and output.
    ///
    /// The returned vector has the same length as [`OdeProblem::state`].
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the derivative cannot be computed.
    fn derivative(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<Vec<f64>, Self::Error>;

    /// Builds model input from a time and state.
    ///
    /// `base` is the most recent accepted input, for problems that carry data
    /// alongside the state.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the input cannot be constructed.
    fn build_input(
        &self,
        base: &Self::Input,
        time: f64,
        state: &[f64],
    ) -> Result<Self::Input, Self::Error>;

    /// Computes event values from model input and output.
    ///
    /// The default implementation has no events.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if an event value cannot be computed.
    fn events(
        &self,
        _input: &Self::Input,
        _output: &Self::Output,
    ) -> Result<Vec<f64>, Self::Error> {
        Ok(Vec::new())
    }

    /// Returns whether crossing event `index` stops integration.
    ///
    /// The default treats every event as terminal.
    fn is_terminal(&self, _index: usize) -> bool {
        true
    }
}
