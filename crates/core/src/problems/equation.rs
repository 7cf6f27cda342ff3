/// A scalar root-finding problem over a model.
///
/// The solver variable `x` (typically a time within an integration step) is
/// mapped to a model input, and the residual is read back from the model's
/// input and output. Solvers drive the residual toward zero.
pub trait EquationProblem {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Maps the solver variable into a model input.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if no input exists for `x`.
    fn input(&self, x: f64) -> Result<Self::Input, Self::Error>;

    /// Computes the residual from a model input and output.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the residual cannot be computed.
    fn residual(&self, input: &Self::Input, output: &Self::Output) -> Result<f64, Self::Error>;
}
