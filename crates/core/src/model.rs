/// A callable model that maps an input to an output.
///
/// Solvers never look inside a model. They build inputs, call the model, and
/// hand the resulting [`Snapshot`] to a problem that knows how to interpret it.
pub trait Model {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Calls the model with the given input.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// A captured input/output pair from a model call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<I, O> {
    pub input: I,
    pub output: O,
}

impl<I, O> Snapshot<I, O> {
    /// Creates a new snapshot from input and output values.
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }
}

/// Models behind a reference are models too.
impl<M: Model + ?Sized> Model for &M {
    type Input = M::Input;
    type Output = M::Output;
    type Error = M::Error;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        (**self).call(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    struct Doubler;

    impl Model for Doubler {
        type Input = f64;
        type Output = f64;
        type Error = Infallible;

        fn call(&self, input: &f64) -> Result<f64, Infallible> {
            Ok(2.0 * input)
        }
    }

    fn call_twice<M: Model<Input = f64, Output = f64>>(model: M, x: f64) -> f64 {
        let once = model.call(&x).ok().unwrap_or(f64::NAN);
        model.call(&once).ok().unwrap_or(f64::NAN)
    }

    #[test]
    fn reference_forwards_to_model() {
        let model = Doubler;
        assert_eq!(call_twice(&model, 1.5), 6.0);
    }

    #[test]
    fn snapshot_keeps_input_and_output() {
        let snapshot = Snapshot::new(1.0, 2.0);
        assert_eq!(snapshot.input, 1.0);
        assert_eq!(snapshot.output, 2.0);
    }
}
