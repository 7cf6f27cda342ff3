use std::{collections::BTreeMap, fmt, sync::Arc};

use log::debug;

use crate::{BaseModel, DiscretisedModel, Error};

/// A pure function of one variable, shareable across threads.
#[derive(Clone)]
pub struct Function(Arc<dyn Fn(f64) -> f64 + Send + Sync>);

impl Function {
    pub fn new(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn call(&self, x: f64) -> f64 {
        (self.0)(x)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function(..)")
    }
}

/// The value bound to a parameter name.
#[derive(Debug, Clone)]
pub enum Value {
    Scalar(f64),
    Function(Function),
}

impl Value {
    /// Returns the scalar, if this is one.
    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Function(_) => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(value)
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::Function(function)
    }
}

/// A set of named parameter values.
///
/// Scalar parameters (`Expr::parameter`) must be bound to scalars. Function
/// parameters (`Expr::function_parameter`) may be bound to a function or to
/// a scalar, which acts as a constant function.
#[derive(Debug, Clone, Default)]
pub struct ParameterValues {
    values: BTreeMap<String, Value>,
}

impl ParameterValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_scalar(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), Value::Scalar(value));
        self
    }

    #[must_use]
    pub fn with_function(
        mut self,
        name: impl Into<String>,
        f: impl Fn(f64) -> f64 + Send + Sync + 'static,
    ) -> Self {
        self.values
            .insert(name.into(), Value::Function(Function::new(f)));
        self
    }

    /// Binds a value, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Replaces existing values with scalars.
    ///
    /// Either every update is applied or none is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParameter`] for a name that is not already bound.
    pub fn update<'a>(
        &mut self,
        updates: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<(), Error> {
        let updates: Vec<_> = updates.into_iter().collect();
        if let Some((name, _)) = updates.iter().find(|(name, _)| !self.contains(name)) {
            return Err(Error::UnknownParameter((*name).to_owned()));
        }
        for (name, value) in updates {
            debug!("parameter `{name}` set to {value}");
            self.values.insert(name.to_owned(), Value::Scalar(value));
        }
        Ok(())
    }

    /// Binds a model's parameters and compiles it against its state vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not well posed or any referenced
    /// parameter is missing or bound to the wrong kind of value.
    pub fn process_model(&self, model: &BaseModel) -> Result<DiscretisedModel, Error> {
        DiscretisedModel::new(model, self)
    }
}
