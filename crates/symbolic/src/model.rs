use std::collections::BTreeSet;

use thiserror::Error;

use crate::{Event, Expr, Variable};

/// Reasons a model definition cannot be solved.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("model has no state variables")]
    NoStates,

    #[error("state variable `{0}` has more than one right-hand side")]
    DuplicateState(String),

    #[error("state variable `{0}` has no initial condition")]
    MissingInitialCondition(String),

    #[error("initial condition given for `{0}`, which has no right-hand side")]
    OrphanInitialCondition(String),

    #[error("initial condition of `{0}` refers to a state variable")]
    StateInInitialCondition(String),

    #[error("{context} refers to `{variable}`, which is not a state variable")]
    UnknownVariable { variable: String, context: String },

    #[error("output variable `{0}` is defined more than once")]
    DuplicateOutput(String),

    #[error("event `{0}` is defined more than once")]
    DuplicateEvent(String),
}

/// A lumped ODE model: state equations, initial conditions, outputs, events.
///
/// Entries keep their insertion order, which fixes the layout of the state
/// vector and the order of outputs and events in a solution.
///
/// ```
/// use cellsim_symbolic::{BaseModel, Event, Expr, Variable};
///
/// let x = Variable::new("x");
/// let model = BaseModel::new("decay")
///     .with_rhs(&x, -Expr::parameter("k") * x.expr())
///     .with_initial_condition(&x, 1.0)
///     .with_variable("x", x.expr())
///     .with_event(Event::termination("x small", x.expr() - 0.1));
///
/// assert!(model.check_well_posedness().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BaseModel {
    name: String,
    rhs: Vec<(Variable, Expr)>,
    initial_conditions: Vec<(Variable, Expr)>,
    variables: Vec<(String, Expr)>,
    events: Vec<Event>,
}

impl BaseModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets `d(variable)/dt = rhs`.
    #[must_use]
    pub fn with_rhs(mut self, variable: &Variable, rhs: impl Into<Expr>) -> Self {
        self.rhs.push((variable.clone(), rhs.into()));
        self
    }

    #[must_use]
    pub fn with_initial_condition(mut self, variable: &Variable, value: impl Into<Expr>) -> Self {
        self.initial_conditions
            .push((variable.clone(), value.into()));
        self
    }

    /// Adds a named output expression.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, expr: impl Into<Expr>) -> Self {
        self.variables.push((name.into(), expr.into()));
        self
    }

    #[must_use]
    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn rhs(&self) -> &[(Variable, Expr)] {
        &self.rhs
    }

    #[must_use]
    pub fn initial_conditions(&self) -> &[(Variable, Expr)] {
        &self.initial_conditions
    }

    #[must_use]
    pub fn variables(&self) -> &[(String, Expr)] {
        &self.variables
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Returns the initial condition of a state variable.
    #[must_use]
    pub fn initial_condition(&self, variable: &Variable) -> Option<&Expr> {
        self.initial_conditions
            .iter()
            .find(|(v, _)| v == variable)
            .map(|(_, expr)| expr)
    }

    /// Every expression in the model, labelled for error messages.
    pub(crate) fn labelled_expressions(&self) -> impl Iterator<Item = (String, &Expr)> {
        let rhs = self
            .rhs
            .iter()
            .map(|(v, e)| (format!("right-hand side of `{}`", v.name()), e));
        let outputs = self
            .variables
            .iter()
            .map(|(name, e)| (format!("output `{name}`"), e));
        let events = self
            .events
            .iter()
            .map(|event| (format!("event `{}`", event.name()), event.expression()));
        rhs.chain(outputs).chain(events)
    }

    /// Checks that the model can be discretised.
    ///
    /// A model is well posed when it has at least one state, every state has
    /// exactly one right-hand side and one initial condition, initial
    /// conditions do not depend on states, every referenced variable is a
    /// state, and output and event names are unique.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn check_well_posedness(&self) -> Result<(), ModelError> {
        if self.rhs.is_empty() {
            return Err(ModelError::NoStates);
        }

        let mut states = BTreeSet::new();
        for (variable, _) in &self.rhs {
            if !states.insert(variable.name()) {
                return Err(ModelError::DuplicateState(variable.name().to_owned()));
            }
        }

        let mut initialised = BTreeSet::new();
        for (variable, expr) in &self.initial_conditions {
            if !states.contains(variable.name()) || !initialised.insert(variable.name()) {
                return Err(ModelError::OrphanInitialCondition(
                    variable.name().to_owned(),
                ));
            }
            if !expr.variables().is_empty() {
                return Err(ModelError::StateInInitialCondition(
                    variable.name().to_owned(),
                ));
            }
        }
        if let Some(missing) = states.difference(&initialised).next() {
            return Err(ModelError::MissingInitialCondition((*missing).to_owned()));
        }

        for (context, expr) in self.labelled_expressions() {
            if let Some(unknown) = expr.variables().into_iter().find(|v| !states.contains(v)) {
                return Err(ModelError::UnknownVariable {
                    variable: unknown.to_owned(),
                    context,
                });
            }
        }

        let mut outputs = BTreeSet::new();
        for (name, _) in &self.variables {
            if !outputs.insert(name.as_str()) {
                return Err(ModelError::DuplicateOutput(name.clone()));
            }
        }

        let mut events = BTreeSet::new();
        for event in &self.events {
            if !events.insert(event.name()) {
                return Err(ModelError::DuplicateEvent(event.name().to_owned()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decay() -> (Variable, BaseModel) {
        let x = Variable::new("x");
        let model = BaseModel::new("decay")
            .with_rhs(&x, -x.expr())
            .with_initial_condition(&x, Expr::parameter("x0"))
            .with_variable("x", x.expr());
        (x, model)
    }

    #[test]
    fn decay_is_well_posed() {
        let (_, model) = decay();
        assert_eq!(model.check_well_posedness(), Ok(()));
    }

    #[test]
    fn empty_model_has_no_states() {
        assert_eq!(
            BaseModel::new("empty").check_well_posedness(),
            Err(ModelError::NoStates)
        );
    }

    #[test]
    fn missing_initial_condition() {
        let y = Variable::new("y");
        let (_, model) = decay();
        let model = model.with_rhs(&y, 1.0);
        assert_eq!(
            model.check_well_posedness(),
            Err(ModelError::MissingInitialCondition("y".into()))
        );
    }

    #[test]
    fn initial_condition_without_rhs() {
        let (_, model) = decay();
        let model = model.with_initial_condition(&Variable::new("z"), 0.0);
        assert_eq!(
            model.check_well_posedness(),
            Err(ModelError::OrphanInitialCondition("z".into()))
        );
    }

    #[test]
    fn initial_condition_cannot_use_states() {
        let x = Variable::new("x");
        let model = BaseModel::new("bad")
            .with_rhs(&x, 1.0)
            .with_initial_condition(&x, x.expr());
        assert_eq!(
            model.check_well_posedness(),
            Err(ModelError::StateInInitialCondition("x".into()))
        );
    }

    #[test]
    fn outputs_must_refer_to_states() {
        let (_, model) = decay();
        let model = model.with_variable("w", Variable::new("w").expr());
        assert_eq!(
            model.check_well_posedness(),
            Err(ModelError::UnknownVariable {
                variable: "w".into(),
                context: "output `w`".into(),
            })
        );
    }

    #[test]
    fn duplicate_event_names_are_rejected() {
        let (x, model) = decay();
        let model = model
            .with_event(Event::termination("Stop at x = 0", x.expr()))
            .with_event(Event::termination("Stop at x = 0", 1.0 - x.expr()));
        assert_eq!(
            model.check_well_posedness(),
            Err(ModelError::DuplicateEvent("Stop at x = 0".into()))
        );
    }

    #[test]
    fn duplicate_outputs_are_rejected() {
        let (x, model) = decay();
        let model = model.with_variable("x", 2.0 * x.expr());
        assert_eq!(
            model.check_well_posedness(),
            Err(ModelError::DuplicateOutput("x".into()))
        );
    }
}
