use crate::Expr;

/// What happens when an event expression reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventKind {
    /// Stop the solve at the crossing.
    #[default]
    Termination,
    /// Record the crossing and keep integrating.
    Flag,
}

/// A named threshold on a scalar expression.
///
/// The expression is positive while the model is in its admissible region.
/// The event fires when it reaches or crosses zero from above.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    name: String,
    expression: Expr,
    kind: EventKind,
}

impl Event {
    pub fn new(name: impl Into<String>, expression: impl Into<Expr>, kind: EventKind) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            kind,
        }
    }

    /// Creates an event that stops the solve.
    pub fn termination(name: impl Into<String>, expression: impl Into<Expr>) -> Self {
        Self::new(name, expression, EventKind::Termination)
    }

    /// Creates an event that is only recorded.
    pub fn flag(name: impl Into<String>, expression: impl Into<Expr>) -> Self {
        Self::new(name, expression, EventKind::Flag)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}
