use std::{collections::HashMap, convert::Infallible};

use log::debug;

use cellsim_core::{Model, OdeProblem};

use crate::{
    BaseModel, Error, EventKind, Expr, ModelError, ParameterValues,
    expr::{BinaryOp, UnaryOp},
    parameters::{Function, Value},
};

/// An expression with parameters bound and variables resolved to indices.
#[derive(Debug, Clone)]
enum Node {
    Scalar(f64),
    Time,
    State(usize),
    Call(Function, Box<Node>),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
}

impl Node {
    fn eval(&self, t: f64, y: &[f64]) -> f64 {
        match self {
            Node::Scalar(v) => *v,
            Node::Time => t,
            Node::State(i) => y.get(*i).copied().unwrap_or(f64::NAN),
            Node::Call(f, arg) => f.call(arg.eval(t, y)),
            Node::Unary(op, arg) => op.apply(arg.eval(t, y)),
            Node::Binary(op, lhs, rhs) => op.apply(lhs.eval(t, y), rhs.eval(t, y)),
        }
    }
}

/// Resolves names in expressions against bound values and a state layout.
struct Compiler<'a> {
    values: &'a ParameterValues,
    states: HashMap<&'a str, usize>,
}

impl Compiler<'_> {
    fn compile(&self, expr: &Expr, context: &str) -> Result<Node, Error> {
        let node = match expr {
            Expr::Scalar(v) => Node::Scalar(*v),
            Expr::Time => Node::Time,
            Expr::Variable(name) => match self.states.get(name.as_str()) {
                Some(&index) => Node::State(index),
                None => {
                    return Err(ModelError::UnknownVariable {
                        variable: name.clone(),
                        context: context.to_owned(),
                    }
                    .into());
                }
            },
            Expr::Parameter(name) => match self.values.get(name) {
                Some(Value::Scalar(v)) => Node::Scalar(*v),
                Some(Value::Function(_)) => {
                    return Err(Error::ParameterKind {
                        name: name.clone(),
                        expected: "scalar",
                    });
                }
                None => return Err(Error::UndefinedParameter(name.clone())),
            },
            Expr::FunctionParameter { name, argument, .. } => {
                let argument = self.compile(argument, context)?;
                match self.values.get(name) {
                    Some(Value::Function(f)) => Node::Call(f.clone(), Box::new(argument)),
                    Some(Value::Scalar(v)) => Node::Scalar(*v),
                    None => return Err(Error::UndefinedParameter(name.clone())),
                }
            }
            Expr::Unary(op, arg) => match self.compile(arg, context)? {
                Node::Scalar(v) => Node::Scalar(op.apply(v)),
                arg => Node::Unary(*op, Box::new(arg)),
            },
            Expr::Binary(op, lhs, rhs) => {
                match (self.compile(lhs, context)?, self.compile(rhs, context)?) {
                    (Node::Scalar(a), Node::Scalar(b)) => Node::Scalar(op.apply(a, b)),
                    (lhs, rhs) => Node::Binary(*op, Box::new(lhs), Box::new(rhs)),
                }
            }
        };
        Ok(node)
    }
}

/// Model input: a time and a state vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub time: f64,
    pub state: Vec<f64>,
}

/// Everything a discretised model computes at a [`Point`].
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Time derivative of each state.
    pub rates: Vec<f64>,
    /// Output variables, in model order.
    pub variables: Vec<f64>,
    /// Event values, in model order.
    pub events: Vec<f64>,
}

#[derive(Debug, Clone)]
struct CompiledEvent {
    name: String,
    kind: EventKind,
    node: Node,
}

/// A model with every parameter bound and every variable mapped to a slot
/// in a flat state vector.
///
/// It is both the [`Model`] evaluated by the solvers and the [`OdeProblem`]
/// that tells them how to read and rebuild its input.
#[derive(Debug, Clone)]
pub struct DiscretisedModel {
    name: String,
    states: Vec<String>,
    rhs: Vec<Node>,
    initial: Vec<Node>,
    outputs: Vec<(String, Node)>,
    events: Vec<CompiledEvent>,
}

impl DiscretisedModel {
    pub(crate) fn new(model: &BaseModel, values: &ParameterValues) -> Result<Self, Error> {
        model.check_well_posedness()?;

        let states: Vec<String> = model
            .rhs()
            .iter()
            .map(|(v, _)| v.name().to_owned())
            .collect();
        let compiler = Compiler {
            values,
            states: states
                .iter()
                .enumerate()
                .map(|(i, name)| (name.as_str(), i))
                .collect(),
        };

        let mut rhs = Vec::with_capacity(states.len());
        let mut initial = Vec::with_capacity(states.len());
        for (variable, expr) in model.rhs() {
            let context = format!("right-hand side of `{}`", variable.name());
            rhs.push(compiler.compile(expr, &context)?);

            let context = format!("initial condition of `{}`", variable.name());
            let ic = model
                .initial_condition(variable)
                .ok_or_else(|| ModelError::MissingInitialCondition(variable.name().to_owned()))?;
            initial.push(compiler.compile(ic, &context)?);
        }

        let outputs = model
            .variables()
            .iter()
            .map(|(name, expr)| {
                let node = compiler.compile(expr, &format!("output `{name}`"))?;
                Ok((name.clone(), node))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let events = model
            .events()
            .iter()
            .map(|event| {
                let context = format!("event `{}`", event.name());
                Ok(CompiledEvent {
                    name: event.name().to_owned(),
                    kind: event.kind(),
                    node: compiler.compile(event.expression(), &context)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        debug!(
            "discretised `{}`: {} states, {} outputs, {} events",
            model.name(),
            states.len(),
            outputs.len(),
            events.len()
        );

        Ok(Self {
            name: model.name().to_owned(),
            states,
            rhs,
            initial,
            outputs,
            events,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// State variable names, in state vector order.
    #[must_use]
    pub fn state_names(&self) -> &[String] {
        &self.states
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|(name, _)| name.as_str())
    }

    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|event| event.name.as_str())
    }

    /// Returns the name and kind of event `index`.
    #[must_use]
    pub fn event(&self, index: usize) -> Option<(&str, EventKind)> {
        self.events
            .get(index)
            .map(|event| (event.name.as_str(), event.kind))
    }

    /// Evaluates the initial conditions at time `t0`.
    #[must_use]
    pub fn initial_state(&self, t0: f64) -> Vec<f64> {
        self.initial.iter().map(|node| node.eval(t0, &[])).collect()
    }

    #[must_use]
    pub fn initial_point(&self, t0: f64) -> Point {
        Point {
            time: t0,
            state: self.initial_state(t0),
        }
    }

    /// Evaluates rates, outputs, and events at a point.
    #[must_use]
    pub fn evaluate(&self, point: &Point) -> Evaluation {
        let (t, y) = (point.time, point.state.as_slice());
        Evaluation {
            rates: self.rhs.iter().map(|node| node.eval(t, y)).collect(),
            variables: self.outputs.iter().map(|(_, node)| node.eval(t, y)).collect(),
            events: self.events.iter().map(|event| event.node.eval(t, y)).collect(),
        }
    }
}

impl Model for DiscretisedModel {
    type Input = Point;
    type Output = Evaluation;
    type Error = Infallible;

    fn call(&self, input: &Point) -> Result<Evaluation, Infallible> {
        Ok(self.evaluate(input))
    }
}

impl OdeProblem for DiscretisedModel {
    type Input = Point;
    type Output = Evaluation;
    type Error = Infallible;

    fn time(&self, input: &Point) -> f64 {
        input.time
    }

    fn state(&self, input: &Point) -> Result<Vec<f64>, Infallible> {
        Ok(input.state.clone())
    }

    fn derivative(&self, _input: &Point, output: &Evaluation) -> Result<Vec<f64>, Infallible> {
        Ok(output.rates.clone())
    }

    fn build_input(&self, _base: &Point, time: f64, state: &[f64]) -> Result<Point, Infallible> {
        Ok(Point {
            time,
            state: state.to_vec(),
        })
    }

    fn events(&self, _input: &Point, output: &Evaluation) -> Result<Vec<f64>, Infallible> {
        Ok(output.events.clone())
    }

    fn is_terminal(&self, index: usize) -> bool {
        self.events
            .get(index)
            .is_some_and(|event| event.kind == EventKind::Termination)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{Event, Variable};

    fn oscillator() -> BaseModel {
        let x = Variable::new("x");
        let v = Variable::new("v");
        BaseModel::new("oscillator")
            .with_rhs(&x, v.expr())
            .with_rhs(&v, -Expr::parameter("k") * x.expr())
            .with_initial_condition(&x, Expr::parameter("x0"))
            .with_initial_condition(&v, 0.0)
            .with_variable(
                "Energy",
                0.5 * v.expr().pow(2.0) + 0.5 * Expr::parameter("k") * x.expr().pow(2.0),
            )
            .with_variable(
                "Forcing",
                Expr::function_parameter("F", "Time", Expr::time()),
            )
            .with_event(Event::flag("x crosses zero", x.expr()))
    }

    fn values() -> ParameterValues {
        ParameterValues::new()
            .with_scalar("k", 4.0)
            .with_scalar("x0", 1.0)
            .with_function("F", |t| 10.0 * t)
    }

    #[test]
    fn evaluates_rates_outputs_and_events() {
        let model = values().process_model(&oscillator()).expect("binds");
        let point = Point {
            time: 0.5,
            state: vec![2.0, 3.0],
        };

        let eval = model.evaluate(&point);
        assert_eq!(eval.rates, vec![3.0, -8.0]);
        assert_relative_eq!(eval.variables[0], 0.5 * 9.0 + 0.5 * 4.0 * 4.0);
        assert_relative_eq!(eval.variables[1], 5.0);
        assert_eq!(eval.events, vec![2.0]);
        assert!(!model.is_terminal(0));
    }

    #[test]
    fn initial_state_uses_bound_parameters() {
        let model = values().process_model(&oscillator()).expect("binds");
        assert_eq!(model.initial_state(0.0), vec![1.0, 0.0]);
        assert_eq!(model.state_names(), ["x", "v"]);
    }

    #[test]
    fn function_parameter_accepts_a_scalar() {
        let values = values().with_scalar("F", 7.0);
        let model = values.process_model(&oscillator()).expect("binds");
        let eval = model.evaluate(&model.initial_point(3.0));
        assert_eq!(eval.variables[1], 7.0);
    }

    #[test]
    fn missing_parameter_fails_fast() {
        let values = ParameterValues::new().with_scalar("k", 4.0);
        let err = values.process_model(&oscillator()).unwrap_err();
        assert!(matches!(err, Error::UndefinedParameter(name) if name == "x0"));
    }

    #[test]
    fn scalar_parameter_rejects_a_function() {
        let values = values().with_function("k", |x| x);
        let err = values.process_model(&oscillator()).unwrap_err();
        assert!(matches!(
            err,
            Error::ParameterKind { name, expected: "scalar" } if name == "k"
        ));
    }

    #[test]
    fn constants_are_folded() {
        let compiler = Compiler {
            values: &values(),
            states: HashMap::new(),
        };
        let node = compiler
            .compile(&(Expr::parameter("k") * 2.0 + 1.0).exp(), "test")
            .expect("compiles");
        assert!(matches!(node, Node::Scalar(v) if v == 9.0_f64.exp()));
    }
}
