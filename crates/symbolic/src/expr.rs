use std::{
    collections::BTreeSet,
    fmt,
    ops::{Add, Div, Mul, Neg, Sub},
};

/// A named state variable of a model.
///
/// Variables are referenced by name. Use [`Variable::expr`] (or `Expr::from`)
/// to build expressions from them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    name: String,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns an expression referring to this variable.
    #[must_use]
    pub fn expr(&self) -> Expr {
        Expr::Variable(self.name.clone())
    }
}

impl From<Variable> for Expr {
    fn from(variable: Variable) -> Self {
        Expr::Variable(variable.name)
    }
}

impl From<&Variable> for Expr {
    fn from(variable: &Variable) -> Self {
        variable.expr()
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Scalar(value)
    }
}

/// Elementary functions of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Sin,
    Cos,
    Exp,
    Ln,
    Tanh,
}

impl UnaryOp {
    /// Applies the function to a value.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Neg => -x,
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Exp => x.exp(),
            Self::Ln => x.ln(),
            Self::Tanh => x.tanh(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Exp => "exp",
            Self::Ln => "ln",
            Self::Tanh => "tanh",
        }
    }
}

/// Arithmetic operators of two arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    /// Applies the operator to two values.
    #[must_use]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
            Self::Pow => a.powf(b),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "**",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
            Self::Pow => 3,
        }
    }
}

/// A scalar expression in time, state variables, and parameters.
///
/// Expressions are composed with the arithmetic operators, between
/// expressions and with `f64` on either side, and with the elementary
/// function methods:
///
/// ```
/// use cellsim_symbolic::{Expr, Variable};
///
/// let x = Variable::new("x");
/// let rate = -Expr::parameter("k") * &x.expr() + Expr::time().sin();
/// assert_eq!(rate.to_string(), "-k * x + sin(t)");
/// ```
///
/// Names stay unresolved until the expression is bound to parameter values
/// and compiled against a state vector.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Scalar(f64),
    /// The independent variable.
    Time,
    Variable(String),
    /// A parameter that must be bound to a scalar.
    Parameter(String),
    /// A parameter bound to a function of one argument, or to a scalar.
    ///
    /// `input` names the argument for display and documentation.
    FunctionParameter {
        name: String,
        input: String,
        argument: Box<Expr>,
    },
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    #[must_use]
    pub fn scalar(value: f64) -> Self {
        Self::Scalar(value)
    }

    #[must_use]
    pub fn time() -> Self {
        Self::Time
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Self::Parameter(name.into())
    }

    pub fn function_parameter(
        name: impl Into<String>,
        input: impl Into<String>,
        argument: impl Into<Expr>,
    ) -> Self {
        Self::FunctionParameter {
            name: name.into(),
            input: input.into(),
            argument: Box::new(argument.into()),
        }
    }

    fn unary(self, op: UnaryOp) -> Self {
        Self::Unary(op, Box::new(self))
    }

    #[must_use]
    pub fn sin(self) -> Self {
        self.unary(UnaryOp::Sin)
    }

    #[must_use]
    pub fn cos(self) -> Self {
        self.unary(UnaryOp::Cos)
    }

    #[must_use]
    pub fn exp(self) -> Self {
        self.unary(UnaryOp::Exp)
    }

    #[must_use]
    pub fn ln(self) -> Self {
        self.unary(UnaryOp::Ln)
    }

    #[must_use]
    pub fn tanh(self) -> Self {
        self.unary(UnaryOp::Tanh)
    }

    #[must_use]
    pub fn pow(self, exponent: impl Into<Expr>) -> Self {
        Self::Binary(BinaryOp::Pow, Box::new(self), Box::new(exponent.into()))
    }

    /// Names of the state variables this expression refers to.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.walk(&mut |expr| {
            if let Expr::Variable(name) = expr {
                names.insert(name.as_str());
            }
        });
        names
    }

    /// Names of the scalar and function parameters this expression refers to.
    #[must_use]
    pub fn parameters(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.walk(&mut |expr| match expr {
            Expr::Parameter(name) | Expr::FunctionParameter { name, .. } => {
                names.insert(name.as_str());
            }
            _ => {}
        });
        names
    }

    /// Visits every node, parents before children.
    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match self {
            Expr::Scalar(_) | Expr::Time | Expr::Variable(_) | Expr::Parameter(_) => {}
            Expr::FunctionParameter { argument, .. } | Expr::Unary(_, argument) => {
                argument.walk(visit);
            }
            Expr::Binary(_, lhs, rhs) => {
                lhs.walk(visit);
                rhs.walk(visit);
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(op, ..) => op.precedence(),
            Expr::Unary(UnaryOp::Neg, _) => 2,
            Expr::Scalar(v) if *v < 0.0 => 2,
            _ => 4,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Scalar(v) => write!(f, "{v}"),
            Expr::Time => write!(f, "t"),
            Expr::Variable(name) | Expr::Parameter(name) => write!(f, "{name}"),
            Expr::FunctionParameter { name, argument, .. } => write!(f, "{name}({argument})"),
            Expr::Unary(UnaryOp::Neg, arg) => {
                write!(f, "-")?;
                arg.fmt_operand(f, 3)
            }
            Expr::Unary(op, arg) => write!(f, "{}({arg})", op.name()),
            Expr::Binary(op, lhs, rhs) => {
                let p = op.precedence();
                // Left-associative, except for powers.
                let (left_min, right_min) = match op {
                    BinaryOp::Add | BinaryOp::Mul => (p, p),
                    BinaryOp::Sub | BinaryOp::Div => (p, p + 1),
                    BinaryOp::Pow => (p + 1, p),
                };
                lhs.fmt_operand(f, left_min)?;
                write!(f, " {} ", op.symbol())?;
                rhs.fmt_operand(f, right_min)
            }
        }
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.unary(UnaryOp::Neg)
    }
}

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.clone().unary(UnaryOp::Neg)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::Binary($op, Box::new(self), Box::new(rhs))
            }
        }

        impl $trait<&Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                Expr::Binary($op, Box::new(self.clone()), Box::new(rhs.clone()))
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                Expr::Binary($op, Box::new(self), Box::new(rhs.clone()))
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::Binary($op, Box::new(self.clone()), Box::new(rhs))
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;

            fn $method(self, rhs: f64) -> Expr {
                Expr::Binary($op, Box::new(self), Box::new(Expr::Scalar(rhs)))
            }
        }

        impl $trait<f64> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: f64) -> Expr {
                Expr::Binary($op, Box::new(self.clone()), Box::new(Expr::Scalar(rhs)))
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::Binary($op, Box::new(Expr::Scalar(self)), Box::new(rhs))
            }
        }

        impl $trait<&Expr> for f64 {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                Expr::Binary($op, Box::new(Expr::Scalar(self)), Box::new(rhs.clone()))
            }
        }
    };
}

impl_binary_op!(Add, add, BinaryOp::Add);
impl_binary_op!(Sub, sub, BinaryOp::Sub);
impl_binary_op!(Mul, mul, BinaryOp::Mul);
impl_binary_op!(Div, div, BinaryOp::Div);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_respects_precedence() {
        let a = Expr::parameter("a");
        let b = Expr::parameter("b");
        let c = Expr::parameter("c");

        assert_eq!((&a + &b * &c).to_string(), "a + b * c");
        assert_eq!(((&a + &b) * &c).to_string(), "(a + b) * c");
        assert_eq!((&a - (&b - &c)).to_string(), "a - (b - c)");
        assert_eq!((&a / (&b * &c)).to_string(), "a / (b * c)");
        assert_eq!((-(&a + &b)).to_string(), "-(a + b)");
        assert_eq!(a.pow(2.0).to_string(), "a ** 2");
    }

    #[test]
    fn display_function_parameters() {
        let x = Variable::new("x");
        let u = Expr::function_parameter("U", "Stoichiometry", x.expr());
        assert_eq!((1.0 - u).to_string(), "1 - U(x)");
    }

    #[test]
    fn collects_names() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let expr = Expr::function_parameter("I", "Time", Expr::time()) / Expr::parameter("Q")
            + x.expr() * y.expr().exp()
            - Expr::parameter("Q");

        assert_eq!(expr.variables().into_iter().collect::<Vec<_>>(), ["x", "y"]);
        assert_eq!(expr.parameters().into_iter().collect::<Vec<_>>(), ["I", "Q"]);
    }

    #[test]
    fn scalars_mix_on_both_sides() {
        let x = Variable::new("x").expr();
        let expr = 2.0 * &x + 1.0;
        assert_eq!(
            expr,
            Expr::Binary(
                BinaryOp::Add,
                Box::new(Expr::Binary(
                    BinaryOp::Mul,
                    Box::new(Expr::Scalar(2.0)),
                    Box::new(x),
                )),
                Box::new(Expr::Scalar(1.0)),
            )
        );
    }
}
