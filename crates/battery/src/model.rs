use cellsim_symbolic::{BaseModel, Event, Expr, Variable};

pub const MODEL_NAME: &str = "Simple ODE battery model";

pub const NEGATIVE_STOICHIOMETRY: &str = "Negative electrode stoichiometry";
pub const POSITIVE_STOICHIOMETRY: &str = "Positive electrode stoichiometry";
pub const VOLTAGE: &str = "Voltage [V]";
pub const CURRENT: &str = "Current [A]";

pub const INITIAL_NEGATIVE_STOICHIOMETRY: &str = "Initial negative electrode stoichiometry";
pub const INITIAL_POSITIVE_STOICHIOMETRY: &str = "Initial positive electrode stoichiometry";
pub const NEGATIVE_CAPACITY: &str = "Negative electrode capacity [A.h]";
pub const POSITIVE_CAPACITY: &str = "Positive electrode capacity [A.h]";
pub const RESISTANCE: &str = "Electrode resistance [Ohm]";
pub const CURRENT_FUNCTION: &str = "Current function [A]";
pub const NEGATIVE_OCV: &str = "Negative electrode OCV";
pub const POSITIVE_OCV: &str = "Positive electrode OCV";

pub const STOP_NEGATIVE_EMPTY: &str = "Stop at x_n = 0";
pub const STOP_NEGATIVE_FULL: &str = "Stop at x_n = 1";
pub const STOP_POSITIVE_EMPTY: &str = "Stop at x_p = 0";
pub const STOP_POSITIVE_FULL: &str = "Stop at x_p = 1";

/// Outputs plotted by default.
pub const DEFAULT_OUTPUTS: [&str; 3] = [VOLTAGE, NEGATIVE_STOICHIOMETRY, POSITIVE_STOICHIOMETRY];

/// Builds the two-state stoichiometry model.
///
/// Each electrode drains at `dx/dt = -I(t) / Q`. The terminal voltage is the
/// difference of the electrode open-circuit voltages less an ohmic drop:
///
/// ```text
/// V = U_p(x_p) - U_n(x_n) - I(t) * R
/// ```
///
/// Integration stops when either stoichiometry reaches 0 or 1.
#[must_use]
pub fn simple_ode_model() -> BaseModel {
    let x_n = Variable::new(NEGATIVE_STOICHIOMETRY);
    let x_p = Variable::new(POSITIVE_STOICHIOMETRY);

    let current = Expr::function_parameter(CURRENT_FUNCTION, "Time", Expr::time());
    let u_n = Expr::function_parameter(NEGATIVE_OCV, NEGATIVE_STOICHIOMETRY, x_n.expr());
    let u_p = Expr::function_parameter(POSITIVE_OCV, POSITIVE_STOICHIOMETRY, x_p.expr());

    BaseModel::new(MODEL_NAME)
        .with_rhs(&x_n, -&current / Expr::parameter(NEGATIVE_CAPACITY))
        .with_rhs(&x_p, -&current / Expr::parameter(POSITIVE_CAPACITY))
        .with_initial_condition(&x_n, Expr::parameter(INITIAL_NEGATIVE_STOICHIOMETRY))
        .with_initial_condition(&x_p, Expr::parameter(INITIAL_POSITIVE_STOICHIOMETRY))
        .with_variable(VOLTAGE, u_p - u_n - &current * Expr::parameter(RESISTANCE))
        .with_variable(NEGATIVE_STOICHIOMETRY, &x_n)
        .with_variable(POSITIVE_STOICHIOMETRY, &x_p)
        .with_variable(CURRENT, current)
        .with_event(Event::termination(STOP_NEGATIVE_EMPTY, &x_n))
        .with_event(Event::termination(STOP_NEGATIVE_FULL, 1.0 - x_n.expr()))
        .with_event(Event::termination(STOP_POSITIVE_EMPTY, &x_p))
        .with_event(Event::termination(STOP_POSITIVE_FULL, 1.0 - x_p.expr()))
}
