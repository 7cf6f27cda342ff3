use cellsim_symbolic::ParameterValues;

use crate::{
    model::{
        CURRENT_FUNCTION, INITIAL_NEGATIVE_STOICHIOMETRY, INITIAL_POSITIVE_STOICHIOMETRY,
        NEGATIVE_CAPACITY, NEGATIVE_OCV, POSITIVE_CAPACITY, POSITIVE_OCV, RESISTANCE,
    },
    ocv::{graphite_lgm50_ocp_chen2020, nmc_lgm50_ocp_chen2020},
};

/// Sinusoidal discharge current [A]: `1 + 0.5 sin(100 t)`.
///
/// Always positive, so both electrodes drain monotonically.
#[must_use]
pub fn sinusoidal_current(t: f64) -> f64 {
    1.0 + 0.5 * (100.0 * t).sin()
}

/// Default parameters for [`simple_ode_model`](crate::simple_ode_model).
///
/// | parameter | value |
/// |---|---|
/// | initial x_n, x_p | 0.9, 0.1 |
/// | Q_n, Q_p | 1 A·h |
/// | R | 0.1 Ω |
/// | I(t) | [`sinusoidal_current`] |
/// | U_n, U_p | Chen 2020 graphite and NMC curves |
#[must_use]
pub fn chen2020_parameter_values() -> ParameterValues {
    ParameterValues::new()
        .with_scalar(INITIAL_NEGATIVE_STOICHIOMETRY, 0.9)
        .with_scalar(INITIAL_POSITIVE_STOICHIOMETRY, 0.1)
        .with_scalar(NEGATIVE_CAPACITY, 1.0)
        .with_scalar(POSITIVE_CAPACITY, 1.0)
        .with_scalar(RESISTANCE, 0.1)
        .with_function(CURRENT_FUNCTION, sinusoidal_current)
        .with_function(NEGATIVE_OCV, graphite_lgm50_ocp_chen2020)
        .with_function(POSITIVE_OCV, nmc_lgm50_ocp_chen2020)
}
