//! Consistency checks on a solved battery model.

use log::warn;

use cellsim_symbolic::Solution;

use crate::model::{CURRENT, NEGATIVE_STOICHIOMETRY, POSITIVE_STOICHIOMETRY};

/// A stoichiometry that rose while the cell was discharging.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub variable: &'static str,
    /// Sample index at which the value rose.
    pub index: usize,
    pub time: f64,
    pub increase: f64,
}

/// Checks that both stoichiometries are non-increasing wherever the current
/// is non-negative at both ends of a sample interval.
///
/// Increases no larger than `tolerance` are ignored. Each violation is also
/// logged as a warning. Solutions without the required outputs yield no
/// violations.
#[must_use]
pub fn discharge_consistency(solution: &Solution, tolerance: f64) -> Vec<Violation> {
    let Some(current) = solution.variable(CURRENT) else {
        return Vec::new();
    };

    let mut violations = Vec::new();
    for variable in [NEGATIVE_STOICHIOMETRY, POSITIVE_STOICHIOMETRY] {
        let Some(values) = solution.variable(variable) else {
            continue;
        };
        for i in 1..values.len() {
            let discharging = current[i - 1] >= 0.0 && current[i] >= 0.0;
            let increase = values[i] - values[i - 1];
            if discharging && increase > tolerance {
                let time = solution.t()[i];
                warn!("{variable} rose by {increase:e} at t = {time} while discharging");
                violations.push(Violation {
                    variable,
                    index: i,
                    time,
                    increase,
                });
            }
        }
    }
    violations
}
