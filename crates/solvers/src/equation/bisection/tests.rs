use std::convert::Infallible;

use approx::assert_relative_eq;
use thiserror::Error;

use cellsim_core::{EquationProblem, Model};

use super::{Action, BracketError, Config, Error, Event, Status, solve, solve_unobserved};

/// Passes its input through unchanged.
struct Passthrough;

impl Model for Passthrough {
    type Input = f64;
    type Output = f64;
    type Error = Infallible;

    fn call(&self, input: &f64) -> Result<f64, Infallible> {
        Ok(*input)
    }
}

/// Residual: cos(x) − x, with its root at the Dottie number.
struct CosMinusX;

impl EquationProblem for CosMinusX {
    type Input = f64;
    type Output = f64;
    type Error = Infallible;

    fn input(&self, x: f64) -> Result<f64, Infallible> {
        Ok(x)
    }

    fn residual(&self, input: &f64, _output: &f64) -> Result<f64, Infallible> {
        Ok(input.cos() - input)
    }
}

#[derive(Debug, Error)]
#[error("undefined below zero")]
struct Undefined;

/// Residual: sqrt(x) − 0.5, which fails for negative x.
struct SqrtProblem;

impl EquationProblem for SqrtProblem {
    type Input = f64;
    type Output = f64;
    type Error = Undefined;

    fn input(&self, x: f64) -> Result<f64, Undefined> {
        if x < 0.0 { Err(Undefined) } else { Ok(x) }
    }

    fn residual(&self, input: &f64, _output: &f64) -> Result<f64, Undefined> {
        Ok(input.sqrt() - 0.5)
    }
}

/// A level draining linearly from 0.3, as an event function of time.
struct Drain;

impl EquationProblem for Drain {
    type Input = f64;
    type Output = f64;
    type Error = Infallible;

    fn input(&self, x: f64) -> Result<f64, Infallible> {
        Ok(x)
    }

    fn residual(&self, _input: &f64, output: &f64) -> Result<f64, Infallible> {
        Ok(0.3 - output)
    }
}

#[test]
fn finds_dottie_number() {
    let solution = solve_unobserved(&Passthrough, &CosMinusX, [0.0, 2.0], &Config::default())
        .expect("should converge");

    assert_eq!(solution.status, Status::Converged);
    assert_relative_eq!(solution.x, 0.739_085_133_215_160_6, epsilon = 1e-10);
    assert_relative_eq!(solution.snapshot.output, solution.x);
}

#[test]
fn reversed_bracket_is_accepted() {
    let solution = solve_unobserved(&Passthrough, &CosMinusX, [2.0, 0.0], &Config::default())
        .expect("should converge");

    assert_relative_eq!(solution.x, 0.739_085_133_215_160_6, epsilon = 1e-10);
}

#[test]
fn exact_root_at_endpoint_converges_immediately() {
    let solution = solve_unobserved(&Passthrough, &SqrtProblem, [0.25, 1.0], &Config::default())
        .expect("endpoint root");

    assert_eq!(solution.status, Status::Converged);
    assert_eq!(solution.iters, 0);
    assert_relative_eq!(solution.x, 0.25);
}

#[test]
fn rejects_bracket_without_sign_change() {
    let err = solve_unobserved(&Passthrough, &CosMinusX, [1.0, 2.0], &Config::default())
        .expect_err("no sign change");

    assert!(matches!(
        err,
        Error::InvalidBracket(BracketError::NoSignChange)
    ));
}

#[test]
fn propagates_problem_errors() {
    let err = solve_unobserved(&Passthrough, &SqrtProblem, [-1.0, 1.0], &Config::default())
        .expect_err("left endpoint fails");

    assert!(matches!(err, Error::Problem(_)));
}

#[test]
fn stopping_on_a_failed_endpoint_leaves_nothing_to_report() {
    let err = solve(
        &Passthrough,
        &SqrtProblem,
        [-1.0, 1.0],
        &Config::default(),
        |event: &Event<'_, Passthrough, SqrtProblem>| {
            event.result().is_err().then_some(Action::StopEarly)
        },
    )
    .expect_err("no evaluation succeeded");

    assert!(matches!(err, Error::NoSuccessfulEvaluation));
}

#[test]
fn locates_a_falling_event_time() {
    let config = Config::new(100, 1e-12, 0.0, 0.0).expect("valid config");
    let solution = solve_unobserved(&Passthrough, &Drain, [0.0, 1.0], &config).expect("located");

    assert_eq!(solution.status, Status::Converged);
    assert_relative_eq!(solution.x, 0.3, epsilon = 2e-12);
    assert!(solution.residual.abs() <= 2e-12);
}

#[test]
fn observer_can_stop_early() {
    let mut midpoints = 0;
    let solution = solve(
        &Passthrough,
        &CosMinusX,
        [0.0, 2.0],
        &Config::default(),
        |event: &Event<'_, Passthrough, CosMinusX>| {
            if let Event::Midpoint { .. } = event {
                midpoints += 1;
                if midpoints == 3 {
                    return Some(Action::StopEarly);
                }
            }
            None
        },
    )
    .expect("stopped early");

    assert_eq!(solution.status, Status::StoppedByObserver);
    assert_eq!(solution.iters, 3);
}

#[test]
fn reports_max_iters() {
    let config = Config::new(4, 0.0, 0.0, 0.0).expect("valid config");
    let solution =
        solve_unobserved(&Passthrough, &CosMinusX, [0.0, 2.0], &config).expect("best effort");

    assert_eq!(solution.status, Status::MaxIters);
    assert_eq!(solution.iters, 4);
}
