//! Forward Euler solver for ODE problems.
//!
//! Steps a model forward in time with a fixed step size:
//!
//! ```text
//! y_{n+1} = y_n + f(t_n, y_n) * dt
//! ```
//!
//! Event values are checked after every step and crossings are located the
//! same way as in [`dopri`](super::dopri), using the default bisection
//! settings.
//!
//! # Example
//!
//! ```ignore
//! use cellsim_solvers::transient::euler;
//!
//! let solution = euler::solve_unobserved(&model, &problem, initial_input, dt, steps)?;
//!
//! for snapshot in &solution.history {
//!     println!("{:?}: {:?}", snapshot.input, snapshot.output);
//! }
//! ```

mod action;
mod error;
mod event;
mod solution;

pub use action::Action;
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use log::{info, warn};

use cellsim_core::{Model, Observer, OdeProblem, Snapshot};

use crate::equation::bisection;

use super::{Crossing, crossing};

/// Integrates an ODE problem using forward Euler.
///
/// # Algorithm
///
/// 1. Call the model with the initial input to get the initial snapshot.
/// 2. Stop at once if a terminal event is already non-positive.
/// 3. For each step:
///    - Extract the state and derivative from the current snapshot.
///    - Step the state forward: `state + derivative * dt`.
///    - Build the next input and call the model.
///    - Locate any event crossings within the step.
///    - Emit an [`Event`] to the observer.
/// 4. Return the solution with the full history.
///
/// # Observer
///
/// The observer receives an [`Event`] after each integration step and may
/// return [`Action::StopEarly`] to terminate the simulation early.
///
/// # Errors
///
/// Returns an error if `dt` is not positive, the state becomes non-finite,
/// or the model or problem returns an error at any point.
pub fn solve<M, P, Obs>(
    model: &M,
    problem: &P,
    initial: M::Input,
    dt: f64,
    steps: usize,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone,
    P: OdeProblem<Input = M::Input, Output = M::Output>,
    Obs: Observer<Event<M::Input, M::Output>, Action>,
{
    if !dt.is_finite() || dt <= 0.0 {
        return Err(Error::InvalidStep { dt });
    }

    let initial_output = model.call(&initial).map_err(Error::model)?;
    let mut current = Snapshot::new(initial, initial_output);
    let t0 = problem.time(&current.input);

    let mut history = Vec::with_capacity(steps + 1);
    history.push(current.clone());
    let mut crossings = Vec::new();

    let mut values = problem
        .events(&current.input, &current.output)
        .map_err(Error::problem)?;
    if let Some(index) = crossing::active_at_start(problem, &values) {
        warn!("event {index} is already active at the initial time t = {t0}");
        return Ok(Solution {
            status: Status::EventTriggered(Crossing { index, time: t0 }),
            history,
            crossings,
            steps: 0,
        });
    }

    let event = Event {
        step: 0,
        time: t0,
        snapshot: current.clone(),
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return Ok(Solution {
            status: Status::StoppedByObserver,
            history,
            crossings,
            steps: 0,
        });
    }

    let locate_config = bisection::Config::default();

    for step in 1..=steps {
        let t = problem.time(&current.input);
        let state = problem.state(&current.input).map_err(Error::problem)?;
        let derivative = problem
            .derivative(&current.input, &current.output)
            .map_err(Error::problem)?;
        if derivative.len() != state.len() {
            return Err(Error::DimensionMismatch {
                expected: state.len(),
                found: derivative.len(),
            });
        }

        let next_state: Vec<f64> = state
            .iter()
            .zip(&derivative)
            .map(|(y, dy)| y + dy * dt)
            .collect();
        // Grid times are t0 + n * dt, not a running sum.
        #[allow(clippy::cast_precision_loss)]
        let t_next = t0 + dt * step as f64;
        if next_state.iter().any(|y| !y.is_finite()) {
            return Err(Error::NonFiniteState { time: t_next });
        }
        let next_input = problem
            .build_input(&current.input, t_next, &next_state)
            .map_err(Error::problem)?;
        let next_output = model.call(&next_input).map_err(Error::model)?;
        let next = Snapshot::new(next_input, next_output);

        let next_values = problem
            .events(&next.input, &next.output)
            .map_err(Error::problem)?;
        let crossed = crossing::crossed(&values, &next_values);
        if !crossed.is_empty() {
            let located =
                crossing::locate(model, problem, &current, &next, &crossed, &locate_config)?;
            crossings.extend(located.flagged);

            if let Some((crossing, snapshot)) = located.terminal {
                history.push(snapshot.clone());
                observer.observe(&Event {
                    step,
                    time: crossing.time,
                    snapshot,
                });
                info!(
                    "euler: event {} stopped integration at t = {} after {step} steps",
                    crossing.index, crossing.time
                );
                return Ok(Solution {
                    status: Status::EventTriggered(crossing),
                    history,
                    crossings,
                    steps: step,
                });
            }
        }

        history.push(next.clone());

        let event = Event {
            step,
            time: t_next,
            snapshot: next.clone(),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution {
                status: Status::StoppedByObserver,
                history,
                crossings,
                steps: step,
            });
        }

        current = next;
        values = next_values;
    }

    Ok(Solution {
        status: Status::Complete,
        history,
        crossings,
        steps,
    })
}

/// Integrates an ODE problem using forward Euler without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// Returns an error under the same conditions as [`solve`].
pub fn solve_unobserved<M, P>(
    model: &M,
    problem: &P,
    initial: M::Input,
    dt: f64,
    steps: usize,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone,
    P: OdeProblem<Input = M::Input, Output = M::Output>,
{
    solve(model, problem, initial, dt, steps, ())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;

    // --- Test fixtures ---

    /// Model input: current position and time.
    #[derive(Debug, Clone)]
    struct Input {
        position: f64,
        time: f64,
    }

    /// Model output: velocity at the current state.
    #[derive(Debug, Clone)]
    struct Output {
        velocity: f64,
    }

    /// Model with constant velocity.
    struct ConstantVelocityModel {
        velocity: f64,
    }

    impl Model for ConstantVelocityModel {
        type Input = Input;
        type Output = Output;
        type Error = Infallible;

        fn call(&self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
            Ok(Output {
                velocity: self.velocity,
            })
        }
    }

    /// Problem that integrates position, with an optional wall event.
    struct MotionProblem {
        wall: Option<f64>,
    }

    impl OdeProblem for MotionProblem {
        type Input = Input;
        type Output = Output;
        type Error = Infallible;

        fn time(&self, input: &Self::Input) -> f64 {
            input.time
        }

        fn state(&self, input: &Self::Input) -> Result<Vec<f64>, Self::Error> {
            Ok(vec![input.position])
        }

        fn derivative(
            &self,
            _input: &Self::Input,
            output: &Self::Output,
        ) -> Result<Vec<f64>, Self::Error> {
            Ok(vec![output.velocity])
        }

        fn build_input(
            &self,
            _base: &Self::Input,
            time: f64,
            state: &[f64],
        ) -> Result<Self::Input, Self::Error> {
            Ok(Input {
                position: state[0],
                time,
            })
        }

        fn events(
            &self,
            input: &Self::Input,
            _output: &Self::Output,
        ) -> Result<Vec<f64>, Self::Error> {
            Ok(self.wall.iter().map(|wall| wall - input.position).collect())
        }
    }

    fn origin() -> Input {
        Input {
            position: 0.0,
            time: 0.0,
        }
    }

    // --- Tests ---

    #[test]
    fn constant_velocity_motion() {
        let model = ConstantVelocityModel { velocity: 2.0 };
        let problem = MotionProblem { wall: None };

        let solution = solve_unobserved(&model, &problem, origin(), 0.1, 10).expect("should solve");

        assert_eq!(solution.status, Status::Complete);
        assert_eq!(solution.steps, 10);
        assert_eq!(solution.history.len(), 11); // initial + 10 steps

        // After 10 steps at v=2, dt=0.1: position = 0 + 2*0.1*10 = 2.0
        let final_snapshot = solution.history.last().unwrap();
        assert_relative_eq!(final_snapshot.input.position, 2.0);
        assert_relative_eq!(final_snapshot.input.time, 1.0);
    }

    #[test]
    fn stops_at_wall_crossing() {
        let model = ConstantVelocityModel { velocity: 1.0 };
        let problem = MotionProblem { wall: Some(0.35) };

        let solution = solve_unobserved(&model, &problem, origin(), 0.1, 10).expect("should solve");

        let Status::EventTriggered(crossing) = solution.status else {
            panic!("expected an event, got {:?}", solution.status);
        };
        assert_eq!(crossing.index, 0);
        assert_relative_eq!(crossing.time, 0.35, epsilon = 1e-9);
        assert_eq!(solution.steps, 4);

        let last = solution.history.last().unwrap();
        assert_relative_eq!(last.input.position, 0.35, epsilon = 1e-9);
    }

    #[test]
    fn wall_behind_start_stops_immediately() {
        let model = ConstantVelocityModel { velocity: 1.0 };
        let problem = MotionProblem { wall: Some(-1.0) };

        let solution = solve_unobserved(&model, &problem, origin(), 0.1, 10).expect("should solve");

        assert_eq!(
            solution.status,
            Status::EventTriggered(Crossing {
                index: 0,
                time: 0.0
            })
        );
        assert_eq!(solution.history.len(), 1);
    }

    #[test]
    fn rejects_non_positive_step() {
        let model = ConstantVelocityModel { velocity: 1.0 };
        let problem = MotionProblem { wall: None };

        let result = solve_unobserved(&model, &problem, origin(), 0.0, 10);
        assert!(matches!(result, Err(Error::InvalidStep { .. })));
    }

    #[test]
    fn non_finite_state_is_an_error() {
        let model = ConstantVelocityModel {
            velocity: f64::INFINITY,
        };
        let problem = MotionProblem { wall: None };

        let result = solve_unobserved(&model, &problem, origin(), 0.1, 10);
        // Reported at the end of the failing step.
        assert!(matches!(result, Err(Error::NonFiniteState { time }) if time == 0.1));
    }

    #[test]
    fn observer_can_stop_early() {
        let model = ConstantVelocityModel { velocity: 1.0 };
        let problem = MotionProblem { wall: None };

        let observer = |event: &Event<Input, Output>| {
            if event.step >= 5 {
                Some(Action::StopEarly)
            } else {
                None
            }
        };

        let solution =
            solve(&model, &problem, origin(), 0.1, 100, observer).expect("should stop early");

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(solution.steps, 5);
        assert_eq!(solution.history.len(), 6); // initial + 5 steps
    }

    #[test]
    fn zero_steps_returns_initial() {
        let model = ConstantVelocityModel { velocity: 1.0 };
        let problem = MotionProblem { wall: None };
        let initial = Input {
            position: 5.0,
            time: 0.0,
        };

        let solution =
            solve_unobserved(&model, &problem, initial, 0.1, 0).expect("should return initial");

        assert_eq!(solution.status, Status::Complete);
        assert_eq!(solution.steps, 0);
        assert_eq!(solution.history.len(), 1);
        assert_relative_eq!(solution.history[0].input.position, 5.0);
    }

    #[test]
    fn event_times_follow_the_grid() {
        let model = ConstantVelocityModel { velocity: 1.0 };
        let problem = MotionProblem { wall: None };

        let mut times = Vec::new();
        solve(
            &model,
            &problem,
            origin(),
            0.25,
            4,
            |event: &Event<Input, Output>| {
                times.push((event.step, event.time));
                None
            },
        )
        .expect("should solve");

        assert_eq!(
            times,
            vec![(0, 0.0), (1, 0.25), (2, 0.5), (3, 0.75), (4, 1.0)]
        );
    }
}
