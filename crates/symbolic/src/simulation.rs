use log::info;

use cellsim_core::{Observer, Snapshot};
use cellsim_solvers::transient::{Crossing, Hermite, dopri, euler};

use crate::{
    BaseModel, DiscretisedModel, Error, Evaluation, FlaggedEvent, ParameterValues, Point,
    Solution, Termination,
};

/// Integrator used by a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Solver {
    /// Adaptive Dormand–Prince 5(4).
    Dopri(dopri::Config),
    /// Fixed-step forward Euler. The step is shortened so the span is
    /// covered by a whole number of steps.
    Euler { dt: f64 },
}

impl Default for Solver {
    fn default() -> Self {
        Solver::Dopri(dopri::Config::default())
    }
}

/// Progress reported to a simulation observer after each step.
#[derive(Debug, Clone)]
pub struct Progress {
    pub step: usize,
    pub time: f64,
    pub snapshot: Snapshot<Point, Evaluation>,
}

/// Control actions a simulation observer can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StopEarly,
}

/// Raw solver output before sampling.
struct Trajectory {
    history: Vec<Snapshot<Point, Evaluation>>,
    termination: Termination,
    flagged: Vec<FlaggedEvent>,
}

/// A bound, discretised model ready to solve.
///
/// ```ignore
/// let sim = Simulation::new(&model, &parameter_values)?;
/// let solution = sim.solve([0.0, 1.0])?;
/// println!("stopped by {}", solution.termination());
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    model: DiscretisedModel,
    solver: Solver,
}

impl Simulation {
    /// Binds parameters and discretises the model.
    ///
    /// # Errors
    ///
    /// Fails if the model is ill posed or a referenced parameter is missing
    /// or of the wrong kind.
    pub fn new(model: &BaseModel, parameters: &ParameterValues) -> Result<Self, Error> {
        Ok(Self {
            model: parameters.process_model(model)?,
            solver: Solver::default(),
        })
    }

    #[must_use]
    pub fn with_solver(self, solver: Solver) -> Self {
        Self { solver, ..self }
    }

    #[must_use]
    pub fn model(&self) -> &DiscretisedModel {
        &self.model
    }

    #[must_use]
    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    /// Solves over `[t0, t1]`, reporting every accepted step.
    ///
    /// # Errors
    ///
    /// Returns an error if the span is invalid or integration fails.
    pub fn solve(&self, t_span: [f64; 2]) -> Result<Solution, Error> {
        self.solve_observed(t_span, ())
    }

    /// Solves over `[t0, t1]` with an observer of each accepted step.
    ///
    /// # Errors
    ///
    /// Returns an error if the span is invalid or integration fails.
    pub fn solve_observed<Obs>(&self, t_span: [f64; 2], observer: Obs) -> Result<Solution, Error>
    where
        Obs: Observer<Progress, Action>,
    {
        let Trajectory {
            history,
            termination,
            flagged,
        } = self.integrate(t_span, observer)?;
        Ok(self.solution(&history, termination, flagged))
    }

    /// Solves over `[t_eval[0], t_eval[last]]`, reporting at the given times.
    ///
    /// States between solver steps come from the cubic Hermite interpolant
    /// of the step. Times past a termination event are dropped and the
    /// termination point itself is appended.
    ///
    /// # Errors
    ///
    /// Returns an error if `t_eval` has fewer than two entries, is not
    /// finite and non-decreasing, or integration fails.
    pub fn solve_with_t_eval(&self, t_eval: &[f64]) -> Result<Solution, Error> {
        let (Some(&first), Some(&last)) = (t_eval.first(), t_eval.last()) else {
            return Err(Error::InvalidEvaluationTimes);
        };
        if t_eval.len() < 2
            || t_eval.iter().any(|t| !t.is_finite())
            || t_eval.windows(2).any(|pair| pair[1] < pair[0])
        {
            return Err(Error::InvalidEvaluationTimes);
        }

        let trajectory = self.integrate([first, last], ())?;
        let samples = resample(&self.model, &trajectory, t_eval);
        Ok(self.solution(&samples, trajectory.termination, trajectory.flagged))
    }

    fn solution(
        &self,
        samples: &[Snapshot<Point, Evaluation>],
        termination: Termination,
        flagged: Vec<FlaggedEvent>,
    ) -> Solution {
        Solution::new(
            self.model.name(),
            self.model.state_names(),
            self.model.variable_names(),
            samples,
            termination,
            flagged,
        )
    }

    fn integrate<Obs>(&self, t_span: [f64; 2], mut observer: Obs) -> Result<Trajectory, Error>
    where
        Obs: Observer<Progress, Action>,
    {
        let [t0, t1] = t_span;
        if !t0.is_finite() || !t1.is_finite() || t1 < t0 {
            return Err(Error::InvalidSpan { start: t0, end: t1 });
        }
        let model = &self.model;
        let initial = model.initial_point(t0);

        let mut forward = |step: usize, time: f64, snapshot: &Snapshot<Point, Evaluation>| {
            observer.observe(&Progress {
                step,
                time,
                snapshot: snapshot.clone(),
            })
        };

        let (history, crossings, terminal, stopped) = match self.solver {
            Solver::Dopri(config) => {
                let solution = dopri::solve(
                    model,
                    model,
                    initial,
                    t1,
                    &config,
                    |event: &dopri::Event<Point, Evaluation>| {
                        forward(event.step, event.time, &event.snapshot)
                            .map(|Action::StopEarly| dopri::Action::StopEarly)
                    },
                )?;
                let (terminal, stopped) = match solution.status {
                    dopri::Status::Complete => (None, false),
                    dopri::Status::EventTriggered(crossing) => (Some(crossing), false),
                    dopri::Status::StoppedByObserver => (None, true),
                };
                info!(
                    "dopri: {} accepted, {} rejected steps, {} model evaluations",
                    solution.stats.accepted, solution.stats.rejected, solution.stats.evaluations
                );
                (solution.history, solution.crossings, terminal, stopped)
            }
            Solver::Euler { dt } => {
                if !dt.is_finite() || dt <= 0.0 {
                    return Err(Error::InvalidStep(dt));
                }
                let (steps, dt) = euler_grid(t1 - t0, dt);
                let solution = euler::solve(
                    model,
                    model,
                    initial,
                    dt,
                    steps,
                    |event: &euler::Event<Point, Evaluation>| {
                        forward(event.step, event.time, &event.snapshot)
                            .map(|Action::StopEarly| euler::Action::StopEarly)
                    },
                )?;
                let (terminal, stopped) = match solution.status {
                    euler::Status::Complete => (None, false),
                    euler::Status::EventTriggered(crossing) => (Some(crossing), false),
                    euler::Status::StoppedByObserver => (None, true),
                };
                (solution.history, solution.crossings, terminal, stopped)
            }
        };

        let termination = match terminal {
            Some(crossing) => Termination::Event {
                name: self.event_name(crossing),
                time: crossing.time,
            },
            None if stopped => Termination::StoppedByObserver,
            None => Termination::FinalTime,
        };
        let flagged = crossings
            .into_iter()
            .map(|crossing| FlaggedEvent {
                name: self.event_name(crossing),
                time: crossing.time,
            })
            .collect();

        info!(
            "solved `{}` over [{t0}, {t1}]: {} points, stopped by {termination}",
            model.name(),
            history.len()
        );

        Ok(Trajectory {
            history,
            termination,
            flagged,
        })
    }

    fn event_name(&self, crossing: Crossing) -> String {
        match self.model.event(crossing.index) {
            Some((name, _)) => name.to_owned(),
            None => format!("event {}", crossing.index),
        }
    }
}

/// Splits a span into whole Euler steps no longer than `dt`.
fn euler_grid(span: f64, dt: f64) -> (usize, f64) {
    if span <= 0.0 {
        return (0, dt);
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = (span / dt).ceil().max(1.0) as usize;
    #[allow(clippy::cast_precision_loss)]
    let dt = span / steps as f64;
    (steps, dt)
}

/// Samples a trajectory at the requested times, up to its last point.
fn resample(
    model: &DiscretisedModel,
    trajectory: &Trajectory,
    t_eval: &[f64],
) -> Vec<Snapshot<Point, Evaluation>> {
    let history = &trajectory.history;
    let Some(end) = history.last() else {
        return Vec::new();
    };
    let t_end = end.input.time;

    let mut samples = Vec::with_capacity(t_eval.len() + 1);
    let mut segment = 0;
    for &t in t_eval.iter().take_while(|&&t| t <= t_end) {
        while segment + 1 < history.len() - 1 && history[segment + 1].input.time < t {
            segment += 1;
        }
        let point = match history.get(segment + 1) {
            Some(next) => {
                let prev = &history[segment];
                let step = Hermite::new(
                    prev.input.time,
                    &prev.input.state,
                    &prev.output.rates,
                    next.input.time,
                    &next.input.state,
                    &next.output.rates,
                );
                Point {
                    time: t,
                    state: step.state_at(t),
                }
            }
            None => end.input.clone(),
        };
        let output = model.evaluate(&point);
        samples.push(Snapshot::new(point, output));
    }

    let ended_by_event = matches!(trajectory.termination, Termination::Event { .. });
    let reported_end = samples.last().is_some_and(|s| s.input.time >= t_end);
    if ended_by_event && !reported_end {
        samples.push(end.clone());
    }
    samples
}
