//! Adaptive Dormand–Prince 5(4) solver for ODE problems.
//!
//! Each step evaluates seven stages and advances with the fifth-order
//! solution. The embedded fourth-order solution gives a local error estimate,
//! measured in a mixed absolute/relative RMS norm:
//!
//! ```text
//! err = sqrt(mean((e_i / (atol + rtol * max(|y_i|, |y_new_i|)))²))
//! ```
//!
//! Steps with `err <= 1` are accepted. The next step size is scaled by
//! `0.9 * err^(-1/5)`, limited to [0.2, 5] and never grown right after a
//! rejection. The last stage is the first stage of the next step (FSAL).
//!
//! After every accepted step the problem's event values are compared with the
//! previous ones. Events that reach or cross zero are located on a cubic
//! Hermite interpolant of the step. The earliest terminal crossing ends the
//! solve with a final snapshot taken exactly there.
//!
//! # Example
//!
//! ```ignore
//! use cellsim_solvers::transient::dopri;
//!
//! let solution = dopri::solve_unobserved(&model, &problem, initial, 1.0, &dopri::Config::default())?;
//! if let dopri::Status::EventTriggered(crossing) = solution.status {
//!     println!("event {} fired at t = {}", crossing.index, crossing.time);
//! }
//! ```

mod action;
mod config;
mod error;
mod event;
mod solution;


pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Stats, Status};

use log::{debug, info, warn};

use cellsim_core::{Model, Observer, OdeProblem, Snapshot};

use super::{Crossing, crossing};

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

// Dormand–Prince tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order weights, used to advance.
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Fifth minus fourth order weights.
const E1: f64 = B1 - 5179.0 / 57600.0;
const E3: f64 = B3 - 7571.0 / 16695.0;
const E4: f64 = B4 - 393.0 / 640.0;
const E5: f64 = B5 + 92097.0 / 339_200.0;
const E6: f64 = B6 - 187.0 / 2100.0;
const E7: f64 = -1.0 / 40.0;

/// Integrates an ODE problem from its initial input to `t_end`.
///
/// # Observer
///
/// The observer receives an [`Event`] for the initial state and after each
/// accepted step, and may return [`Action::StopEarly`] to end the solve.
///
/// # Errors
///
/// Returns an error if the time span is invalid, the model or problem fails,
/// the state becomes non-finite, the step size underflows, the step budget is
/// exhausted, or an event crossing cannot be located.
pub fn solve<M, P, Obs>(
    model: &M,
    problem: &P,
    initial: M::Input,
    t_end: f64,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone,
    P: OdeProblem<Input = M::Input, Output = M::Output>,
    Obs: Observer<Event<M::Input, M::Output>, Action>,
{
    let t0 = problem.time(&initial);
    if !t0.is_finite() || !t_end.is_finite() || t_end < t0 {
        return Err(Error::InvalidSpan {
            start: t0,
            end: t_end,
        });
    }

    let mut stats = Stats::default();
    let output = model.call(&initial).map_err(Error::model)?;
    stats.evaluations += 1;
    let mut current = Snapshot::new(initial, output);

    let mut y = problem.state(&current.input).map_err(Error::problem)?;
    let mut k1 = problem
        .derivative(&current.input, &current.output)
        .map_err(Error::problem)?;
    check_rate(t0, &y, &k1)?;
    let mut g = problem
        .events(&current.input, &current.output)
        .map_err(Error::problem)?;

    if let Some(index) = crossing::active_at_start(problem, &g) {
        warn!("event {index} is already active at the initial time t = {t0}");
        return Ok(Solution {
            status: Status::EventTriggered(Crossing { index, time: t0 }),
            history: vec![current],
            crossings: Vec::new(),
            stats,
        });
    }

    let mut history = vec![current.clone()];
    let mut crossings = Vec::new();

    let event = Event {
        step: 0,
        time: t0,
        step_size: 0.0,
        snapshot: current.clone(),
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return Ok(Solution {
            status: Status::StoppedByObserver,
            history,
            crossings,
            stats,
        });
    }

    let mut t = t0;
    let mut h = config
        .initial_step()
        .unwrap_or_else(|| initial_step(config, t_end - t0, &y, &k1));
    let mut just_rejected = false;

    while t < t_end {
        if stats.accepted + stats.rejected >= config.max_steps() {
            return Err(Error::MaxStepsExceeded {
                time: t,
                max_steps: config.max_steps(),
            });
        }

        let remaining = t_end - t;
        h = h.min(config.max_step());
        let last = h >= remaining;
        if last {
            h = remaining;
        } else if h < config.min_step() {
            return Err(Error::StepSizeUnderflow { time: t, step: h });
        }

        let base = &current.input;
        let mut stage = |c: f64, y_stage: Vec<f64>| {
            stage_rate(model, problem, base, t + c * h, &y_stage, &mut stats)
        };

        let k2 = stage(C2, combine(&y, h, &[(A21, &k1)]))?.1;
        let k3 = stage(C3, combine(&y, h, &[(A31, &k1), (A32, &k2)]))?.1;
        let k4 = stage(C4, combine(&y, h, &[(A41, &k1), (A42, &k2), (A43, &k3)]))?.1;
        let k5 = stage(
            C5,
            combine(&y, h, &[(A51, &k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
        )?
        .1;
        let k6 = stage(
            1.0,
            combine(
                &y,
                h,
                &[(A61, &k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
            ),
        )?
        .1;
        let y_new = combine(
            &y,
            h,
            &[(B1, &k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
        );

        let t_new = if last { t_end } else { t + h };
        let (next, k7) = stage_rate(model, problem, &current.input, t_new, &y_new, &mut stats)?;

        let err = error_norm(
            config,
            &y,
            &y_new,
            h,
            &[(E1, &k1), (E3, &k3), (E4, &k4), (E5, &k5), (E6, &k6), (E7, &k7)],
        );

        if !err.is_finite() {
            if h * MIN_FACTOR < config.min_step() {
                return Err(Error::NonFiniteState { time: t_new });
            }
            debug!("non-finite error estimate at t = {t}, shrinking step {h:e}");
            h *= MIN_FACTOR;
            stats.rejected += 1;
            just_rejected = true;
            continue;
        }

        if err > 1.0 {
            debug!("rejected step at t = {t}: h = {h:e}, err = {err:.3}");
            h *= (SAFETY * err.powf(-0.2)).max(MIN_FACTOR);
            stats.rejected += 1;
            just_rejected = true;
            continue;
        }

        stats.accepted += 1;
        let g_new = problem
            .events(&next.input, &next.output)
            .map_err(Error::problem)?;

        let crossed = crossing::crossed(&g, &g_new);
        if !crossed.is_empty() {
            let located =
                crossing::locate(model, problem, &current, &next, &crossed, config.event())?;
            crossings.extend(located.flagged);

            if let Some((crossing, snapshot)) = located.terminal {
                history.push(snapshot.clone());
                observer.observe(&Event {
                    step: stats.accepted,
                    time: crossing.time,
                    step_size: crossing.time - t,
                    snapshot,
                });
                info!(
                    "dopri: event {} stopped integration at t = {} after {} steps ({} rejected)",
                    crossing.index, crossing.time, stats.accepted, stats.rejected
                );
                return Ok(Solution {
                    status: Status::EventTriggered(crossing),
                    history,
                    crossings,
                    stats,
                });
            }
        }

        history.push(next.clone());
        let event = Event {
            step: stats.accepted,
            time: t_new,
            step_size: h,
            snapshot: next.clone(),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution {
                status: Status::StoppedByObserver,
                history,
                crossings,
                stats,
            });
        }

        let mut factor = if err == 0.0 {
            MAX_FACTOR
        } else {
            (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
        };
        if just_rejected {
            factor = factor.min(1.0);
        }
        h *= factor;
        just_rejected = false;

        current = next;
        y = y_new;
        k1 = k7;
        g = g_new;
        t = t_new;
    }

    info!(
        "dopri: reached t = {t} after {} steps ({} rejected, {} evaluations)",
        stats.accepted, stats.rejected, stats.evaluations
    );

    Ok(Solution {
        status: Status::Complete,
        history,
        crossings,
        stats,
    })
}

/// Integrates an ODE problem without observation.
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
    t_end: f64,
    config: &Config,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone,
    P: OdeProblem<Input = M::Input, Output = M::Output>,
{
    solve(model, problem, initial, t_end, config, ())
}

/// Evaluates the model at a stage and returns its snapshot and derivative.
fn stage_rate<M, P>(
    model: &M,
    problem: &P,
    base: &M::Input,
    t: f64,
    y: &[f64],
    stats: &mut Stats,
) -> Result<(Snapshot<M::Input, M::Output>, Vec<f64>), Error>
where
    M: Model,
    P: OdeProblem<Input = M::Input, Output = M::Output>,
{
    let input = problem.build_input(base, t, y).map_err(Error::problem)?;
    let output = model.call(&input).map_err(Error::model)?;
    stats.evaluations += 1;
    let rate = problem
        .derivative(&input, &output)
        .map_err(Error::problem)?;
    if rate.len() != y.len() {
        return Err(Error::DimensionMismatch {
            expected: y.len(),
            found: rate.len(),
        });
    }
    Ok((Snapshot::new(input, output), rate))
}

/// Returns `y + h * Σ aᵢ kᵢ`.
fn combine(y: &[f64], h: f64, terms: &[(f64, &Vec<f64>)]) -> Vec<f64> {
    (0..y.len())
        .map(|i| y[i] + h * terms.iter().map(|(a, k)| a * k[i]).sum::<f64>())
        .collect()
}

/// Returns the scaled RMS norm of the local error estimate.
fn error_norm(
    config: &Config,
    y: &[f64],
    y_new: &[f64],
    h: f64,
    terms: &[(f64, &Vec<f64>)],
) -> f64 {
    if y.is_empty() {
        return 0.0;
    }
    let sum: f64 = (0..y.len())
        .map(|i| {
            let e = h * terms.iter().map(|(w, k)| w * k[i]).sum::<f64>();
            let scale = config.atol() + config.rtol() * y[i].abs().max(y_new[i].abs());
            (e / scale).powi(2)
        })
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let n = y.len() as f64;
    (sum / n).sqrt()
}

/// Estimates a first step from the scaled sizes of the state and its derivative.
fn initial_step(config: &Config, span: f64, y: &[f64], rate: &[f64]) -> f64 {
    let rms = |v: &[f64]| {
        if v.is_empty() {
            return 0.0;
        }
        let sum: f64 = v
            .iter()
            .zip(y)
            .map(|(x, yi)| (x / (config.atol() + config.rtol() * yi.abs())).powi(2))
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let n = v.len() as f64;
        (sum / n).sqrt()
    };
    let d0 = rms(y);
    let d1 = rms(rate);
    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };
    h0.min(span).min(config.max_step()).max(config.min_step())
}

/// Checks that the state and its derivative agree in size and are finite.
fn check_rate(time: f64, y: &[f64], rate: &[f64]) -> Result<(), Error> {
    if rate.len() != y.len() {
        return Err(Error::DimensionMismatch {
            expected: y.len(),
            found: rate.len(),
        });
    }
    if y.iter().chain(rate).any(|v| !v.is_finite()) {
        return Err(Error::NonFiniteState { time });
    }
    Ok(())
}
