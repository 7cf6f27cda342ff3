use std::fmt;

use cellsim_core::Snapshot;

use crate::{Evaluation, Point};

/// Why a solve ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    /// Reached the end of the requested time span.
    FinalTime,
    /// A termination event fired.
    Event { name: String, time: f64 },
    /// An observer stopped the solve.
    StoppedByObserver,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::FinalTime => write!(f, "final time"),
            Termination::Event { name, time } => write!(f, "event `{name}` at t = {time}"),
            Termination::StoppedByObserver => write!(f, "observer"),
        }
    }
}

/// A flag event crossing recorded during a solve.
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedEvent {
    pub name: String,
    pub time: f64,
}

/// The sampled trajectory of a solved model.
///
/// Every output variable of the model is sampled at every time in [`t`].
///
/// [`t`]: Solution::t
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    model: String,
    t: Vec<f64>,
    state_names: Vec<String>,
    y: Vec<Vec<f64>>,
    variables: Vec<(String, Vec<f64>)>,
    termination: Termination,
    flagged: Vec<FlaggedEvent>,
}

impl Solution {
    pub(crate) fn new<'a>(
        model: &str,
        state_names: &[String],
        variable_names: impl Iterator<Item = &'a str>,
        samples: &[Snapshot<Point, Evaluation>],
        termination: Termination,
        flagged: Vec<FlaggedEvent>,
    ) -> Self {
        let variables = variable_names
            .enumerate()
            .map(|(i, name)| {
                let values = samples
                    .iter()
                    .map(|s| s.output.variables.get(i).copied().unwrap_or(f64::NAN))
                    .collect();
                (name.to_owned(), values)
            })
            .collect();

        Self {
            model: model.to_owned(),
            t: samples.iter().map(|s| s.input.time).collect(),
            state_names: state_names.to_vec(),
            y: samples.iter().map(|s| s.input.state.clone()).collect(),
            variables,
            termination,
            flagged,
        }
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Sample times.
    #[must_use]
    pub fn t(&self) -> &[f64] {
        &self.t
    }

    /// State vectors, one row per sample time.
    #[must_use]
    pub fn y(&self) -> &[Vec<f64>] {
        &self.y
    }

    #[must_use]
    pub fn state_names(&self) -> &[String] {
        &self.state_names
    }

    /// Returns the samples of an output variable by name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&[f64]> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn termination(&self) -> &Termination {
        &self.termination
    }

    /// Flag events crossed before the solve ended, in time order.
    #[must_use]
    pub fn flagged(&self) -> &[FlaggedEvent] {
        &self.flagged
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// The last sample time.
    #[must_use]
    pub fn final_time(&self) -> Option<f64> {
        self.t.last().copied()
    }
}
