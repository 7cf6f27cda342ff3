//! Plotting of simulation results.
//!
//! See [`quick_plot`] and [`ShowConfig`] for usage.

use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};
use thiserror::Error;

use cellsim_symbolic::Solution;

/// Configuration for rendering a [`quick_plot`] window.
///
/// Construct with [`ShowConfig::new`] and chain builder methods as needed.
/// All fields are independent with sensible defaults.
///
/// # Example
///
/// ```ignore
/// quick_plot(&solution, &["Voltage [V]"], ShowConfig::new().title("Discharge").legend())?;
/// ```
pub struct ShowConfig {
    title: Option<String>,
    legend: bool,
    time_label: String,
}

impl ShowConfig {
    /// Creates a new `ShowConfig` with defaults: no title, no legend, time axis "Time".
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: None,
            legend: false,
            time_label: "Time".to_owned(),
        }
    }

    /// Sets the window title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Enables a legend labeling each trace by name.
    #[must_use]
    pub fn legend(mut self) -> Self {
        self.legend = true;
        self
    }

    /// Sets the label of the shared time axis.
    #[must_use]
    pub fn time_label(mut self, label: impl Into<String>) -> Self {
        self.time_label = label.into();
        self
    }
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when plotting a solution.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("solution has no output variable `{0}`")]
    UnknownVariable(String),

    #[error("nothing to plot")]
    Empty,

    #[error("could not open the plot window")]
    Window(#[from] eframe::Error),
}

/// One named time series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

/// Extracts `(t, value)` series for the named output variables.
///
/// # Errors
///
/// Returns an error if no names are given or a name is not an output of the
/// solution.
pub fn series(solution: &Solution, names: &[&str]) -> Result<Vec<Series>, PlotError> {
    if names.is_empty() {
        return Err(PlotError::Empty);
    }
    names
        .iter()
        .map(|&name| {
            let values = solution
                .variable(name)
                .ok_or_else(|| PlotError::UnknownVariable(name.to_owned()))?;
            Ok(Series {
                name: name.to_owned(),
                points: solution
                    .t()
                    .iter()
                    .zip(values)
                    .map(|(&t, &v)| [t, v])
                    .collect(),
            })
        })
        .collect()
}

/// Opens a blocking egui window with one plot per output variable.
///
/// The plots are stacked vertically against time. Names are checked before
/// any window opens. Blocks until the window is closed by the user.
///
/// # Errors
///
/// Returns an error if a name is not an output of the solution or the native
/// window cannot be created.
pub fn quick_plot(solution: &Solution, names: &[&str], config: ShowConfig) -> Result<(), PlotError> {
    let series = series(solution, names)?;
    let options = eframe::NativeOptions::default();
    let title = config
        .title
        .unwrap_or_else(|| solution.model_name().to_owned());

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| {
            Ok(Box::new(PlotApp {
                series,
                legend: config.legend,
                time_label: config.time_label,
            }))
        }),
    )?;
    Ok(())
}

/// The egui [`eframe::App`] that renders one plot per series.
struct PlotApp {
    series: Vec<Series>,
    legend: bool,
    time_label: String,
}

impl eframe::App for PlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            #[allow(clippy::cast_precision_loss)]
            let height = ui.available_height() / self.series.len().max(1) as f32 - 8.0;
            for series in &self.series {
                let mut plot = Plot::new(&series.name)
                    .height(height.max(40.0))
                    .x_axis_label(self.time_label.as_str())
                    .y_axis_label(series.name.as_str());
                if self.legend {
                    plot = plot.legend(Legend::default());
                }
                plot.show(ui, |plot_ui| {
                    let points: PlotPoints = series.points.iter().copied().collect();
                    plot_ui.line(Line::new(points).name(&series.name));
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use cellsim_symbolic::{BaseModel, Expr, ParameterValues, Simulation, Variable};

    fn solution() -> Solution {
        let x = Variable::new("x");
        let model = BaseModel::new("ramp")
            .with_rhs(&x, 1.0)
            .with_initial_condition(&x, 0.0)
            .with_variable("x", x.expr())
            .with_variable("Double", 2.0 * x.expr() + Expr::time());
        Simulation::new(&model, &ParameterValues::new())
            .and_then(|sim| sim.solve_with_t_eval(&[0.0, 0.5, 1.0]))
            .expect("solves")
    }

    #[test]
    fn series_pairs_time_with_values() {
        let series = series(&solution(), &["x", "Double"]).expect("known names");

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "x");
        assert_eq!(series[1].name, "Double");

        let expected = [[0.0, 0.0, 0.0], [0.5, 0.5, 1.5], [1.0, 1.0, 3.0]];
        for (i, [t, x, double]) in expected.into_iter().enumerate() {
            assert_eq!(series[0].points[i][0], t);
            assert_relative_eq!(series[0].points[i][1], x, epsilon = 1e-12);
            assert_relative_eq!(series[1].points[i][1], double, epsilon = 1e-12);
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = series(&solution(), &["x", "Voltage"]).unwrap_err();
        assert!(matches!(err, PlotError::UnknownVariable(name) if name == "Voltage"));
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert!(matches!(series(&solution(), &[]), Err(PlotError::Empty)));
    }
}
