//! Interactive plot of a damped oscillator.
//!
//! # Usage
//!
//! ```text
//! cargo run --example plot --features plot
//! cargo run --example plot --features plot -- euler 0.2
//! ```
//!
//! # Modes
//!
//! - **dopri** (default): adaptive Dormand–Prince over 30 seconds.
//! - **euler [dt]**: forward Euler; drift grows with the step size. Try
//!   `0.05` (default), `0.2`, `0.5` to see the difference.

use std::error::Error;

use cellsim_observers::{ShowConfig, quick_plot};
use cellsim_symbolic::{BaseModel, Expr, ParameterValues, Simulation, Solver, Variable};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let solver = match args.next().as_deref() {
        None | Some("dopri") => Solver::default(),
        Some("euler") => {
            let dt = args.next().map(|s| s.parse::<f64>()).transpose()?;
            Solver::Euler {
                dt: dt.unwrap_or(0.05),
            }
        }
        Some(other) => {
            eprintln!("Unknown mode: {other}");
            eprintln!("Usage: plot [dopri|euler [dt]]");
            std::process::exit(1);
        }
    };

    let x = Variable::new("Position");
    let v = Variable::new("Velocity");
    let omega = Expr::parameter("Natural frequency");
    let zeta = Expr::parameter("Damping ratio");
    let model = BaseModel::new("Damped oscillator")
        .with_rhs(&x, v.expr())
        .with_rhs(
            &v,
            -2.0 * zeta * &omega * v.expr() - omega.clone().pow(2.0) * x.expr(),
        )
        .with_initial_condition(&x, 1.0)
        .with_initial_condition(&v, 0.0)
        .with_variable("Position", x.expr())
        .with_variable("Velocity", v.expr())
        .with_variable(
            "Energy",
            0.5 * v.expr().pow(2.0) + 0.5 * omega.pow(2.0) * x.expr().pow(2.0),
        );

    let values = ParameterValues::new()
        .with_scalar("Natural frequency", 1.0)
        .with_scalar("Damping ratio", 0.1);

    let solution = Simulation::new(&model, &values)?
        .with_solver(solver)
        .solve([0.0, 30.0])?;

    quick_plot(
        &solution,
        &["Position", "Velocity", "Energy"],
        ShowConfig::new().legend().time_label("Time [s]"),
    )?;
    Ok(())
}
