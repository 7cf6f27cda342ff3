use approx::{assert_abs_diff_eq, assert_relative_eq};

use cellsim_battery::{
    RunConfig, RunError, SolverConfig, chen2020_parameter_values, checks,
    model::{
        CURRENT, INITIAL_NEGATIVE_STOICHIOMETRY, INITIAL_POSITIVE_STOICHIOMETRY,
        NEGATIVE_STOICHIOMETRY, POSITIVE_STOICHIOMETRY, STOP_NEGATIVE_FULL, STOP_POSITIVE_EMPTY,
        VOLTAGE,
    },
    ocv::{graphite_lgm50_ocp_chen2020, nmc_lgm50_ocp_chen2020},
    simple_ode_model, simulate, sinusoidal_current,
};
use cellsim_symbolic::{
    BaseModel, ParameterValues, Simulation, Solution, Solver, Termination, Variable,
};

/// Time at which `∫ I dt = 0.1`, draining the positive electrode from 0.1.
const POSITIVE_EMPTY_TIME: f64 = 0.090_371_044_667_135_11;

fn solve_with(values: &ParameterValues) -> Solution {
    Simulation::new(&simple_ode_model(), values)
        .and_then(|sim| sim.solve([0.0, 1.0]))
        .expect("solves")
}

fn default_solution() -> Solution {
    solve_with(&chen2020_parameter_values())
}

fn series<'a>(solution: &'a Solution, name: &str) -> &'a [f64] {
    solution.variable(name).expect("known output")
}

#[test]
fn initial_conditions_are_echoed_exactly() {
    let solution = default_solution();

    assert_eq!(solution.t()[0], 0.0);
    assert_eq!(series(&solution, NEGATIVE_STOICHIOMETRY)[0], 0.9);
    assert_eq!(series(&solution, POSITIVE_STOICHIOMETRY)[0], 0.1);
    assert_eq!(solution.y()[0], [0.9, 0.1]);
}

#[test]
fn positive_electrode_empties_first() {
    let solution = default_solution();

    let Termination::Event { name, time } = solution.termination() else {
        panic!("expected an event, got {}", solution.termination());
    };
    assert_eq!(name, STOP_POSITIVE_EMPTY);
    assert_abs_diff_eq!(*time, POSITIVE_EMPTY_TIME, epsilon = 1e-6);
    assert_eq!(solution.final_time(), Some(*time));

    let x_n = series(&solution, NEGATIVE_STOICHIOMETRY);
    let x_p = series(&solution, POSITIVE_STOICHIOMETRY);
    assert_abs_diff_eq!(*x_p.last().expect("not empty"), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(*x_n.last().expect("not empty"), 0.8, epsilon = 1e-6);
}

#[test]
fn voltage_matches_its_definition_at_every_sample() {
    let solution = default_solution();
    let x_n = series(&solution, NEGATIVE_STOICHIOMETRY);
    let x_p = series(&solution, POSITIVE_STOICHIOMETRY);
    let voltage = series(&solution, VOLTAGE);

    for (i, &t) in solution.t().iter().enumerate() {
        let expected = nmc_lgm50_ocp_chen2020(x_p[i]) - graphite_lgm50_ocp_chen2020(x_n[i])
            - 0.1 * sinusoidal_current(t);
        assert_relative_eq!(voltage[i], expected, max_relative = 1e-12);
    }
    assert_relative_eq!(voltage[0], 4.402_462_613_885_512, max_relative = 1e-12);
}

#[test]
fn current_output_follows_the_profile() {
    let solution = default_solution();
    for (&t, &current) in solution.t().iter().zip(series(&solution, CURRENT)) {
        assert_eq!(current, sinusoidal_current(t));
    }
}

#[test]
fn stoichiometries_never_rise_while_discharging() {
    let solution = default_solution();

    assert!(checks::discharge_consistency(&solution, 0.0).is_empty());
    for name in [NEGATIVE_STOICHIOMETRY, POSITIVE_STOICHIOMETRY] {
        assert!(series(&solution, name).windows(2).all(|w| w[1] <= w[0]));
    }
}

#[test]
fn solving_is_deterministic() {
    assert_eq!(default_solution(), default_solution());
}

#[test]
fn out_of_range_initial_state_stops_at_once() {
    let mut values = chen2020_parameter_values();
    values
        .update([(INITIAL_POSITIVE_STOICHIOMETRY, -0.1)])
        .expect("known parameter");
    let solution = solve_with(&values);

    assert_eq!(
        solution.termination(),
        &Termination::Event {
            name: STOP_POSITIVE_EMPTY.into(),
            time: 0.0
        }
    );
    assert_eq!(solution.len(), 1);

    let mut values = chen2020_parameter_values();
    values
        .update([(INITIAL_NEGATIVE_STOICHIOMETRY, 1.2)])
        .expect("known parameter");
    let solution = solve_with(&values);

    assert_eq!(
        solution.termination(),
        &Termination::Event {
            name: STOP_NEGATIVE_FULL.into(),
            time: 0.0
        }
    );
}

#[test]
fn charging_fills_the_negative_electrode() {
    let mut values = chen2020_parameter_values();
    values
        .update([("Current function [A]", -1.0)])
        .expect("known parameter");
    let solution = solve_with(&values);

    let Termination::Event { name, time } = solution.termination() else {
        panic!("expected an event, got {}", solution.termination());
    };
    assert_eq!(name, STOP_NEGATIVE_FULL);
    assert_abs_diff_eq!(*time, 0.1, epsilon = 1e-9);

    // Rising stoichiometry is expected when the current is negative.
    assert!(checks::discharge_consistency(&solution, 0.0).is_empty());
}

#[test]
fn consistency_check_flags_rising_stoichiometry() {
    let x = Variable::new(NEGATIVE_STOICHIOMETRY);
    let model = BaseModel::new("inconsistent")
        .with_rhs(&x, 1.0)
        .with_initial_condition(&x, 0.0)
        .with_variable(NEGATIVE_STOICHIOMETRY, &x)
        .with_variable(CURRENT, 1.0);
    let solution = Simulation::new(&model, &ParameterValues::new())
        .and_then(|sim| sim.solve_with_t_eval(&[0.0, 0.5, 1.0]))
        .expect("solves");

    let violations = checks::discharge_consistency(&solution, 1e-12);

    assert_eq!(violations.len(), 2);
    assert_eq!(violations[0].variable, NEGATIVE_STOICHIOMETRY);
    assert_eq!(violations[0].index, 1);
    assert_relative_eq!(violations[1].increase, 0.5, epsilon = 1e-9);
}

#[test]
fn reporting_at_fixed_times_ends_at_the_event() {
    let sim = Simulation::new(&simple_ode_model(), &chen2020_parameter_values()).expect("binds");
    let t_eval: Vec<f64> = (0..=100).map(|i| f64::from(i) / 100.0).collect();
    let solution = sim.solve_with_t_eval(&t_eval).expect("solves");

    // 0.00 ..= 0.09, then the crossing.
    assert_eq!(solution.len(), 11);
    assert_eq!(&solution.t()[..10], &t_eval[..10]);
    assert_abs_diff_eq!(solution.t()[10], POSITIVE_EMPTY_TIME, epsilon = 1e-6);
}

#[test]
fn euler_agrees_with_dopri() {
    let sim = Simulation::new(&simple_ode_model(), &chen2020_parameter_values())
        .expect("binds")
        .with_solver(Solver::Euler { dt: 1e-4 });
    let solution = sim.solve([0.0, 1.0]).expect("solves");

    let Termination::Event { name, time } = solution.termination() else {
        panic!("expected an event, got {}", solution.termination());
    };
    assert_eq!(name, STOP_POSITIVE_EMPTY);
    assert_abs_diff_eq!(*time, POSITIVE_EMPTY_TIME, epsilon = 1e-3);
}

#[test]
fn run_config_overrides_are_applied() {
    let base = simulate(&RunConfig::default()).expect("solves");
    let config: RunConfig = "[parameters]\n\"Electrode resistance [Ohm]\" = 0.3"
        .parse()
        .expect("valid");
    let higher = simulate(&config).expect("solves");

    // Same trajectory, larger ohmic drop: 0.2 Ω more at I(0) = 1 A.
    assert_eq!(base.t(), higher.t());
    assert_relative_eq!(
        series(&base, VOLTAGE)[0] - series(&higher, VOLTAGE)[0],
        0.2,
        epsilon = 1e-12
    );
}

#[test]
fn run_config_selects_the_solver() {
    let config = RunConfig {
        solver: SolverConfig::Euler { dt: 1e-3 },
        ..RunConfig::default()
    };
    let solution = simulate(&config).expect("solves");

    // Euler with a fixed step reports at multiples of dt before the event.
    assert_abs_diff_eq!(solution.t()[1], 1e-3, epsilon = 1e-15);
}

#[test]
fn unknown_outputs_are_rejected() {
    let config = RunConfig {
        outputs: vec!["Temperature [K]".into()],
        ..RunConfig::default()
    };
    assert!(matches!(
        simulate(&config),
        Err(RunError::UnknownOutput(name)) if name == "Temperature [K]"
    ));
}
