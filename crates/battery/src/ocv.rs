//! Open-circuit potentials of the LG M50 cell.
//!
//! Curve fits from Chen et al. (2020), "Development of Experimental
//! Techniques for Parameterization of Multi-scale Lithium-ion Battery
//! Models", J. Electrochem. Soc. 167, 080534. The fits are only meaningful
//! for stoichiometries in [0, 1]; outside that range they still return a
//! number.

/// Graphite negative electrode OCP [V] as a function of stoichiometry.
#[must_use]
pub fn graphite_lgm50_ocp_chen2020(sto: f64) -> f64 {
    1.9793 * (-39.3631 * sto).exp() + 0.2482
        - 0.0909 * (29.8538 * (sto - 0.1234)).tanh()
        - 0.04478 * (14.9159 * (sto - 0.2769)).tanh()
        - 0.0205 * (30.4444 * (sto - 0.6103)).tanh()
}

/// NMC811 positive electrode OCP [V] as a function of stoichiometry.
#[must_use]
pub fn nmc_lgm50_ocp_chen2020(sto: f64) -> f64 {
    -0.8090 * sto + 4.4875
        - 0.0428 * (18.5138 * (sto - 0.5542)).tanh()
        - 17.7326 * (15.7890 * (sto - 0.3117)).tanh()
        + 17.5842 * (15.9308 * (sto - 0.3120)).tanh()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn graphite_reference_values() {
        assert_relative_eq!(
            graphite_lgm50_ocp_chen2020(0.1),
            0.406_516_110_806_544_9,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            graphite_lgm50_ocp_chen2020(0.5),
            0.133_085_512_859_335_2,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            graphite_lgm50_ocp_chen2020(0.9),
            0.092_020_001_652_941_27,
            max_relative = 1e-12
        );
    }

    #[test]
    fn nmc_reference_values() {
        assert_relative_eq!(
            nmc_lgm50_ocp_chen2020(0.1),
            4.594_482_615_538_453,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            nmc_lgm50_ocp_chen2020(0.5),
            3.971_958_656_403_654,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            nmc_lgm50_ocp_chen2020(0.9),
            3.568_200_281_643_513,
            max_relative = 1e-12
        );
    }

    #[test]
    fn potentials_fall_with_stoichiometry() {
        let grid: Vec<f64> = (0..=20).map(|i| f64::from(i) / 20.0).collect();
        for pair in grid.windows(2) {
            assert!(nmc_lgm50_ocp_chen2020(pair[1]) < nmc_lgm50_ocp_chen2020(pair[0]));
            assert!(graphite_lgm50_ocp_chen2020(pair[1]) < graphite_lgm50_ocp_chen2020(pair[0]));
        }
    }
}
