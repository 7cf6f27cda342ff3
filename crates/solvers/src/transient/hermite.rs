/// Cubic Hermite interpolant across one accepted step.
///
/// Built from the states and derivatives at both ends of a step, so it
/// matches the integrator at the endpoints and is third-order accurate in
/// between. Used to locate event crossings and to report solutions at
/// requested times.
#[derive(Debug, Clone, Copy)]
pub struct Hermite<'a> {
    t0: f64,
    t1: f64,
    y0: &'a [f64],
    y1: &'a [f64],
    f0: &'a [f64],
    f1: &'a [f64],
}

impl<'a> Hermite<'a> {
    /// Creates an interpolant from the two ends of a step.
    ///
    /// All slices must have the same length.
    #[must_use]
    pub fn new(
        t0: f64,
        y0: &'a [f64],
        f0: &'a [f64],
        t1: f64,
        y1: &'a [f64],
        f1: &'a [f64],
    ) -> Self {
        debug_assert_eq!(y0.len(), y1.len());
        debug_assert_eq!(f0.len(), f1.len());
        Self {
            t0,
            t1,
            y0,
            y1,
            f0,
            f1,
        }
    }

    /// Evaluates the interpolated state at `t`.
    ///
    /// Values of `t` outside the step extrapolate the cubic.
    #[must_use]
    pub fn state_at(&self, t: f64) -> Vec<f64> {
        let h = self.t1 - self.t0;
        #[allow(clippy::float_cmp)]
        if h == 0.0 {
            return self.y1.to_vec();
        }

        let s = (t - self.t0) / h;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        (0..self.y0.len())
            .map(|i| {
                h00 * self.y0[i] + h10 * h * self.f0[i] + h01 * self.y1[i] + h11 * h * self.f1[i]
            })
            .collect()
    }
}
