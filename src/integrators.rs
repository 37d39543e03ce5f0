use itertools::izip;
use na::DVector;

use crate::{flog, types::Float};

/// Number of stages of the Dormand-Prince 8(7) pair.
pub const STAGES: usize = 13;

/// Steps shorter than this are accepted regardless of the error estimate.
pub const MIN_STEP: Float = 1e-10;

/// Upper bound on consecutive rejections inside one adaptive step.
pub const MAX_REJECTIONS: usize = 64;

const SAFETY: Float = 0.9;
const MIN_SHRINK: Float = 0.2;

/// Node coefficients c
#[rustfmt::skip]
const C: [Float; STAGES] = [
    0.0, 1.0 / 18.0, 1.0 / 12.0, 1.0 / 8.0, 5.0 / 16.0, 3.0 / 8.0, 59.0 / 400.0,
    93.0 / 200.0, 5490023248.0 / 9719169821.0, 13.0 / 20.0, 1201146811.0 / 1299019798.0,
    1.0, 1.0,
];

/// Weights of the 8th order (propagated) solution
#[rustfmt::skip]
const B8: [Float; STAGES] = [
    14005451.0 / 335480064.0, 0.0, 0.0, 0.0, 0.0,
    -59238493.0 / 1068277825.0, 181606767.0 / 758867731.0,
    561292985.0 / 797845732.0, -1041891430.0 / 1371343529.0,
    760417239.0 / 1151165299.0, 118820643.0 / 751138087.0,
    -528747749.0 / 2220607170.0, 1.0 / 4.0,
];

/// Weights of the embedded 7th order solution, only used for the error
/// estimate
#[rustfmt::skip]
const B7: [Float; STAGES] = [
    13451932.0 / 455176623.0, 0.0, 0.0, 0.0, 0.0,
    -808719846.0 / 976000145.0, 1757004468.0 / 5645159321.0,
    656045339.0 / 265891186.0, -3867574721.0 / 1518517206.0,
    465885868.0 / 322736535.0, 53011238.0 / 667516719.0,
    2.0 / 45.0, 0.0,
];

/// Runge-Kutta matrix, strictly lower triangular
#[rustfmt::skip]
const A: [[Float; STAGES]; STAGES] = [
    [0.0; STAGES],
    [1.0 / 18.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 48.0, 1.0 / 16.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 32.0, 0.0, 3.0 / 32.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [5.0 / 16.0, 0.0, -75.0 / 64.0, 75.0 / 64.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 80.0, 0.0, 0.0, 3.0 / 16.0, 3.0 / 20.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [
        29443841.0 / 614563906.0, 0.0, 0.0, 77736538.0 / 692538347.0,
        -28693883.0 / 1125000000.0, 23124283.0 / 1800000000.0,
        0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    ],
    [
        16016141.0 / 946692911.0, 0.0, 0.0, 61564180.0 / 158732637.0,
        22789713.0 / 633445777.0, 545815736.0 / 2771057229.0,
        -180193667.0 / 1043307555.0,
        0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    ],
    [
        39632708.0 / 573591083.0, 0.0, 0.0, -433636366.0 / 683701615.0,
        -421739975.0 / 2616292301.0, 100302831.0 / 723423059.0,
        790204164.0 / 839813087.0, 800635310.0 / 3783071287.0,
        0.0, 0.0, 0.0, 0.0, 0.0,
    ],
    [
        246121993.0 / 1340847787.0, 0.0, 0.0, -37695042795.0 / 15268766246.0,
        -309121744.0 / 1061227803.0, -12992083.0 / 490766935.0,
        6005943493.0 / 2108947869.0, 393006217.0 / 1396673457.0,
        123872331.0 / 1001029789.0,
        0.0, 0.0, 0.0, 0.0,
    ],
    [
        -1028468189.0 / 846180014.0, 0.0, 0.0, 8478235783.0 / 508512852.0,
        1311729495.0 / 1432422823.0, -10304129995.0 / 1701304382.0,
        -48777925059.0 / 3047939560.0, 15336726248.0 / 1032824649.0,
        -45442868181.0 / 3398467696.0, 3065993473.0 / 597172653.0,
        0.0, 0.0, 0.0,
    ],
    [
        185892177.0 / 718116043.0, 0.0, 0.0, -3185094517.0 / 667107341.0,
        -477755414.0 / 1098053517.0, -703635378.0 / 230739211.0,
        5731566787.0 / 1027545527.0, 5232866602.0 / 850066563.0,
        -4093664535.0 / 808688257.0, 3962137247.0 / 1805957418.0,
        65686358.0 / 487910083.0,
        0.0, 0.0,
    ],
    [
        403863854.0 / 491063109.0, 0.0, 0.0, -5068492393.0 / 434740067.0,
        -411421997.0 / 543043805.0, 652783627.0 / 914296604.0,
        11173962825.0 / 925320556.0, -13158990841.0 / 6184727034.0,
        3936647629.0 / 1978049680.0, -160528059.0 / 685178525.0,
        248638103.0 / 1413531060.0, 0.0,
        0.0,
    ],
];

/// Bookkeeping of the work done by an integrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegratorStats {
    /// Number of derivative evaluations
    pub fn_evals: u64,
    /// Number of accepted steps, fixed or adaptive
    pub accepted: u64,
    /// Number of adaptive attempts thrown away for exceeding the tolerance
    pub rejected: u64,
    /// Number of adaptive steps accepted only because the rejection cap was hit
    pub capped: u64,
}

/// Dormand-Prince 8(7) embedded Runge-Kutta stepper.
///
/// Thirteen stages, 8th order propagated solution, 7th order embedded
/// solution for the error estimate. The derivative function writes
/// dx/dt = f(t, x) into its third argument.
///
/// The stage derivatives, the stage state and the two candidate solutions of
/// the adaptive step are kept between calls and only reallocated when the
/// length of the state vector changes.
///
/// Ref: Prince, P. J., & Dormand, J. R. (1981). "High order embedded
/// Runge-Kutta formulae". Journal of Computational and Applied Mathematics,
/// 7(1), 67-75.
#[derive(Debug, Clone)]
pub struct DormandPrince87 {
    k: Vec<DVector<Float>>,
    stage_state: DVector<Float>,
    state8: DVector<Float>,
    state7: DVector<Float>,
    stats: IntegratorStats,
}

impl DormandPrince87 {
    pub fn new() -> Self {
        DormandPrince87 {
            k: vec![],
            stage_state: DVector::zeros(0),
            state8: DVector::zeros(0),
            state7: DVector::zeros(0),
            stats: IntegratorStats::default(),
        }
    }

    /// Counters accumulated since construction
    pub fn stats(&self) -> IntegratorStats {
        self.stats
    }

    /// Length of the state vector the workspace is currently sized for
    pub fn workspace_len(&self) -> usize {
        self.stage_state.len()
    }

    fn ensure_workspace(&mut self, n: usize) {
        if self.k.len() == STAGES && self.stage_state.len() == n {
            return;
        }
        self.k = vec![DVector::zeros(n); STAGES];
        self.stage_state = DVector::zeros(n);
        self.state8 = DVector::zeros(n);
        self.state7 = DVector::zeros(n);
    }

    /// Evaluate all thirteen stage derivatives for a step of size dt from
    /// (t, state). Every stage sees t + c_i * dt and the previously computed
    /// stage derivatives only.
    fn compute_stages<F>(&mut self, t: Float, state: &DVector<Float>, f: &mut F, dt: Float)
    where
        F: FnMut(Float, &DVector<Float>, &mut DVector<Float>),
    {
        self.ensure_workspace(state.len());

        for stage in 0..STAGES {
            self.stage_state.copy_from(state);
            for (a, k) in izip!(A[stage][..stage].iter(), self.k.iter()) {
                if *a != 0.0 {
                    self.stage_state.axpy(dt * a, k, 1.0);
                }
            }

            f(t + C[stage] * dt, &self.stage_state, &mut self.k[stage]);
        }
        self.stats.fn_evals += STAGES as u64;
    }

    /// Advance `state` by exactly `dt` with the 8th order solution, without
    /// any error control.
    pub fn step_fixed<F>(&mut self, t: Float, state: &mut DVector<Float>, mut f: F, dt: Float)
    where
        F: FnMut(Float, &DVector<Float>, &mut DVector<Float>),
    {
        self.compute_stages(t, state, &mut f, dt);
        for (b, k) in izip!(B8.iter(), self.k.iter()) {
            if *b != 0.0 {
                state.axpy(dt * b, k, 1.0);
            }
        }
        self.stats.accepted += 1;
    }

    /// Advance `state` by at most `dt` under error control.
    ///
    /// The error of an attempt is the largest absolute component difference
    /// between the 8th and 7th order solutions. An attempt is accepted when
    /// that error is below `tolerance` or the attempted step is already
    /// shorter than [`MIN_STEP`]; otherwise the step is shrunk to
    /// 0.9 dt (tolerance / error)^(1/8), kept within [0.2 dt, 0.9 dt], and
    /// retried from the same t. After [`MAX_REJECTIONS`] rejections the
    /// current attempt is accepted as is.
    ///
    /// Precondition: `tolerance > 0`. A rejected step never grows, so the
    /// loop ends with a finite step even when this does not hold.
    ///
    /// Returns the step size actually taken.
    pub fn step<F>(
        &mut self,
        t: Float,
        state: &mut DVector<Float>,
        mut f: F,
        dt: Float,
        tolerance: Float,
    ) -> Float
    where
        F: FnMut(Float, &DVector<Float>, &mut DVector<Float>),
    {
        let mut dt = dt;
        let mut rejections = 0;
        loop {
            self.compute_stages(t, state, &mut f, dt);
            combine(state, &B8, &self.k, dt, &mut self.state8);
            combine(state, &B7, &self.k, dt, &mut self.state7);
            let error = max_abs_difference(&self.state8, &self.state7);

            let converged = error < tolerance || dt < MIN_STEP;
            let capped = !converged && rejections >= MAX_REJECTIONS;
            if converged || capped {
                if capped {
                    flog!(
                        "DormandPrince87: accepting step dt={} with error {} > tolerance {} after {} rejections",
                        dt,
                        error,
                        tolerance,
                        rejections
                    );
                    self.stats.capped += 1;
                }
                state.copy_from(&self.state8);
                self.stats.accepted += 1;
                return dt;
            }

            // error == 0 with tolerance <= 0 gives an infinite or NaN factor
            let factor = SAFETY * (tolerance / error).powf(1.0 / 8.0);
            let factor = if factor.is_nan() {
                MIN_SHRINK
            } else {
                factor.clamp(MIN_SHRINK, SAFETY)
            };
            dt *= factor;
            rejections += 1;
            self.stats.rejected += 1;
        }
    }
}

/// out = x + dt * Σ b_i k_i
fn combine(
    state: &DVector<Float>,
    weights: &[Float; STAGES],
    k: &[DVector<Float>],
    dt: Float,
    out: &mut DVector<Float>,
) {
    out.copy_from(state);
    for (b, k) in izip!(weights.iter(), k.iter()) {
        if *b != 0.0 {
            out.axpy(dt * b, k, 1.0);
        }
    }
}

/// Largest absolute component difference. NaN if any component is NaN.
fn max_abs_difference(a: &DVector<Float>, b: &DVector<Float>) -> Float {
    izip!(a.iter(), b.iter()).fold(0.0, |max, (x, y)| {
        let diff = (x - y).abs();
        if diff > max || diff.is_nan() {
            diff
        } else {
            max
        }
    })
}

impl Default for DormandPrince87 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod integrators_tests {
    use na::dvector;

    use crate::util::assert_close;

    use super::*;

    fn exponential_decay(_t: Float, x: &DVector<Float>, dxdt: &mut DVector<Float>) {
        dxdt[0] = -x[0];
    }

    fn harmonic_oscillator(_t: Float, x: &DVector<Float>, dxdt: &mut DVector<Float>) {
        dxdt[0] = x[1];
        dxdt[1] = -x[0];
    }

    #[test]
    fn tableau_is_consistent() {
        // Row sums of A equal the nodes c
        for stage in 0..STAGES {
            let row_sum: Float = A[stage].iter().sum();
            assert_close(row_sum, C[stage], 1e-12);

            // Explicit scheme: nothing on or above the diagonal
            for j in stage..STAGES {
                assert_eq!(A[stage][j], 0.0);
            }
        }

        // Both weight vectors integrate a constant exactly
        assert_close(B8.iter().sum::<Float>(), 1.0, 1e-12);
        assert_close(B7.iter().sum::<Float>(), 1.0, 1e-12);
    }

    #[test]
    fn fixed_step_exponential_decay() {
        // Arrange
        let mut integrator = DormandPrince87::new();
        let mut x = dvector![1.0];

        // Act
        let dt = 0.1;
        for i in 0..10 {
            integrator.step_fixed(i as Float * dt, &mut x, exponential_decay, dt);
        }

        // Assert
        assert_close(x[0], (-1.0 as Float).exp(), 1e-12);
        assert_eq!(integrator.stats().fn_evals, 10 * STAGES as u64);
        assert_eq!(integrator.stats().accepted, 10);
    }

    #[test]
    fn fixed_step_harmonic_oscillator() {
        let mut integrator = DormandPrince87::new();
        let mut x = dvector![1.0, 0.0];

        let dt = 1.0 / 144.0;
        let n = 144 * 2;
        for i in 0..n {
            integrator.step_fixed(i as Float * dt, &mut x, harmonic_oscillator, dt);
        }

        let t = n as Float * dt;
        assert_close(x[0], t.cos(), 1e-12);
        assert_close(x[1], -t.sin(), 1e-12);
    }

    #[test]
    fn stages_see_shifted_time() {
        // dx/dt = t^7 is integrated exactly by an 8th order method
        let mut integrator = DormandPrince87::new();
        let mut x = dvector![0.0];

        let t0 = 0.5;
        let dt = 0.25;
        integrator.step_fixed(t0, &mut x, |t, _x, dxdt| dxdt[0] = t.powi(7), dt);

        let t1: Float = t0 + dt;
        let expected = (t1.powi(8) - t0.powi(8)) / 8.0;
        assert_close(x[0], expected, 1e-12);
    }

    #[test]
    fn workspace_follows_state_length() {
        let mut integrator = DormandPrince87::new();
        assert_eq!(integrator.workspace_len(), 0);

        let mut x2 = dvector![1.0, 0.0];
        integrator.step_fixed(0.0, &mut x2, harmonic_oscillator, 0.01);
        assert_eq!(integrator.workspace_len(), 2);

        let mut x1 = dvector![1.0];
        integrator.step_fixed(0.0, &mut x1, exponential_decay, 0.01);
        assert_eq!(integrator.workspace_len(), 1);
        assert_close(x1[0], (-0.01 as Float).exp(), 1e-14);
    }

    #[test]
    fn adaptive_step_accepts_small_step() {
        // Arrange
        let mut integrator = DormandPrince87::new();
        let mut x = dvector![1.0, 0.0];

        // Act
        let dt = 0.01;
        let taken = integrator.step(0.0, &mut x, harmonic_oscillator, dt, 1e-8);

        // Assert
        assert_eq!(taken, dt);
        assert_close(x[0], dt.cos(), 1e-14);
        assert_eq!(integrator.stats().rejected, 0);
    }

    #[test]
    fn adaptive_step_shrinks_large_step() {
        let mut integrator = DormandPrince87::new();
        let mut x = dvector![1.0, 0.0];

        let dt = 3.0;
        let taken = integrator.step(0.0, &mut x, harmonic_oscillator, dt, 1e-12);

        assert!(taken < dt);
        assert!(taken >= MIN_STEP);
        assert!(integrator.stats().rejected > 0);
        assert_close(x[0], taken.cos(), 1e-10);
        assert_close(x[1], -taken.sin(), 1e-10);
    }

    #[test]
    fn adaptive_step_accepts_below_min_step() {
        // A tolerance that can never be met still terminates
        let mut integrator = DormandPrince87::new();
        let mut x = dvector![1.0];

        let taken = integrator.step(0.0, &mut x, |_t, _x, dxdt| dxdt[0] = 1.0, 1e-11, -1.0);

        assert_eq!(taken, 1e-11);
        assert_eq!(integrator.stats().rejected, 0);
        assert_close(x[0], 1.0 + 1e-11, 1e-15);
    }

    #[test]
    fn adaptive_step_rejection_cap() {
        // Arrange: a NaN derivative never meets the tolerance, and the step is
        // large enough that 64 minimal shrinks stay above MIN_STEP
        let mut integrator = DormandPrince87::new();
        let mut x = dvector![1.0];
        let dt = 1e40;

        // Act
        let taken = integrator.step(0.0, &mut x, |_t, _x, dxdt| dxdt[0] = Float::NAN, dt, 1e-8);

        // Assert
        let stats = integrator.stats();
        assert_eq!(stats.rejected, MAX_REJECTIONS as u64);
        assert_eq!(stats.capped, 1);
        assert_eq!(stats.accepted, 1);
        let expected = dt * MIN_SHRINK.powi(MAX_REJECTIONS as i32);
        assert_close(taken / expected, 1.0, 1e-12);
        assert!(x[0].is_nan());
    }

    #[test]
    fn rejected_step_never_grows() {
        // Zero error against a non-positive tolerance: the shrink factor is
        // capped at 0.9 instead of blowing up to infinity
        let mut integrator = DormandPrince87::new();
        let mut x = dvector![2.0];

        let taken = integrator.step(0.0, &mut x, |_t, _x, dxdt| dxdt[0] = 0.0, 1.0, -1.0);

        let stats = integrator.stats();
        assert!(taken.is_finite());
        assert_close(taken, SAFETY.powi(MAX_REJECTIONS as i32), 1e-15);
        assert_eq!(stats.rejected, MAX_REJECTIONS as u64);
        assert_eq!(stats.capped, 1);
        assert_eq!(x[0], 2.0);
    }

    #[test]
    fn adaptive_step_reuses_workspace() {
        let mut integrator = DormandPrince87::new();
        let mut x = dvector![1.0, 0.0];

        integrator.step(0.0, &mut x, harmonic_oscillator, 0.01, 1e-8);
        integrator.step(0.01, &mut x, harmonic_oscillator, 0.01, 1e-8);

        assert_eq!(integrator.workspace_len(), 2);
        assert_eq!(integrator.state8.len(), 2);
        assert_eq!(integrator.state7.len(), 2);
        assert_close(x[0], (0.02 as Float).cos(), 1e-14);
    }

    #[test]
    fn max_abs_difference_propagates_nan() {
        let a = dvector![1.0, Float::NAN, 3.0];
        let b = dvector![0.5, 0.0, 0.0];

        assert!(max_abs_difference(&a, &b).is_nan());
        assert_eq!(max_abs_difference(&b, &dvector![0.0, -2.0, 1.0]), 2.0);
    }
}
