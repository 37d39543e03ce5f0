use na::{DVector, Matrix2, Vector2};

use crate::{
    integrators::DormandPrince87,
    single_pendulum::{SETTLE_ANGLE_EPS, SETTLE_VELOCITY_EPS},
    types::Float,
    util::normalize_angle,
    DEFAULT_DAMPING, GRAVITY,
};

/// Mass matrices with a determinant below this are treated as singular.
pub const SINGULAR_DET_EPS: Float = 1e-12;

/// Physical constants of a double pendulum, copied into the derivative
/// function for each step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoublePendulumParams {
    pub m1: Float,
    pub m2: Float,
    pub l1: Float,
    pub l2: Float,
    pub gravity: Float,
    pub damping: Float,
}

impl DoublePendulumParams {
    /// Mass matrix A and right-hand side of A [θ̈1; θ̈2] = rhs.
    ///
    /// Euler-Lagrange equations of two point masses on massless rods, hanging
    /// from a pivot with horizontal acceleration `cart_accel`. Both angles are
    /// absolute, measured from the downward vertical:
    ///     x1 = x_cart + L1 sin θ1,  y1 = -L1 cos θ1
    ///     x2 = x1 + L2 sin θ2,      y2 = y1 - L2 cos θ2
    /// The first row is divided through by L1, the second by L2.
    #[rustfmt::skip]
    pub fn mass_matrix_and_rhs(
        &self,
        theta1: Float, omega1: Float,
        theta2: Float, omega2: Float,
        cart_accel: Float,
    ) -> (Matrix2<Float>, Vector2<Float>) {
        let Self { m1, m2, l1, l2, gravity: g, damping: d } = *self;
        let c = (theta1 - theta2).cos();
        let s = (theta1 - theta2).sin();

        let A = Matrix2::new(
            (m1 + m2) * l1, m2 * l2 * c,
            m2 * l1 * c,    m2 * l2,
        );
        let rhs = Vector2::new(
            -(m1 + m2) * g * theta1.sin() - m2 * l2 * omega2 * omega2 * s
                - (m1 + m2) * cart_accel * theta1.cos() - d * omega1,
            m2 * l1 * omega1 * omega1 * s - m2 * g * theta2.sin()
                - m2 * cart_accel * theta2.cos() - d * omega2,
        );
        (A, rhs)
    }

    /// Angular accelerations (θ̈1, θ̈2).
    ///
    /// Solved by Cramer's rule. A near-singular mass matrix falls back to the
    /// decoupled estimates rhs_i / A_ii (dividing by 1 where A_ii vanishes as
    /// well), so the result stays finite.
    pub fn angular_accelerations(
        &self,
        theta1: Float,
        omega1: Float,
        theta2: Float,
        omega2: Float,
        cart_accel: Float,
    ) -> (Float, Float) {
        let (A, rhs) = self.mass_matrix_and_rhs(theta1, omega1, theta2, omega2, cart_accel);

        let det = A.determinant();
        if det.abs() < SINGULAR_DET_EPS {
            let a11 = if A[(0, 0)].abs() > SINGULAR_DET_EPS { A[(0, 0)] } else { 1.0 };
            let a22 = if A[(1, 1)].abs() > SINGULAR_DET_EPS { A[(1, 1)] } else { 1.0 };
            return (rhs[0] / a11, rhs[1] / a22);
        }

        let alpha1 = (rhs[0] * A[(1, 1)] - A[(0, 1)] * rhs[1]) / det;
        let alpha2 = (A[(0, 0)] * rhs[1] - rhs[0] * A[(1, 0)]) / det;
        (alpha1, alpha2)
    }
}

/// Two point-mass links in series, the first pivoted on the cart.
///
/// Preconditions: masses and lengths > 0. None of them is checked.
#[derive(Debug, Clone)]
pub struct DoublePendulum {
    params: DoublePendulumParams,
    angles: [Float; 2],
    angular_velocities: [Float; 2],
    initial_angles: [Float; 2],
    state: DVector<Float>, // [θ1, ω1, θ2, ω2]
    integrator: DormandPrince87,
}

impl DoublePendulum {
    /// Both links hanging straight down, at rest
    pub fn new(m1: Float, l1: Float, m2: Float, l2: Float) -> Self {
        DoublePendulum {
            params: DoublePendulumParams {
                m1,
                m2,
                l1,
                l2,
                gravity: GRAVITY,
                damping: DEFAULT_DAMPING,
            },
            angles: [0.0; 2],
            angular_velocities: [0.0; 2],
            initial_angles: [0.0; 2],
            state: DVector::zeros(4),
            integrator: DormandPrince87::new(),
        }
    }

    /// Advance by dt while the pivot accelerates with `cart_accel`.
    pub fn update(&mut self, dt: Float, cart_accel: Float) {
        let params = self.params;

        self.state[0] = self.angles[0];
        self.state[1] = self.angular_velocities[0];
        self.state[2] = self.angles[1];
        self.state[3] = self.angular_velocities[1];
        self.integrator.step_fixed(
            0.0,
            &mut self.state,
            |_t, x, dxdt| {
                let (alpha1, alpha2) =
                    params.angular_accelerations(x[0], x[1], x[2], x[3], cart_accel);
                dxdt[0] = x[1];
                dxdt[1] = alpha1;
                dxdt[2] = x[3];
                dxdt[3] = alpha2;
            },
            dt,
        );

        self.angles = [normalize_angle(self.state[0]), normalize_angle(self.state[2])];
        self.angular_velocities = [self.state[1], self.state[3]];

        let settled = self.angles.iter().all(|a| a.abs() < SETTLE_ANGLE_EPS)
            && self
                .angular_velocities
                .iter()
                .all(|w| w.abs() < SETTLE_VELOCITY_EPS);
        if settled {
            self.angles = [0.0; 2];
            self.angular_velocities = [0.0; 2];
        }
    }

    pub fn reset(&mut self) {
        self.angles = self.initial_angles;
        self.angular_velocities = [0.0; 2];
    }

    pub fn params(&self) -> &DoublePendulumParams {
        &self.params
    }

    /// Angle of link `index` (0 at the pivot), None past the second link
    pub fn angle(&self, index: usize) -> Option<Float> {
        self.angles.get(index).copied()
    }

    pub fn angular_velocity(&self, index: usize) -> Option<Float> {
        self.angular_velocities.get(index).copied()
    }

    pub fn initial_angle(&self, index: usize) -> Option<Float> {
        self.initial_angles.get(index).copied()
    }

    pub fn mass(&self, index: usize) -> Option<Float> {
        match index {
            0 => Some(self.params.m1),
            1 => Some(self.params.m2),
            _ => None,
        }
    }

    pub fn length(&self, index: usize) -> Option<Float> {
        match index {
            0 => Some(self.params.l1),
            1 => Some(self.params.l2),
            _ => None,
        }
    }

    pub fn gravity(&self) -> Float {
        self.params.gravity
    }

    pub fn damping(&self) -> Float {
        self.params.damping
    }

    /// Out-of-range indices are ignored
    pub fn set_angle(&mut self, index: usize, angle: Float) {
        if let Some(a) = self.angles.get_mut(index) {
            *a = angle;
        }
    }

    pub fn set_angular_velocity(&mut self, index: usize, angular_velocity: Float) {
        if let Some(w) = self.angular_velocities.get_mut(index) {
            *w = angular_velocity;
        }
    }

    /// Angle restored by `reset`
    pub fn set_initial_angle(&mut self, index: usize, angle: Float) {
        if let Some(a) = self.initial_angles.get_mut(index) {
            *a = angle;
        }
    }

    pub fn set_gravity(&mut self, gravity: Float) {
        self.params.gravity = gravity;
    }

    pub fn set_damping(&mut self, damping: Float) {
        self.params.damping = damping;
    }
}
