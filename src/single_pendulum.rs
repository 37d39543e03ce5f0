use na::DVector;

use crate::{
    integrators::DormandPrince87, types::Float, util::normalize_angle, DEFAULT_DAMPING, GRAVITY,
};

/// Below these magnitudes a pendulum is considered settled and snapped to
/// exactly zero.
pub const SETTLE_ANGLE_EPS: Float = 1e-6;
pub const SETTLE_VELOCITY_EPS: Float = 1e-6;

/// Angular acceleration of a point-mass pendulum hanging from a pivot that
/// accelerates horizontally with `cart_accel`.
///
/// θ = 0 is hanging straight down.
///     θ̈ = (-g sin θ - a cos θ - d θ̇) / L
pub fn angular_acceleration(
    angle: Float,
    angular_velocity: Float,
    cart_accel: Float,
    gravity: Float,
    damping: Float,
    length: Float,
) -> Float {
    let numerator = -gravity * angle.sin() - cart_accel * angle.cos();
    (numerator - damping * angular_velocity) / length
}

/// One rod with a point mass at its end, pivoted on the cart.
///
/// Preconditions: `mass > 0`, `length > 0`. Neither is checked.
#[derive(Debug, Clone)]
pub struct SinglePendulum {
    mass: Float,
    length: Float,
    angle: Float,
    angular_velocity: Float,
    initial_angle: Float,
    gravity: Float,
    damping: Float,
    state: DVector<Float>, // [θ, θ̇]
    integrator: DormandPrince87,
}

impl SinglePendulum {
    /// Hanging straight down, at rest
    pub fn new(mass: Float, length: Float) -> Self {
        SinglePendulum {
            mass,
            length,
            angle: 0.0,
            angular_velocity: 0.0,
            initial_angle: 0.0,
            gravity: GRAVITY,
            damping: DEFAULT_DAMPING,
            state: DVector::zeros(2),
            integrator: DormandPrince87::new(),
        }
    }

    /// Advance by dt while the pivot accelerates with `cart_accel`.
    pub fn update(&mut self, dt: Float, cart_accel: Float) {
        let (gravity, damping, length) = (self.gravity, self.damping, self.length);

        self.state[0] = self.angle;
        self.state[1] = self.angular_velocity;
        self.integrator.step_fixed(
            0.0,
            &mut self.state,
            |_t, x, dxdt| {
                dxdt[0] = x[1];
                dxdt[1] = angular_acceleration(x[0], x[1], cart_accel, gravity, damping, length);
            },
            dt,
        );

        self.angle = normalize_angle(self.state[0]);
        self.angular_velocity = self.state[1];

        if self.angular_velocity.abs() < SETTLE_VELOCITY_EPS && self.angle.abs() < SETTLE_ANGLE_EPS
        {
            self.angle = 0.0;
            self.angular_velocity = 0.0;
        }
    }

    pub fn reset(&mut self) {
        self.angle = self.initial_angle;
        self.angular_velocity = 0.0;
    }

    pub fn mass(&self) -> Float {
        self.mass
    }

    pub fn length(&self) -> Float {
        self.length
    }

    pub fn angle(&self) -> Float {
        self.angle
    }

    pub fn angular_velocity(&self) -> Float {
        self.angular_velocity
    }

    pub fn initial_angle(&self) -> Float {
        self.initial_angle
    }

    pub fn gravity(&self) -> Float {
        self.gravity
    }

    pub fn damping(&self) -> Float {
        self.damping
    }

    pub fn set_angle(&mut self, angle: Float) {
        self.angle = angle;
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: Float) {
        self.angular_velocity = angular_velocity;
    }

    /// Angle restored by `reset`
    pub fn set_initial_angle(&mut self, angle: Float) {
        self.initial_angle = angle;
    }

    pub fn set_gravity(&mut self, gravity: Float) {
        self.gravity = gravity;
    }

    pub fn set_damping(&mut self, damping: Float) {
        self.damping = damping;
    }

    pub fn set_mass(&mut self, mass: Float) {
        self.mass = mass;
    }

    pub fn set_length(&mut self, length: Float) {
        self.length = length;
    }
}
