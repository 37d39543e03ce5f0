//! Runtime settings of a cart-pendulum session.
//!
//! Everything the external driver may tune lives in [`SimulationParams`]:
//! - frame time step,
//! - gravity, pendulum damping and cart friction,
//! - cart mass, rail length and wrap mode,
//! - link masses and lengths of both pendulum variants, and which one starts
//!   active.

use crate::{pendulum::PendulumKind, types::Float, DEFAULT_DAMPING, GRAVITY};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    pub dt: Float,             // frame time step (s), > 0
    pub gravity: Float,        // m/s²
    pub damping: Float,        // viscous damping on the pendulum joints, >= 0
    pub friction: Float,       // viscous friction on the cart, >= 0
    pub cart_mass: Float,      // kg, > 0
    pub rail_length: Float,    // m, > 0
    pub wrap_enabled: bool,    // cart re-enters from the opposite rail end
    pub single_mass: Float,    // kg
    pub single_length: Float,  // m
    pub double_masses: [Float; 2],
    pub double_lengths: [Float; 2],
    pub initial_kind: PendulumKind,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            dt: 1.0 / 60.0,
            gravity: GRAVITY,
            damping: DEFAULT_DAMPING,
            friction: 0.1,
            cart_mass: 1.0,
            rail_length: 4.0,
            wrap_enabled: false,
            single_mass: 0.3,
            single_length: 1.0,
            double_masses: [1.0, 1.0],
            double_lengths: [1.0, 1.0],
            initial_kind: PendulumKind::Single,
        }
    }
}

impl SimulationParams {
    pub fn with_dt(mut self, dt: Float) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_gravity(mut self, gravity: Float) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_damping(mut self, damping: Float) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_friction(mut self, friction: Float) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_cart(mut self, mass: Float, rail_length: Float) -> Self {
        self.cart_mass = mass;
        self.rail_length = rail_length;
        self
    }

    pub fn with_wrap(mut self, enabled: bool) -> Self {
        self.wrap_enabled = enabled;
        self
    }

    pub fn with_single_pendulum(mut self, mass: Float, length: Float) -> Self {
        self.single_mass = mass;
        self.single_length = length;
        self
    }

    pub fn with_double_pendulum(mut self, m1: Float, l1: Float, m2: Float, l2: Float) -> Self {
        self.double_masses = [m1, m2];
        self.double_lengths = [l1, l2];
        self
    }

    pub fn with_initial_kind(mut self, kind: PendulumKind) -> Self {
        self.initial_kind = kind;
        self
    }
}
