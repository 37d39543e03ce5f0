use crate::{
    double_pendulum::DoublePendulum,
    energy::{
        double_pendulum_kinetic_energy, double_pendulum_potential_energy,
        single_pendulum_kinetic_energy, single_pendulum_potential_energy,
    },
    single_pendulum::SinglePendulum,
    types::Float,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendulumKind {
    Single,
    Double,
}

impl PendulumKind {
    pub fn toggled(self) -> Self {
        match self {
            PendulumKind::Single => PendulumKind::Double,
            PendulumKind::Double => PendulumKind::Single,
        }
    }
}

/// Any of the pendulums that can hang from the cart.
#[derive(Debug, Clone)]
pub enum Pendulum {
    Single(SinglePendulum),
    Double(DoublePendulum),
}

impl Pendulum {
    pub fn kind(&self) -> PendulumKind {
        match self {
            Pendulum::Single(_) => PendulumKind::Single,
            Pendulum::Double(_) => PendulumKind::Double,
        }
    }

    pub fn update(&mut self, dt: Float, cart_accel: Float) {
        match self {
            Pendulum::Single(p) => p.update(dt, cart_accel),
            Pendulum::Double(p) => p.update(dt, cart_accel),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Pendulum::Single(p) => p.reset(),
            Pendulum::Double(p) => p.reset(),
        }
    }

    /// Number of links, and of valid indices for the per-link accessors
    pub fn num_angles(&self) -> usize {
        match self {
            Pendulum::Single(_) => 1,
            Pendulum::Double(_) => 2,
        }
    }

    pub fn angle(&self, index: usize) -> Option<Float> {
        match self {
            Pendulum::Single(p) => (index == 0).then(|| p.angle()),
            Pendulum::Double(p) => p.angle(index),
        }
    }

    pub fn angular_velocity(&self, index: usize) -> Option<Float> {
        match self {
            Pendulum::Single(p) => (index == 0).then(|| p.angular_velocity()),
            Pendulum::Double(p) => p.angular_velocity(index),
        }
    }

    pub fn mass(&self, index: usize) -> Option<Float> {
        match self {
            Pendulum::Single(p) => (index == 0).then(|| p.mass()),
            Pendulum::Double(p) => p.mass(index),
        }
    }

    pub fn length(&self, index: usize) -> Option<Float> {
        match self {
            Pendulum::Single(p) => (index == 0).then(|| p.length()),
            Pendulum::Double(p) => p.length(index),
        }
    }

    /// Returns false for an index past the last link
    pub fn set_angle(&mut self, index: usize, angle: Float) -> bool {
        if index >= self.num_angles() {
            return false;
        }
        match self {
            Pendulum::Single(p) => p.set_angle(angle),
            Pendulum::Double(p) => p.set_angle(index, angle),
        }
        true
    }

    pub fn set_angular_velocity(&mut self, index: usize, angular_velocity: Float) -> bool {
        if index >= self.num_angles() {
            return false;
        }
        match self {
            Pendulum::Single(p) => p.set_angular_velocity(angular_velocity),
            Pendulum::Double(p) => p.set_angular_velocity(index, angular_velocity),
        }
        true
    }

    /// Angle restored by `reset`. Returns false for an index past the last link
    pub fn set_initial_angle(&mut self, index: usize, angle: Float) -> bool {
        if index >= self.num_angles() {
            return false;
        }
        match self {
            Pendulum::Single(p) => p.set_initial_angle(angle),
            Pendulum::Double(p) => p.set_initial_angle(index, angle),
        }
        true
    }

    pub fn gravity(&self) -> Float {
        match self {
            Pendulum::Single(p) => p.gravity(),
            Pendulum::Double(p) => p.gravity(),
        }
    }

    pub fn damping(&self) -> Float {
        match self {
            Pendulum::Single(p) => p.damping(),
            Pendulum::Double(p) => p.damping(),
        }
    }

    pub fn set_gravity(&mut self, gravity: Float) {
        match self {
            Pendulum::Single(p) => p.set_gravity(gravity),
            Pendulum::Double(p) => p.set_gravity(gravity),
        }
    }

    pub fn set_damping(&mut self, damping: Float) {
        match self {
            Pendulum::Single(p) => p.set_damping(damping),
            Pendulum::Double(p) => p.set_damping(damping),
        }
    }

    pub fn kinetic_energy(&self, cart_velocity: Float) -> Float {
        match self {
            Pendulum::Single(p) => single_pendulum_kinetic_energy(p, cart_velocity),
            Pendulum::Double(p) => double_pendulum_kinetic_energy(p, cart_velocity),
        }
    }

    pub fn potential_energy(&self) -> Float {
        match self {
            Pendulum::Single(p) => single_pendulum_potential_energy(p),
            Pendulum::Double(p) => double_pendulum_potential_energy(p),
        }
    }

    /// Kinetic plus potential energy of the pendulum alone
    pub fn total_energy(&self, cart_velocity: Float) -> Float {
        self.kinetic_energy(cart_velocity) + self.potential_energy()
    }
}

impl From<SinglePendulum> for Pendulum {
    fn from(p: SinglePendulum) -> Self {
        Pendulum::Single(p)
    }
}

impl From<DoublePendulum> for Pendulum {
    fn from(p: DoublePendulum) -> Self {
        Pendulum::Double(p)
    }
}
