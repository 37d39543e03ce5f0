use crate::{
    double_pendulum::DoublePendulum,
    flog,
    params::SimulationParams,
    pendulum::{Pendulum, PendulumKind},
    rail::RailBody,
    single_pendulum::SinglePendulum,
    types::Float,
};

/// A cart on its rail with both pendulum variants, one of which is hanging
/// from the cart at any time.
///
/// The inactive pendulum keeps its state and resumes from it when toggled
/// back in.
#[derive(Debug, Clone)]
pub struct Simulation {
    params: SimulationParams,
    cart: RailBody,
    single: Pendulum,
    double: Pendulum,
    active: PendulumKind,
    time: Float,
}

impl Simulation {
    pub fn new(params: SimulationParams) -> Self {
        let mut cart = RailBody::new(params.cart_mass, params.rail_length);
        cart.set_wrap_enabled(params.wrap_enabled);

        let single = SinglePendulum::new(params.single_mass, params.single_length);
        let double = DoublePendulum::new(
            params.double_masses[0],
            params.double_lengths[0],
            params.double_masses[1],
            params.double_lengths[1],
        );

        let mut sim = Simulation {
            active: params.initial_kind,
            params,
            cart,
            single: single.into(),
            double: double.into(),
            time: 0.0,
        };
        sim.sync_pendulum_params();
        sim
    }

    fn sync_pendulum_params(&mut self) {
        let (gravity, damping) = (self.params.gravity, self.params.damping);
        for pendulum in [&mut self.single, &mut self.double] {
            pendulum.set_gravity(gravity);
            pendulum.set_damping(damping);
        }
    }

    /// Advance one frame: the cart first, then the active pendulum driven by
    /// the acceleration the cart actually transmitted.
    ///
    /// Returns that effective acceleration.
    pub fn step(&mut self, applied_acceleration: Float) -> Float {
        let dt = self.params.dt;
        let effective = self
            .cart
            .update(dt, applied_acceleration, self.params.friction);
        self.pendulum_mut().update(dt, effective);
        self.time += dt;
        effective
    }

    /// Same as [`Simulation::step`], with the input given as a force on the
    /// cart.
    pub fn step_with_force(&mut self, force: Float) -> Float {
        let applied_acceleration = force / self.cart.mass();
        self.step(applied_acceleration)
    }

    pub fn toggle_pendulum(&mut self) {
        self.active = self.active.toggled();
        flog!("Switched to {:?} pendulum", self.active);
    }

    /// Cart back to the middle, both pendulums back to their initial angles,
    /// clock back to zero.
    pub fn reset(&mut self) {
        self.cart.reset();
        self.single.reset();
        self.double.reset();
        self.time = 0.0;
        flog!("Simulation reset");
    }

    pub fn kind(&self) -> PendulumKind {
        self.active
    }

    pub fn time(&self) -> Float {
        self.time
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn cart(&self) -> &RailBody {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut RailBody {
        &mut self.cart
    }

    /// The pendulum currently hanging from the cart
    pub fn pendulum(&self) -> &Pendulum {
        match self.active {
            PendulumKind::Single => &self.single,
            PendulumKind::Double => &self.double,
        }
    }

    pub fn pendulum_mut(&mut self) -> &mut Pendulum {
        match self.active {
            PendulumKind::Single => &mut self.single,
            PendulumKind::Double => &mut self.double,
        }
    }

    pub fn kinetic_energy(&self) -> Float {
        self.pendulum().kinetic_energy(self.cart.velocity())
    }

    pub fn potential_energy(&self) -> Float {
        self.pendulum().potential_energy()
    }

    pub fn total_energy(&self) -> Float {
        self.pendulum().total_energy(self.cart.velocity())
    }

    pub fn set_dt(&mut self, dt: Float) {
        self.params.dt = dt;
    }

    pub fn set_gravity(&mut self, gravity: Float) {
        self.params.gravity = gravity;
        self.sync_pendulum_params();
    }

    pub fn set_damping(&mut self, damping: Float) {
        self.params.damping = damping;
        self.sync_pendulum_params();
    }

    pub fn set_friction(&mut self, friction: Float) {
        self.params.friction = friction;
    }

    pub fn set_cart_mass(&mut self, mass: Float) {
        self.params.cart_mass = mass;
        self.cart.set_mass(mass);
    }

    pub fn set_rail_length(&mut self, rail_length: Float) {
        self.params.rail_length = rail_length;
        self.cart.set_rail_length(rail_length);
    }

    pub fn set_wrap_enabled(&mut self, enabled: bool) {
        self.params.wrap_enabled = enabled;
        self.cart.set_wrap_enabled(enabled);
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Simulation::new(SimulationParams::default())
    }
}

/// State of a simulation at one instant, as consumed by plots and renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub time: Float,
    pub position: Float,
    pub velocity: Float,
    pub angles: Vec<Float>,
    pub angular_velocities: Vec<Float>,
    pub energy: Float,
}

impl Snapshot {
    pub fn of(sim: &Simulation) -> Self {
        let pendulum = sim.pendulum();
        let n = pendulum.num_angles();
        Snapshot {
            time: sim.time(),
            position: sim.cart().position(),
            velocity: sim.cart().velocity(),
            angles: (0..n).filter_map(|i| pendulum.angle(i)).collect(),
            angular_velocities: (0..n).filter_map(|i| pendulum.angular_velocity(i)).collect(),
            energy: sim.total_energy(),
        }
    }
}

/// Run the simulation from its current state until final_time, asking
/// `control_fn` for the applied cart acceleration every frame.
/// Returns the initial snapshot followed by one snapshot per frame.
pub fn simulate(
    sim: &mut Simulation,
    final_time: Float,
    control_fn: fn(&Simulation) -> Float,
) -> Vec<Snapshot> {
    let mut snapshots = vec![Snapshot::of(sim)];
    while sim.time() < final_time {
        let applied_acceleration = control_fn(sim);
        sim.step(applied_acceleration);
        snapshots.push(Snapshot::of(sim));
    }
    snapshots
}
