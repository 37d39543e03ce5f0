use wasm_bindgen::prelude::*;
use web_sys::js_sys::Float32Array;

use crate::{
    flog,
    params::SimulationParams,
    pendulum::PendulumKind,
    simulate::Simulation,
    toJsFloat32Array,
    types::Float,
};

pub mod util;

/// WebAssembly interface to the cart and pendulum simulation.
#[wasm_bindgen]
pub struct InterfaceSimulation {
    pub(crate) inner: Simulation,
}

#[wasm_bindgen]
impl InterfaceSimulation {
    /// Advance one frame with the given applied cart acceleration.
    /// Returns [position, velocity, angles..., angular velocities...].
    pub fn step(&mut self, dt: Float, applied_acceleration: Float) -> Float32Array {
        self.inner.set_dt(dt);
        self.inner.step(applied_acceleration);
        toJsFloat32Array!(self.state())
    }

    /// Same layout as returned by step, without advancing.
    pub fn current(&self) -> Float32Array {
        toJsFloat32Array!(self.state())
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn togglePendulum(&mut self) {
        self.inner.toggle_pendulum();
    }

    pub fn isSingle(&self) -> bool {
        self.inner.kind() == PendulumKind::Single
    }

    pub fn numAngles(&self) -> usize {
        self.inner.pendulum().num_angles()
    }

    pub fn setGravity(&mut self, gravity: Float) {
        self.inner.set_gravity(gravity);
    }

    pub fn setDamping(&mut self, damping: Float) {
        self.inner.set_damping(damping);
    }

    pub fn setFriction(&mut self, friction: Float) {
        self.inner.set_friction(friction);
    }

    pub fn setCartMass(&mut self, mass: Float) {
        self.inner.set_cart_mass(mass);
    }

    pub fn setRailLength(&mut self, rail_length: Float) {
        self.inner.set_rail_length(rail_length);
    }

    pub fn setWrap(&mut self, enabled: bool) {
        self.inner.set_wrap_enabled(enabled);
    }

    /// Set the current and reset angle of one link. Ignored if out of range.
    pub fn setAngle(&mut self, index: usize, angle: Float) {
        let pendulum = self.inner.pendulum_mut();
        if !(pendulum.set_initial_angle(index, angle) && pendulum.set_angle(index, angle)) {
            flog!("No pendulum link at index {}", index);
        }
    }

    pub fn kineticEnergy(&self) -> Float {
        self.inner.kinetic_energy()
    }

    pub fn potentialEnergy(&self) -> Float {
        self.inner.potential_energy()
    }

    pub fn totalEnergy(&self) -> Float {
        self.inner.total_energy()
    }

    pub fn time(&self) -> Float {
        self.inner.time()
    }
}

impl InterfaceSimulation {
    fn state(&self) -> Vec<Float> {
        let cart = self.inner.cart();
        let pendulum = self.inner.pendulum();
        let n = pendulum.num_angles();

        let mut q = vec![cart.position(), cart.velocity()];
        q.extend((0..n).filter_map(|i| pendulum.angle(i)));
        q.extend((0..n).filter_map(|i| pendulum.angular_velocity(i)));
        q
    }
}

/// Cart of 1 kg on a 4 m rail, with a 0.3 kg, 1 m pendulum hanging at rest.
#[wasm_bindgen]
pub fn createSimulation() -> InterfaceSimulation {
    console_error_panic_hook::set_once();
    InterfaceSimulation {
        inner: Simulation::new(SimulationParams::default()),
    }
}

#[wasm_bindgen]
pub fn createSimulationWith(
    cart_mass: Float,
    rail_length: Float,
    pendulum_mass: Float,
    pendulum_length: Float,
) -> InterfaceSimulation {
    console_error_panic_hook::set_once();
    let params = SimulationParams::default()
        .with_cart(cart_mass, rail_length)
        .with_single_pendulum(pendulum_mass, pendulum_length);
    InterfaceSimulation {
        inner: Simulation::new(params),
    }
}
