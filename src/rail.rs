use na::DVector;

use crate::{integrators::DormandPrince87, types::Float};

/// Point mass (the cart) sliding along a straight rail of finite length,
/// centered on the origin.
///
/// With wrapping disabled the body is stopped at either end of the rail.
/// With wrapping enabled it leaves through one end and re-enters through
/// the other.
///
/// Preconditions: `mass > 0`, `rail_length > 0`. Neither is checked.
#[derive(Debug, Clone)]
pub struct RailBody {
    mass: Float,
    rail_length: Float,
    position: Float,
    velocity: Float,
    wrap_enabled: bool,
    blocked: bool,
    state: DVector<Float>, // [position, velocity] scratch for the integrator
    integrator: DormandPrince87,
}

impl RailBody {
    /// Create a body at rest in the middle of the rail
    pub fn new(mass: Float, rail_length: Float) -> Self {
        RailBody {
            mass,
            rail_length,
            position: 0.0,
            velocity: 0.0,
            wrap_enabled: false,
            blocked: false,
            state: DVector::zeros(2),
            integrator: DormandPrince87::new(),
        }
    }

    /// Advance the body by dt under the applied acceleration and viscous
    /// friction, then enforce the rail ends.
    ///
    /// Returns the effective acceleration: the requested one, or exactly 0.0
    /// if the body is stopped at a rail end and the request pushes further
    /// outward. This is what an attached pendulum should be driven with.
    pub fn update(&mut self, dt: Float, applied_acceleration: Float, friction: Float) -> Float {
        self.state[0] = self.position;
        self.state[1] = self.velocity;
        self.integrator.step_fixed(
            0.0,
            &mut self.state,
            |_t, x, dxdt| {
                dxdt[0] = x[1];
                dxdt[1] = applied_acceleration - friction * x[1];
            },
            dt,
        );
        self.position = self.state[0];
        self.velocity = self.state[1];

        let half_rail = self.half_rail();
        self.blocked = false;
        if self.wrap_enabled {
            // Far out of range one rail length is below the ulp, so reduce first
            if self.position.abs() > half_rail + self.rail_length {
                self.position =
                    (self.position + half_rail).rem_euclid(self.rail_length) - half_rail;
            }
            while self.position > half_rail {
                self.position -= self.rail_length;
            }
            while self.position < -half_rail {
                self.position += self.rail_length;
            }
        } else if self.position < -half_rail {
            self.position = -half_rail;
            self.velocity = 0.0;
            self.blocked = true;
        } else if self.position > half_rail {
            self.position = half_rail;
            self.velocity = 0.0;
            self.blocked = true;
        }

        if self.blocked
            && ((self.position <= -half_rail && applied_acceleration < 0.0)
                || (self.position >= half_rail && applied_acceleration > 0.0))
        {
            return 0.0;
        }
        applied_acceleration
    }

    /// Back to the middle of the rail, at rest
    pub fn reset(&mut self) {
        self.position = 0.0;
        self.velocity = 0.0;
        self.blocked = false;
    }

    pub fn half_rail(&self) -> Float {
        self.rail_length / 2.0
    }

    pub fn position(&self) -> Float {
        self.position
    }

    pub fn velocity(&self) -> Float {
        self.velocity
    }

    pub fn mass(&self) -> Float {
        self.mass
    }

    pub fn rail_length(&self) -> Float {
        self.rail_length
    }

    pub fn is_wrap_enabled(&self) -> bool {
        self.wrap_enabled
    }

    /// Whether the last update stopped the body at a rail end
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn set_position(&mut self, position: Float) {
        self.position = position;
    }

    pub fn set_velocity(&mut self, velocity: Float) {
        self.velocity = velocity;
    }

    /// Takes effect from the next update on
    pub fn set_mass(&mut self, mass: Float) {
        self.mass = mass;
    }

    /// Takes effect from the next update on; the current position is not
    /// re-clamped.
    pub fn set_rail_length(&mut self, rail_length: Float) {
        self.rail_length = rail_length;
    }

    pub fn set_wrap_enabled(&mut self, enabled: bool) {
        self.wrap_enabled = enabled;
    }
}

#[cfg(test)]
mod rail_tests {
    use crate::util::assert_close;

    use super::*;

    #[test]
    fn constant_acceleration_from_rest() {
        // Arrange
        let mut cart = RailBody::new(1.0, 100.0);
        let a = 2.0;

        // Act
        let dt = 1.0 / 60.0;
        let n = 60;
        for _ in 0..n {
            let effective = cart.update(dt, a, 0.0);
            assert_eq!(effective, a);
        }

        // Assert
        let t = n as Float * dt;
        assert_close(cart.position(), 0.5 * a * t * t, 1e-10);
        assert_close(cart.velocity(), a * t, 1e-10);
        assert!(!cart.is_blocked());
    }

    #[test]
    fn friction_decays_velocity() {
        let mut cart = RailBody::new(1.0, 100.0);
        cart.set_velocity(3.0);

        let friction = 0.5;
        let dt = 1.0 / 144.0;
        let n = 144;
        for _ in 0..n {
            cart.update(dt, 0.0, friction);
        }

        // v(t) = v0 exp(-kt), x(t) = v0 (1 - exp(-kt)) / k
        let t = n as Float * dt;
        let decay = (-friction * t).exp();
        assert_close(cart.velocity(), 3.0 * decay, 1e-10);
        assert_close(cart.position(), 3.0 * (1.0 - decay) / friction, 1e-10);
    }

    #[test]
    fn clamp_at_right_end() {
        // Arrange
        let mut cart = RailBody::new(1.0, 4.0);
        cart.set_position(1.99);
        cart.set_velocity(5.0);

        // Act
        let effective = cart.update(1.0 / 60.0, 1.0, 0.0);

        // Assert
        assert_eq!(cart.position(), 2.0);
        assert_eq!(cart.velocity(), 0.0);
        assert!(cart.is_blocked());
        assert_eq!(effective, 0.0);
    }

    #[test]
    fn clamp_is_idempotent_while_pushing_outward() {
        let mut cart = RailBody::new(1.0, 4.0);
        cart.set_position(cart.half_rail());

        for _ in 0..100 {
            let effective = cart.update(1.0 / 60.0, 10.0, 0.1);
            assert_eq!(cart.position(), 2.0);
            assert_eq!(cart.velocity(), 0.0);
            assert_eq!(effective, 0.0);
        }
    }

    #[test]
    fn clamp_at_left_end() {
        let mut cart = RailBody::new(1.0, 4.0);
        cart.set_position(-cart.half_rail());

        let effective = cart.update(1.0 / 60.0, -3.0, 0.0);

        assert_eq!(cart.position(), -2.0);
        assert_eq!(cart.velocity(), 0.0);
        assert_eq!(effective, 0.0);
    }

    #[test]
    fn blocked_but_pulling_inward_passes_request_through() {
        // Body slams into the right end while the request already points back
        let mut cart = RailBody::new(1.0, 4.0);
        cart.set_position(1.999);
        cart.set_velocity(10.0);

        let effective = cart.update(1.0 / 60.0, -1.0, 0.0);

        assert!(cart.is_blocked());
        assert_eq!(cart.position(), 2.0);
        assert_eq!(effective, -1.0);
    }

    #[test]
    fn inward_push_leaves_the_end() {
        let mut cart = RailBody::new(1.0, 4.0);
        cart.set_position(2.0);

        let effective = cart.update(1.0 / 60.0, -1.0, 0.0);

        assert_eq!(effective, -1.0);
        assert!(cart.position() < 2.0);
        assert!(cart.velocity() < 0.0);
        assert!(!cart.is_blocked());
    }

    #[test]
    fn wrap_never_blocks() {
        let mut cart = RailBody::new(1.0, 4.0);
        cart.set_wrap_enabled(true);
        cart.set_position(1.99);
        cart.set_velocity(5.0);

        let dt = 1.0 / 60.0;
        let effective = cart.update(dt, 1.0, 0.0);

        assert_eq!(effective, 1.0);
        assert!(!cart.is_blocked());
        assert!(cart.velocity() > 5.0);
        assert!(cart.position() < 0.0 && cart.position() >= -2.0);
    }

    #[test]
    fn wrap_round_trip() {
        // Arrange
        let mut cart = RailBody::new(1.0, 4.0);
        cart.set_wrap_enabled(true);
        let start = 0.5;
        cart.set_position(start);
        cart.set_velocity(1.0);

        // Act: 4 m of net displacement at 1 m/s
        let dt = 1.0 / 64.0;
        for _ in 0..256 {
            cart.update(dt, 0.0, 0.0);
            assert!(cart.position() >= -2.0 && cart.position() <= 2.0);
        }

        // Assert
        assert_close(cart.position(), start, 1e-9);
        assert_close(cart.velocity(), 1.0, 1e-12);
    }

    #[test]
    fn wrap_handles_multiple_rail_lengths_in_one_tick() {
        let mut cart = RailBody::new(1.0, 1.0);
        cart.set_wrap_enabled(true);
        cart.set_velocity(240.0);

        cart.update(0.01, 0.0, 0.0); // 2.4 m on a 1 m rail

        assert_close(cart.position(), 0.4, 1e-9);
    }

    #[test]
    fn update_reuses_integrator_buffers() {
        let mut cart = RailBody::new(1.0, 100.0);

        for _ in 0..3 {
            cart.update(1.0 / 60.0, 1.0, 0.1);
        }

        assert_eq!(cart.state.len(), 2);
        assert_eq!(cart.integrator.workspace_len(), 2);
        assert_eq!(cart.integrator.stats().accepted, 3);
    }

    #[test]
    fn wrap_reduces_huge_positions() {
        // Arrange
        let mut cart = RailBody::new(1.0, 4.0);
        cart.set_wrap_enabled(true);

        for position in [1e20, -1e20, 7.3e15] {
            cart.set_position(position);

            // Act
            let effective = cart.update(1.0 / 60.0, 1.0, 0.0);

            // Assert
            assert!(cart.position() >= -2.0 && cart.position() <= 2.0);
            assert_eq!(effective, 1.0);
            assert!(!cart.is_blocked());
        }
    }

    #[test]
    fn reset_centers_the_body() {
        let mut cart = RailBody::new(2.0, 4.0);
        cart.set_position(2.0);
        cart.update(1.0 / 60.0, 5.0, 0.0);

        cart.reset();

        assert_eq!(cart.position(), 0.0);
        assert_eq!(cart.velocity(), 0.0);
        assert!(!cart.is_blocked());
        assert_eq!(cart.mass(), 2.0);
    }
}
