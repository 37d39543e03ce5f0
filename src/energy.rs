use crate::{double_pendulum::DoublePendulum, single_pendulum::SinglePendulum, types::Float};

/// Kinetic energy of a single pendulum whose pivot moves with
/// `cart_velocity`.
///
/// Bob position x = x_cart + L sin θ, y = -L cos θ, differentiated in time.
pub fn single_pendulum_kinetic_energy(pendulum: &SinglePendulum, cart_velocity: Float) -> Float {
    let l = pendulum.length();
    let theta = pendulum.angle();
    let omega = pendulum.angular_velocity();

    let xdot = cart_velocity + l * theta.cos() * omega;
    let ydot = l * theta.sin() * omega;
    0.5 * pendulum.mass() * (xdot * xdot + ydot * ydot)
}

/// Gravitational potential energy of a single pendulum, zero when hanging
/// straight down.
pub fn single_pendulum_potential_energy(pendulum: &SinglePendulum) -> Float {
    pendulum.mass() * pendulum.gravity() * pendulum.length() * (1.0 - pendulum.angle().cos())
}

/// Compute single pendulum total energy
pub fn single_pendulum_energy(pendulum: &SinglePendulum, cart_velocity: Float) -> Float {
    single_pendulum_kinetic_energy(pendulum, cart_velocity)
        + single_pendulum_potential_energy(pendulum)
}

/// Kinetic energy of a double pendulum whose pivot moves with
/// `cart_velocity`.
///
/// ```text
/// x1 = x_cart + L1 sin θ1,  y1 = -L1 cos θ1
/// x2 = x1 + L2 sin θ2,      y2 = y1 - L2 cos θ2
/// ```
pub fn double_pendulum_kinetic_energy(pendulum: &DoublePendulum, cart_velocity: Float) -> Float {
    let p = pendulum.params();
    let (t1, t2) = angles(pendulum);
    let (w1, w2) = angular_velocities(pendulum);

    let x1dot = cart_velocity + p.l1 * t1.cos() * w1;
    let y1dot = p.l1 * t1.sin() * w1;
    let x2dot = x1dot + p.l2 * t2.cos() * w2;
    let y2dot = y1dot + p.l2 * t2.sin() * w2;

    let ke1 = 0.5 * p.m1 * (x1dot * x1dot + y1dot * y1dot);
    let ke2 = 0.5 * p.m2 * (x2dot * x2dot + y2dot * y2dot);
    ke1 + ke2
}

/// Gravitational potential energy of a double pendulum, zero with both links
/// hanging straight down. The second bob also drops with the first link.
pub fn double_pendulum_potential_energy(pendulum: &DoublePendulum) -> Float {
    let p = pendulum.params();
    let (t1, t2) = angles(pendulum);

    let h1 = p.l1 * (1.0 - t1.cos());
    let h2 = h1 + p.l2 * (1.0 - t2.cos());
    p.m1 * p.gravity * h1 + p.m2 * p.gravity * h2
}

/// Compute double pendulum total energy
pub fn double_pendulum_energy(pendulum: &DoublePendulum, cart_velocity: Float) -> Float {
    double_pendulum_kinetic_energy(pendulum, cart_velocity)
        + double_pendulum_potential_energy(pendulum)
}

fn angles(pendulum: &DoublePendulum) -> (Float, Float) {
    (
        pendulum.angle(0).unwrap_or_default(),
        pendulum.angle(1).unwrap_or_default(),
    )
}

fn angular_velocities(pendulum: &DoublePendulum) -> (Float, Float) {
    (
        pendulum.angular_velocity(0).unwrap_or_default(),
        pendulum.angular_velocity(1).unwrap_or_default(),
    )
}

#[cfg(test)]
mod energy_tests {
    use crate::{util::assert_close, GRAVITY, PI};

    use super::*;

    #[test]
    fn hanging_at_rest_has_no_energy() {
        let single = SinglePendulum::new(2.0, 3.0);
        let double = DoublePendulum::new(1.0, 2.0, 3.0, 4.0);

        assert_eq!(single_pendulum_energy(&single, 0.0), 0.0);
        assert_eq!(double_pendulum_energy(&double, 0.0), 0.0);
    }

    #[test]
    fn single_pendulum_horizontal() {
        let mut pendulum = SinglePendulum::new(2.0, 3.0);
        pendulum.set_angle(PI / 2.0);

        assert_close(single_pendulum_potential_energy(&pendulum), 2.0 * GRAVITY * 3.0, 1e-12);
        assert_eq!(single_pendulum_kinetic_energy(&pendulum, 0.0), 0.0);
    }

    #[test]
    fn single_pendulum_upright() {
        let mut pendulum = SinglePendulum::new(1.0, 1.0);
        pendulum.set_angle(PI);

        assert_close(single_pendulum_potential_energy(&pendulum), 2.0 * GRAVITY, 1e-12);
    }

    #[test]
    fn single_pendulum_swinging_through_bottom() {
        // Bob speed L ω adds to the cart velocity at the bottom
        let mut pendulum = SinglePendulum::new(2.0, 0.5);
        pendulum.set_angular_velocity(4.0);

        assert_close(single_pendulum_kinetic_energy(&pendulum, 0.0), 0.5 * 2.0 * 4.0, 1e-12);
        assert_close(single_pendulum_kinetic_energy(&pendulum, 1.0), 0.5 * 2.0 * 9.0, 1e-12);
        assert_close(single_pendulum_kinetic_energy(&pendulum, -2.0), 0.0, 1e-12);
    }

    #[test]
    fn double_pendulum_rigid_translation() {
        // Links at rest on a moving cart: ½ (m1 + m2) v²
        let mut pendulum = DoublePendulum::new(1.0, 1.0, 3.0, 2.0);
        pendulum.set_angle(0, 0.4);
        pendulum.set_angle(1, -1.1);

        assert_close(double_pendulum_kinetic_energy(&pendulum, 2.0), 0.5 * 4.0 * 4.0, 1e-12);
    }

    #[test]
    fn double_pendulum_potential_accumulates_along_chain() {
        // Arrange: first link horizontal, second link hanging down
        let mut pendulum = DoublePendulum::new(1.0, 2.0, 3.0, 4.0);
        pendulum.set_angle(0, PI / 2.0);

        // Act
        let pe = double_pendulum_potential_energy(&pendulum);

        // Assert: both bobs are raised by L1
        assert_close(pe, (1.0 + 3.0) * GRAVITY * 2.0, 1e-12);

        pendulum.set_angle(1, PI);
        let pe = double_pendulum_potential_energy(&pendulum);
        assert_close(pe, 1.0 * GRAVITY * 2.0 + 3.0 * GRAVITY * (2.0 + 8.0), 1e-12);
    }

    #[test]
    fn double_pendulum_kinetic_energy_straight_chain() {
        // Both links hanging down, rotating together: bob speeds L1 ω and (L1 + L2) ω
        let mut pendulum = DoublePendulum::new(1.0, 1.0, 2.0, 2.0);
        pendulum.set_angular_velocity(0, 1.5);
        pendulum.set_angular_velocity(1, 1.5);

        let expected = 0.5 * 1.0 * (1.5 * 1.5) + 0.5 * 2.0 * (4.5 * 4.5);
        assert_close(double_pendulum_kinetic_energy(&pendulum, 0.0), expected, 1e-12);
    }
}
