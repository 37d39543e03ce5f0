use cart_pendulum::plot::plot;
use cart_pendulum::{params::SimulationParams, simulate::Simulation, types::Float};

/// Push the cart to the right until it hits the end of the rail, then pull it
/// back. The pendulum only feels the push while the cart is free to move.
///
///              |
///         _____|_____
///   |----|_____o_____|----------------|
///                 \
///                  o
pub fn main() {
    let params = SimulationParams::default().with_cart(1.0, 4.0);
    let dt = params.dt;
    let mut sim = Simulation::new(params);

    let mut positions: Vec<Float> = vec![];
    let mut effective: Vec<Float> = vec![];
    let mut angles: Vec<Float> = vec![];

    let final_time = 6.0;
    while sim.time() < final_time {
        let applied = if sim.time() < 3.0 { 2.0 } else { -2.0 };
        effective.push(sim.step(applied));
        positions.push(sim.cart().position());
        angles.push(sim.pendulum().angle(0).unwrap_or_default());
    }

    plot(
        &[
            ("cart position [m]", positions),
            ("effective acceleration [m/s²]", effective),
            ("pendulum angle [rad]", angles),
        ],
        dt,
        "Cart on a clamped rail",
        "cart",
    )
    .expect("Unable to write the plot");
}
