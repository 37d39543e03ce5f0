use cart_pendulum::{
    params::SimulationParams, pendulum::PendulumKind, plot::plot, simulate::simulate,
    simulate::Simulation, types::Float, PI,
};

/// Run an undamped double pendulum released from a high, bent configuration
/// on a cart that is shaken back and forth, and plot both link angles.
pub fn main() {
    let params = SimulationParams::default()
        .with_dt(1.0 / 144.0)
        .with_damping(0.0)
        .with_wrap(true)
        .with_initial_kind(PendulumKind::Double);
    let dt = params.dt;
    let mut sim = Simulation::new(params);
    sim.pendulum_mut().set_angle(0, PI / 2.0);
    sim.pendulum_mut().set_angle(1, 3.0 * PI / 4.0);

    let snapshots = simulate(&mut sim, 20.0, |sim| 3.0 * (2.0 * sim.time()).sin());

    let theta1: Vec<Float> = snapshots.iter().map(|s| s.angles[0]).collect();
    let theta2: Vec<Float> = snapshots.iter().map(|s| s.angles[1]).collect();

    plot(
        &[("θ1", theta1), ("θ2", theta2)],
        dt,
        "Double pendulum on a shaken cart",
        "double_pendulum",
    )
    .expect("Unable to write the plot");
}
