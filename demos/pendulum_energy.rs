use cart_pendulum::{
    params::SimulationParams, plot::plot, simulate::Simulation, types::Float, PI,
};

/// Plot the kinetic, potential and total energy of a damped pendulum released
/// from horizontal, hanging from a cart held in place.
pub fn main() {
    let params = SimulationParams::default()
        .with_dt(1.0 / 144.0)
        .with_friction(0.0)
        .with_single_pendulum(1.0, 1.0);
    let dt = params.dt;
    let mut sim = Simulation::new(params);
    sim.pendulum_mut().set_angle(0, PI / 2.0);

    let mut KEs: Vec<Float> = vec![sim.kinetic_energy()];
    let mut PEs: Vec<Float> = vec![sim.potential_energy()];

    let final_time = 10.0;
    while sim.time() < final_time {
        sim.step(0.0);
        KEs.push(sim.kinetic_energy());
        PEs.push(sim.potential_energy());
    }

    let total: Vec<Float> = KEs.iter().zip(PEs.iter()).map(|(k, p)| k + p).collect();

    plot(
        &[("kinetic", KEs), ("potential", PEs), ("total", total)],
        dt,
        "Pendulum energy vs. time",
        "pendulum_energy",
    )
    .expect("Unable to write the plot");
}
