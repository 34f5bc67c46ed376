use rand::{rngs::StdRng, SeedableRng};
use software_in_loop::SimulatedFlight;

fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);
    let mut rng = StdRng::seed_from_u64(seed);

    println!("Simulated flight, seed {}", seed);

    let mut flight = SimulatedFlight::new();
    let report = flight.run_to_landing(&mut rng, 1_000, 0.03, 0.02);

    println!();
    println!("cycles:          {}", report.cycles);
    println!("lost to faults:  {}", report.failed_cycles);
    println!("records written: {}", report.records_written);
    println!("pyro firings:    {}", report.deploys);
    println!("final mode:      {:?}", report.final_mode);
    println!("radio sentences: {}", flight.radio.sent_count);
    println!("sms messages:    {}", flight.cellular.sent_count);

    if report.final_mode != Some(shared::FlightMode::Landed) {
        println!("Flight did not land within the cycle budget");
        std::process::exit(1);
    }
    if report.deploys == 0 {
        println!("Flight landed without ever firing the pyro");
        std::process::exit(1);
    }
}
