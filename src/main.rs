use srm_sim::{
    simulate_flight, simulate_motor, ChamberConfig, FlightConfig, FlightEventKind, Grain,
    GrainSegment, Motor, Propellant, Recovery, Rocket, SimError,
};

fn main() -> Result<(), SimError> {
    // -----------------------------------------------------------------------
    // Motor: "SRM5K" class KNSB sounding-rocket motor
    // -----------------------------------------------------------------------
    let segments = (0..7)
        .map(|_| GrainSegment::bates(103e-3, 42e-3, 176e-3, 10e-3, 0))
        .collect::<Result<Vec<_>, _>>()?;
    let grain = Grain::new(segments)?;

    let motor = Motor::builder(Propellant::knsb(), grain)
        .chamber(114.3e-3, 1.30)   // m (casing bore x length)
        .nozzle(28e-3, 8.0)        // throat diameter, expansion ratio
        .dry_mass(13.0)            // kg (casing + nozzle + bulkhead)
        .igniter_pressure(1.0e6)   // Pa
        .build()?;

    let rocket = Rocket::new(
        25.0,     // kg, airframe without the motor
        0.5,      // drag coefficient
        141.3e-3, // m, body diameter
        5.0,      // m, launch rail
    )?;

    let recovery = Recovery::new(
        1.5,   // s, drogue delay after apogee
        1.75,  // drogue Cd
        1.25,  // m, drogue diameter
        2.0,   // main Cd
        2.67,  // m, main diameter
        500.0, // m, main activation altitude
    )?;

    // -----------------------------------------------------------------------
    // Run both solvers
    // -----------------------------------------------------------------------
    let motor_sim = simulate_motor(&motor, &ChamberConfig::default())?;
    let flight = simulate_flight(&motor_sim, &rocket, &recovery, &FlightConfig::default())?;

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  SOLID MOTOR FLIGHT SIMULATION — {}", motor.propellant().name());
    println!("====================================================================");
    println!();
    println!("  Motor Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Propellant:    {:>8.2} kg    Motor dry:    {:>8.1} kg",
        motor.initial_propellant_mass(),
        motor.dry_mass()
    );
    println!(
        "  Grain:         {:>8} seg   Throat:       {:>8.1} mm",
        motor.grain().segment_count(),
        motor.throat_diameter() * 1e3
    );
    if let Some(ptt) = motor.initial_port_to_throat() {
        println!(
            "  Exp. ratio:    {:>8.1}       Port/throat:  {:>8.2}",
            motor.expansion_ratio(),
            ptt
        );
    }
    println!();

    println!("  Burn Results");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Max, mean pressure:  {:>7.2}, {:>6.2} MPa",
        motor_sim.max_pressure() * 1e-6,
        motor_sim.mean_pressure() * 1e-6
    );
    println!(
        "  Max thrust:          {:>7.0} N      Burnout:   {:>7.2} s",
        motor_sim.max_thrust(),
        motor_sim.burnout_time()
    );
    println!(
        "  Total impulse:       {:>7.0} N·s    Isp:       {:>7.1} s",
        motor_sim.total_impulse(),
        motor_sim.specific_impulse()
    );
    println!(
        "  Max Kn:              {:>7.1}        Profile:   {:?}",
        motor_sim.max_kn(),
        motor_sim.burn_profile()
    );
    println!();

    println!("  Flight Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    for e in flight.events() {
        match e.kind {
            FlightEventKind::RailExit { velocity } => {
                println!("  RAIL EXIT  t={:>7.2}s   vel={:>7.1} m/s", e.time, velocity)
            }
            FlightEventKind::Burnout { altitude, velocity } => println!(
                "  BURNOUT    t={:>7.2}s   alt={:>7.0} m   vel={:>7.1} m/s",
                e.time, altitude, velocity
            ),
            FlightEventKind::Apogee { altitude } => {
                println!("  APOGEE     t={:>7.2}s   alt={:>7.0} m", e.time, altitude)
            }
            FlightEventKind::DrogueDeploy => {
                println!("  DROGUE     t={:>7.2}s", e.time)
            }
            FlightEventKind::MainDeploy { altitude } => {
                println!("  MAIN       t={:>7.2}s   alt={:>7.0} m", e.time, altitude)
            }
            FlightEventKind::Touchdown { velocity } => {
                println!("  TOUCHDOWN  t={:>7.2}s   vel={:>7.1} m/s", e.time, velocity)
            }
        }
    }
    println!();

    println!("  Performance Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Apogee:        {:>8.0} m     Max speed:   {:>7.1} m/s (Mach {:.2})",
        flight.apogee(),
        flight.max_velocity(),
        flight.max_mach()
    );
    println!(
        "  Max accel:     {:>8.1} m/s^2 Flight time: {:>7.1} s",
        flight.max_acceleration(),
        flight.flight_time()
    );
    println!();

    // -----------------------------------------------------------------------
    // Trajectory table (sampled)
    // -----------------------------------------------------------------------
    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>9}  {:>9}  {:>8}  {:>8}",
        "t (s)", "alt (m)", "vel (m/s)", "Mach", "mass(kg)"
    );
    println!("  {}", "─".repeat(50));

    let samples = flight.samples();
    let sample_interval = (samples.len() / 30).max(1);
    for (i, s) in samples.iter().enumerate() {
        if i % sample_interval != 0 && i != samples.len() - 1 {
            continue;
        }
        println!(
            "  {:>7.2}  {:>9.1}  {:>9.1}  {:>8.3}  {:>8.2}",
            s.time, s.altitude, s.velocity, s.mach, s.vehicle_mass
        );
    }

    println!();
    println!(
        "  Simulation: {} motor steps, {} flight steps",
        motor_sim.samples().len(),
        samples.len()
    );
    println!("====================================================================");
    println!();

    Ok(())
}
