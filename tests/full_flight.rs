use approx::assert_relative_eq;
use srm_sim::{
    simulate_flight, simulate_motor, ChamberConfig, FlightConfig, FlightEventKind, Grain,
    GrainSegment, Motor, MotorPhase, Propellant, Recovery, Rocket, SimError,
};

// Helper constructors for a small KNSB test motor and vehicle

fn create_test_motor() -> Motor {
    let grain = Grain::new(vec![
        GrainSegment::bates(60e-3, 20e-3, 120e-3, 10e-3, 0).unwrap(),
        GrainSegment::bates(60e-3, 20e-3, 120e-3, 10e-3, 0).unwrap(),
    ])
    .unwrap();
    Motor::builder(Propellant::knsb(), grain)
        .chamber(66e-3, 280e-3)
        .nozzle(12e-3, 6.0)
        .dry_mass(2.0)
        .igniter_pressure(1.0e6)
        .build()
        .unwrap()
}

fn create_test_rocket() -> Rocket {
    Rocket::new(4.0, 0.45, 0.08, 5.0).unwrap()
}

fn create_test_recovery() -> Recovery {
    Recovery::new(1.0, 1.75, 0.9, 2.0, 1.8, 300.0).unwrap()
}

fn chamber_config() -> ChamberConfig {
    ChamberConfig {
        dt: 1e-4,
        ..ChamberConfig::default()
    }
}

#[test]
fn motor_run_feeds_a_complete_flight() {
    let motor = create_test_motor();
    let motor_sim = simulate_motor(&motor, &chamber_config()).unwrap();

    // Motor-side invariants
    assert!(motor_sim.burnout_time() > 0.5);
    let last = motor_sim.samples().last().unwrap();
    assert_eq!(last.phase, MotorPhase::Burnout);
    assert_eq!(last.thrust, 0.0);
    assert_eq!(last.mass_flow, 0.0);
    for s in motor_sim.samples() {
        assert!(s.chamber_pressure >= 101_325.0 * (1.0 - 1e-6));
        assert!(s.chamber_pressure <= 15.0e6);
    }

    // Flight consumes the motor series as forcing function
    let flight = simulate_flight(
        &motor_sim,
        &create_test_rocket(),
        &create_test_recovery(),
        &FlightConfig::default(),
    )
    .unwrap();

    assert!(flight.apogee() > 300.0, "apogee = {} m", flight.apogee());
    assert!(flight.flight_time() > flight.apogee_time());
    assert_eq!(flight.samples().last().unwrap().altitude, 0.0);
}

#[test]
fn event_sequence_matches_flight_phases() {
    let motor_sim = simulate_motor(&create_test_motor(), &chamber_config()).unwrap();
    let recovery = create_test_recovery();
    let flight = simulate_flight(
        &motor_sim,
        &create_test_rocket(),
        &recovery,
        &FlightConfig::default(),
    )
    .unwrap();

    let kinds: Vec<_> = flight
        .events()
        .iter()
        .map(|e| std::mem::discriminant(&e.kind))
        .collect();
    let expected = [
        std::mem::discriminant(&FlightEventKind::RailExit { velocity: 0.0 }),
        std::mem::discriminant(&FlightEventKind::Burnout {
            altitude: 0.0,
            velocity: 0.0,
        }),
        std::mem::discriminant(&FlightEventKind::Apogee { altitude: 0.0 }),
        std::mem::discriminant(&FlightEventKind::DrogueDeploy),
        std::mem::discriminant(&FlightEventKind::MainDeploy { altitude: 0.0 }),
        std::mem::discriminant(&FlightEventKind::Touchdown { velocity: 0.0 }),
    ];
    assert_eq!(kinds, expected, "events: {:?}", flight.events());

    // Drogue delay honored to within an integration step
    let drogue = flight.drogue_deploy_time().unwrap();
    assert_relative_eq!(
        drogue,
        flight.apogee_time() + recovery.drogue_delay(),
        epsilon = 0.01
    );

    // Burnout event sits at the motor's burnout time
    let burnout = flight
        .events()
        .iter()
        .find(|e| matches!(e.kind, FlightEventKind::Burnout { .. }))
        .unwrap();
    assert_relative_eq!(burnout.time, motor_sim.burnout_time(), epsilon = 1e-9);
}

#[test]
fn rail_exit_velocity_is_recorded() {
    let motor_sim = simulate_motor(&create_test_motor(), &chamber_config()).unwrap();
    let rocket = create_test_rocket();
    let flight = simulate_flight(
        &motor_sim,
        &rocket,
        &create_test_recovery(),
        &FlightConfig::default(),
    )
    .unwrap();

    let v_rail = flight.rail_exit_velocity().unwrap();
    assert!(v_rail > 5.0, "rail exit velocity = {} m/s", v_rail);
    assert!(v_rail < flight.max_velocity());
}

#[test]
fn identical_configurations_reproduce_identical_series() {
    let motor = create_test_motor();
    let a = simulate_motor(&motor, &chamber_config()).unwrap();
    let b = simulate_motor(&motor, &chamber_config()).unwrap();
    assert_eq!(a.samples().len(), b.samples().len());
    for (x, y) in a.samples().iter().zip(b.samples()) {
        assert_eq!(x.chamber_pressure, y.chamber_pressure);
        assert_eq!(x.thrust, y.thrust);
    }

    let fa = simulate_flight(
        &a,
        &create_test_rocket(),
        &create_test_recovery(),
        &FlightConfig::default(),
    )
    .unwrap();
    let fb = simulate_flight(
        &b,
        &create_test_rocket(),
        &create_test_recovery(),
        &FlightConfig::default(),
    )
    .unwrap();
    assert_eq!(fa.samples().len(), fb.samples().len());
    for (x, y) in fa.samples().iter().zip(fb.samples()) {
        assert_eq!(x.altitude, y.altitude);
        assert_eq!(x.velocity, y.velocity);
    }
}

#[test]
fn invalid_configurations_fail_at_construction() {
    assert!(matches!(
        GrainSegment::bates(60e-3, 20e-3, 120e-3, 10e-3, 3),
        Err(SimError::Config { parameter: "inhibited_ends", .. })
    ));
    assert!(matches!(
        GrainSegment::d_slot(100e-3, 55e-3, 120e-3, 10e-3, 0),
        Err(SimError::Config { parameter: "slot_offset", .. })
    ));
    assert!(matches!(
        Rocket::new(-1.0, 0.45, 0.08, 5.0),
        Err(SimError::Config { .. })
    ));
    assert!(matches!(
        Recovery::new(1.0, 1.75, 0.9, 2.0, -1.8, 300.0),
        Err(SimError::Config { .. })
    ));
}
