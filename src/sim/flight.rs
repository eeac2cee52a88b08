use crate::error::SimError;
use crate::physics::atmosphere;
use crate::sim::chamber::MotorSimulation;
use crate::sim::event::{crossing_fraction, lerp, FlightEvent, FlightEventKind};
use crate::vehicle::{Recovery, Rocket};

// ---------------------------------------------------------------------------
// 1-D flight: vertical rigid-body motion under thrust, drag and gravity
// ---------------------------------------------------------------------------
//
//   dv/dt = (T(t) - sign(v) * 0.5*rho*Cd*A*v^2) / m(t) - g(h)
//   dy/dt = v
//
// The motor run supplies thrust and propellant mass as forcing functions up
// to burnout, then the vehicle coasts at dry mass. Thrust, mass, density and
// gravity are evaluated at the step start and held over the RK4 stages; the
// drag Cd*A sum switches as recovery events fire. Events are located inside
// the bracketing step by linear interpolation.

/// One time sample of the flight.
#[derive(Debug, Clone, Copy)]
pub struct FlightSample {
    pub time: f64,              // s
    pub altitude: f64,          // m AGL
    pub velocity: f64,          // m/s, positive up
    pub acceleration: f64,      // m/s^2
    pub mach: f64,              // signed, velocity / local sound speed
    pub external_pressure: f64, // Pa at the sample altitude
    pub vehicle_mass: f64,      // kg
}

/// Solver settings for the flight integration.
#[derive(Debug, Clone)]
pub struct FlightConfig {
    pub dt: f64,               // s
    pub max_time: f64,         // s, divergence guard
    pub launch_elevation: f64, // m AMSL of the launch site
    pub ground_window: f64,    // s a grounded vehicle is held before ending the run
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            dt: 0.01,
            max_time: 600.0,
            launch_elevation: 0.0,
            ground_window: 2.0,
        }
    }
}

/// Frozen output of a flight run.
#[derive(Debug, Clone)]
pub struct FlightSimulation {
    samples: Vec<FlightSample>,
    events: Vec<FlightEvent>,
    launch_elevation: f64,
}

/// Fly a vehicle on the thrust curve of a completed motor run.
pub fn simulate_flight(
    motor_sim: &MotorSimulation,
    rocket: &Rocket,
    recovery: &Recovery,
    config: &FlightConfig,
) -> Result<FlightSimulation, SimError> {
    let dt = config.dt;
    let dry_mass = rocket.mass_without_motor() + motor_sim.motor_dry_mass();
    let burnout_time = motor_sim.burnout_time();

    let mut time = 0.0;
    let mut altitude = 0.0_f64;
    let mut velocity = 0.0_f64;
    let mut atm = atmosphere::sample(config.launch_elevation)?;

    let mut launched = false;
    let mut rail_cleared = false;
    let mut burnout_seen = false;
    let mut apogee_time: Option<f64> = None;
    let mut drogue_out = false;
    let mut main_out = false;
    let mut touched_down = false;

    let capacity = (config.max_time / dt) as usize + 1;
    let mut samples = Vec::with_capacity(capacity.min(200_000));
    let mut events = Vec::new();

    samples.push(FlightSample {
        time,
        altitude,
        velocity,
        acceleration: 0.0,
        mach: 0.0,
        external_pressure: atm.pressure,
        vehicle_mass: dry_mass + motor_sim.propellant_mass_at(0.0),
    });

    while time < config.max_time {
        let thrust = motor_sim.thrust_at(time);
        let mass = dry_mass + motor_sim.propellant_mass_at(time);
        let gravity = atm.gravity;

        let mut cd_area = rocket.cd_area();
        if drogue_out {
            cd_area += recovery.drogue_cd_area();
        }
        if main_out {
            cd_area += recovery.main_cd_area();
        }
        let drag_factor = 0.5 * atm.density * cd_area;

        // RK4 on (altitude, velocity); forces held over the step
        let ode = |v: f64| -> (f64, f64) {
            let drag = v.signum() * drag_factor * v * v;
            (v, (thrust - drag) / mass - gravity)
        };
        let (p1, l1) = ode(velocity);
        let (p2, l2) = ode(velocity + 0.5 * l1 * dt);
        let (p3, l3) = ode(velocity + 0.5 * l2 * dt);
        let (p4, l4) = ode(velocity + l3 * dt);
        let mut new_altitude = altitude + (p1 + 2.0 * (p2 + p3) + p4) * dt / 6.0;
        let mut new_velocity = velocity + (l1 + 2.0 * (l2 + l3) + l4) * dt / 6.0;
        let mut acceleration = (l1 + 2.0 * (l2 + l3) + l4) / 6.0;
        let new_time = time + dt;

        if !new_altitude.is_finite() || !new_velocity.is_finite() {
            return Err(SimError::Numerical {
                time,
                reason: "flight state is no longer finite".into(),
            });
        }

        // Hold the vehicle on the pad while thrust cannot lift it
        if !launched && new_altitude <= 0.0 {
            new_altitude = 0.0;
            new_velocity = 0.0;
            acceleration = 0.0;
        }
        if new_altitude > 0.0 {
            launched = true;
        }

        // --- Event detection, sub-step interpolated ---

        if !rail_cleared && altitude < rocket.rail_length() && new_altitude >= rocket.rail_length()
        {
            let frac = crossing_fraction(altitude, new_altitude, rocket.rail_length());
            events.push(FlightEvent {
                time: lerp(time, new_time, frac),
                kind: FlightEventKind::RailExit {
                    velocity: lerp(velocity, new_velocity, frac),
                },
            });
            rail_cleared = true;
        }

        if !burnout_seen && new_time >= burnout_time {
            let frac = crossing_fraction(time, new_time, burnout_time);
            events.push(FlightEvent {
                time: burnout_time,
                kind: FlightEventKind::Burnout {
                    altitude: lerp(altitude, new_altitude, frac),
                    velocity: lerp(velocity, new_velocity, frac),
                },
            });
            burnout_seen = true;
        }

        if apogee_time.is_none() && launched && velocity > 0.0 && new_velocity <= 0.0 {
            let frac = crossing_fraction(velocity, new_velocity, 0.0);
            let t_apogee = lerp(time, new_time, frac);
            events.push(FlightEvent {
                time: t_apogee,
                kind: FlightEventKind::Apogee {
                    altitude: lerp(altitude, new_altitude, frac),
                },
            });
            apogee_time = Some(t_apogee);
        }

        if let Some(t_apogee) = apogee_time {
            if !drogue_out && new_time >= t_apogee + recovery.drogue_delay() {
                events.push(FlightEvent {
                    time: t_apogee + recovery.drogue_delay(),
                    kind: FlightEventKind::DrogueDeploy,
                });
                drogue_out = true;
            }
        }

        if drogue_out
            && !main_out
            && new_velocity < 0.0
            && new_altitude <= recovery.main_activation_altitude()
        {
            let (t_main, alt_main) = if altitude > recovery.main_activation_altitude() {
                let frac =
                    crossing_fraction(altitude, new_altitude, recovery.main_activation_altitude());
                (lerp(time, new_time, frac), recovery.main_activation_altitude())
            } else {
                (new_time, new_altitude)
            };
            events.push(FlightEvent {
                time: t_main,
                kind: FlightEventKind::MainDeploy { altitude: alt_main },
            });
            main_out = true;
        }

        if launched && altitude > 0.0 && new_altitude <= 0.0 {
            let frac = crossing_fraction(altitude, new_altitude, 0.0);
            let t_touchdown = lerp(time, new_time, frac);
            let v_touchdown = lerp(velocity, new_velocity, frac);
            events.push(FlightEvent {
                time: t_touchdown,
                kind: FlightEventKind::Touchdown {
                    velocity: v_touchdown,
                },
            });
            let ground = atmosphere::sample(config.launch_elevation)?;
            samples.push(FlightSample {
                time: t_touchdown,
                altitude: 0.0,
                velocity: v_touchdown,
                acceleration,
                mach: v_touchdown / ground.sound_speed,
                external_pressure: ground.pressure,
                vehicle_mass: mass,
            });
            touched_down = true;
            break;
        }

        // A vehicle the motor cannot lift never leaves the pad
        if !launched && new_time > burnout_time + config.ground_window {
            touched_down = true;
            break;
        }

        let new_atm = atmosphere::sample(config.launch_elevation + new_altitude)?;
        samples.push(FlightSample {
            time: new_time,
            altitude: new_altitude,
            velocity: new_velocity,
            acceleration,
            mach: new_velocity / new_atm.sound_speed,
            external_pressure: new_atm.pressure,
            vehicle_mass: mass,
        });

        time = new_time;
        altitude = new_altitude;
        velocity = new_velocity;
        atm = new_atm;
    }

    if !touched_down {
        return Err(SimError::Numerical {
            time,
            reason: "vehicle did not return to ground within max_time".into(),
        });
    }

    Ok(FlightSimulation {
        samples,
        events,
        launch_elevation: config.launch_elevation,
    })
}

impl FlightSimulation {
    pub fn samples(&self) -> &[FlightSample] { &self.samples }
    pub fn events(&self) -> &[FlightEvent] { &self.events }
    pub fn launch_elevation(&self) -> f64 { self.launch_elevation }

    /// Peak altitude AGL.
    pub fn apogee(&self) -> f64 {
        self.samples.iter().map(|s| s.altitude).fold(0.0, f64::max)
    }

    /// Interpolated time of the apogee event; falls back to the highest
    /// sample for flights that never produced one.
    pub fn apogee_time(&self) -> f64 {
        self.events
            .iter()
            .find_map(|e| matches!(e.kind, FlightEventKind::Apogee { .. }).then_some(e.time))
            .unwrap_or_else(|| {
                self.samples
                    .iter()
                    .max_by(|a, b| a.altitude.total_cmp(&b.altitude))
                    .map(|s| s.time)
                    .unwrap_or(0.0)
            })
    }

    pub fn flight_time(&self) -> f64 {
        self.samples.last().map(|s| s.time).unwrap_or(0.0)
    }

    pub fn rail_exit_velocity(&self) -> Option<f64> {
        self.events.iter().find_map(|e| match e.kind {
            FlightEventKind::RailExit { velocity } => Some(velocity),
            _ => None,
        })
    }

    pub fn burnout_altitude(&self) -> Option<f64> {
        self.events.iter().find_map(|e| match e.kind {
            FlightEventKind::Burnout { altitude, .. } => Some(altitude),
            _ => None,
        })
    }

    pub fn burnout_velocity(&self) -> Option<f64> {
        self.events.iter().find_map(|e| match e.kind {
            FlightEventKind::Burnout { velocity, .. } => Some(velocity),
            _ => None,
        })
    }

    pub fn drogue_deploy_time(&self) -> Option<f64> {
        self.events
            .iter()
            .find_map(|e| matches!(e.kind, FlightEventKind::DrogueDeploy).then_some(e.time))
    }

    pub fn main_deploy_time(&self) -> Option<f64> {
        self.events
            .iter()
            .find_map(|e| matches!(e.kind, FlightEventKind::MainDeploy { .. }).then_some(e.time))
    }

    pub fn touchdown_velocity(&self) -> Option<f64> {
        self.events.iter().find_map(|e| match e.kind {
            FlightEventKind::Touchdown { velocity } => Some(velocity),
            _ => None,
        })
    }

    pub fn max_velocity(&self) -> f64 {
        self.samples.iter().map(|s| s.velocity).fold(0.0, f64::max)
    }

    pub fn max_mach(&self) -> f64 {
        self.samples.iter().map(|s| s.mach).fold(0.0, f64::max)
    }

    pub fn max_acceleration(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.acceleration)
            .fold(0.0, f64::max)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
