use crate::error::SimError;
use crate::motor::Motor;
use crate::physics::atmosphere::G0;
use crate::physics::nozzle;

// ---------------------------------------------------------------------------
// Internal ballistics: chamber mass balance over the burn
// ---------------------------------------------------------------------------
//
// Fixed-step RK4 on the chamber-pressure ODE
//
//   dP0/dt = (R*T0*Ab*rho_p*r - P0*At*H*sqrt(2*R*T0)) / V_free
//
// with the discharge factor H switching between the choked and subsonic
// branches. Geometry and burn rate are held over each step; the web advances
// by r*dt. The run is a phase machine: Ignition until the chamber reaches
// its operating threshold, SteadyBurn until the burn area passes its peak,
// TailOff until the grain is exhausted, then the terminal Burnout sample.

/// Burn phase of the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorPhase {
    Ignition,
    SteadyBurn,
    TailOff,
    Burnout,
}

/// One time sample of the internal ballistics run.
#[derive(Debug, Clone, Copy)]
pub struct MotorSample {
    pub time: f64,             // s
    pub phase: MotorPhase,
    pub chamber_pressure: f64, // Pa
    pub burn_area: f64,        // m^2
    pub web: f64,              // m, burned web distance
    pub burn_rate: f64,        // m/s
    pub mass_flow: f64,        // kg/s through the nozzle
    pub thrust: f64,           // N
    pub propellant_mass: f64,  // kg remaining
    pub free_volume: f64,      // m^3
}

/// Solver settings for the chamber integration.
#[derive(Debug, Clone)]
pub struct ChamberConfig {
    pub dt: f64,                        // s
    pub external_pressure: f64,         // Pa, ambient at the launch site
    pub steady_pressure_threshold: f64, // Pa, ends the Ignition phase
    pub max_pressure: f64,              // Pa, divergence guard
    pub max_steps: usize,
}

impl Default for ChamberConfig {
    fn default() -> Self {
        Self {
            dt: 1e-3,
            external_pressure: 101_325.0,
            steady_pressure_threshold: 2.0e6,
            max_pressure: 15.0e6,
            max_steps: 1_000_000,
        }
    }
}

/// Classification of the burn-area history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurnProfile {
    Progressive,
    Neutral,
    Regressive,
}

/// Frozen output of an internal ballistics run. Feeds the flight solver as
/// a forcing function.
#[derive(Debug, Clone)]
pub struct MotorSimulation {
    samples: Vec<MotorSample>,
    burnout_time: f64,
    motor_dry_mass: f64,
    initial_propellant_mass: f64,
    throat_area: f64,
}

/// Run the internal ballistics of a motor to burnout.
pub fn simulate_motor(motor: &Motor, config: &ChamberConfig) -> Result<MotorSimulation, SimError> {
    let prop = motor.propellant();
    let grain = motor.grain();
    let k_ch = prop.k_chamber();
    let k_ex = prop.k_exhaust();
    let r_gas = prop.gas_constant();
    let t0 = prop.flame_temperature();
    let throat_area = motor.throat_area();
    let p_amb = config.external_pressure;
    let max_web = grain.max_web();

    // Exit Mach depends only on the fixed expansion ratio
    let exit_mach = nozzle::exit_mach(k_ex, motor.expansion_ratio()).ok_or(SimError::Numerical {
        time: 0.0,
        reason: "exit Mach iteration did not converge".into(),
    })?;

    let mut samples = Vec::with_capacity(4096.min(config.max_steps + 1));
    let mut time = 0.0;
    let mut web = 0.0;
    let mut pressure = motor.igniter_pressure();
    let mut phase = MotorPhase::Ignition;
    let mut peak_area = 0.0_f64;

    for _ in 0..=config.max_steps {
        if grain.is_burned_out(web) || web >= max_web {
            samples.push(MotorSample {
                time,
                phase: MotorPhase::Burnout,
                chamber_pressure: pressure,
                burn_area: 0.0,
                web,
                burn_rate: 0.0,
                mass_flow: 0.0,
                thrust: 0.0,
                propellant_mass: 0.0,
                free_volume: motor.empty_chamber_volume(),
            });
            return Ok(MotorSimulation {
                samples,
                burnout_time: time,
                motor_dry_mass: motor.dry_mass(),
                initial_propellant_mass: motor.initial_propellant_mass(),
                throat_area,
            });
        }

        let burn_area = grain.burn_area(web);
        let propellant_volume = grain.propellant_volume(web);
        let free_volume = motor.free_volume(propellant_volume);
        if free_volume <= 0.0 {
            return Err(SimError::Numerical {
                time,
                reason: "free chamber volume is not positive".into(),
            });
        }

        let burn_rate = prop.burn_rate(pressure)?;

        // Phase transitions observed on the pre-step state
        peak_area = peak_area.max(burn_area);
        phase = match phase {
            MotorPhase::Ignition if pressure > config.steady_pressure_threshold => {
                MotorPhase::SteadyBurn
            }
            MotorPhase::SteadyBurn if burn_area < peak_area * (1.0 - 1e-9) => MotorPhase::TailOff,
            p => p,
        };

        let h = nozzle::discharge_factor(pressure, p_amb, k_ch);
        let mass_flow = nozzle::mass_flow(pressure, throat_area, h, r_gas, t0);

        let p_exit = nozzle::exit_pressure(k_ex, exit_mach, pressure);
        let (cf, _) = nozzle::thrust_coefficients(
            pressure,
            p_exit,
            p_amb,
            motor.expansion_ratio(),
            k_ex,
            prop.combustion_efficiency(),
        );
        let thrust = cf * throat_area * pressure;

        samples.push(MotorSample {
            time,
            phase,
            chamber_pressure: pressure,
            burn_area,
            web,
            burn_rate,
            mass_flow,
            thrust,
            propellant_mass: propellant_volume * prop.density(),
            free_volume,
        });

        // RK4 on the chamber-pressure ODE; geometry and burn rate held over
        // the step, the discharge factor follows the stage pressure
        let dp = |p: f64| {
            let h = nozzle::discharge_factor(p, p_amb, k_ch);
            (r_gas * t0 * burn_area * prop.density() * burn_rate
                - p * throat_area * h * (2.0 * r_gas * t0).sqrt())
                / free_volume
        };
        let dt = config.dt;
        let k1 = dp(pressure);
        let k2 = dp(pressure + 0.5 * k1 * dt);
        let k3 = dp(pressure + 0.5 * k2 * dt);
        let k4 = dp(pressure + k3 * dt);
        let next = pressure + (k1 + 2.0 * (k2 + k3) + k4) * dt / 6.0;

        if !next.is_finite() || next < p_amb * (1.0 - 1e-6) || next > config.max_pressure {
            return Err(SimError::Numerical {
                time,
                reason: format!("chamber pressure diverged to {} Pa", next),
            });
        }

        web += burn_rate * dt;
        pressure = next;
        time += dt;
    }

    Err(SimError::Numerical {
        time,
        reason: "burn did not reach burnout within the step budget".into(),
    })
}

impl MotorSimulation {
    pub fn samples(&self) -> &[MotorSample] { &self.samples }
    pub fn burnout_time(&self) -> f64 { self.burnout_time }
    pub fn motor_dry_mass(&self) -> f64 { self.motor_dry_mass }
    pub fn initial_propellant_mass(&self) -> f64 { self.initial_propellant_mass }

    /// Thrust at an arbitrary time (linear interpolation; zero from burnout
    /// onward). Forcing function for the flight solver.
    pub fn thrust_at(&self, time: f64) -> f64 {
        self.interpolate(time, |s| s.thrust)
    }

    /// Remaining propellant mass at an arbitrary time (zero from burnout
    /// onward).
    pub fn propellant_mass_at(&self, time: f64) -> f64 {
        self.interpolate(time, |s| s.propellant_mass)
    }

    fn interpolate(&self, time: f64, value: impl Fn(&MotorSample) -> f64) -> f64 {
        if time >= self.burnout_time {
            return 0.0;
        }
        let idx = self.samples.partition_point(|s| s.time <= time);
        if idx == 0 {
            return value(&self.samples[0]);
        }
        let (a, b) = (&self.samples[idx - 1], &self.samples[idx]);
        let frac = (time - a.time) / (b.time - a.time);
        value(a) + (value(b) - value(a)) * frac
    }

    pub fn max_pressure(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.chamber_pressure)
            .fold(0.0, f64::max)
    }

    pub fn mean_pressure(&self) -> f64 {
        self.samples.iter().map(|s| s.chamber_pressure).sum::<f64>() / self.samples.len() as f64
    }

    pub fn max_thrust(&self) -> f64 {
        self.samples.iter().map(|s| s.thrust).fold(0.0, f64::max)
    }

    /// Total impulse, N·s (trapezoidal integral of thrust).
    pub fn total_impulse(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|w| 0.5 * (w[0].thrust + w[1].thrust) * (w[1].time - w[0].time))
            .sum()
    }

    /// Specific impulse, s.
    pub fn specific_impulse(&self) -> f64 {
        self.total_impulse() / (self.initial_propellant_mass * G0)
    }

    /// Klemmung (burn area / throat area) extremes over the burn.
    pub fn max_kn(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.burn_area / self.throat_area)
            .fold(0.0, f64::max)
    }

    pub fn initial_to_final_kn(&self) -> f64 {
        let burning: Vec<f64> = self
            .samples
            .iter()
            .filter(|s| s.burn_area > 0.0)
            .map(|s| s.burn_area / self.throat_area)
            .collect();
        match (burning.first(), burning.last()) {
            (Some(first), Some(last)) if *last > 0.0 => first / last,
            _ => 1.0,
        }
    }

    /// Classifies the burn-area history with a 2% neutrality band.
    pub fn burn_profile(&self) -> BurnProfile {
        let burning: Vec<f64> = self
            .samples
            .iter()
            .filter(|s| s.burn_area > 0.0)
            .map(|s| s.burn_area)
            .collect();
        match (burning.first(), burning.last()) {
            (Some(first), Some(last)) => {
                let ratio = first / last;
                if ratio > 1.02 {
                    BurnProfile::Regressive
                } else if ratio < 0.98 {
                    BurnProfile::Progressive
                } else {
                    BurnProfile::Neutral
                }
            }
            _ => BurnProfile::Neutral,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::grain::{Grain, GrainSegment};
    use crate::motor::propellant::Propellant;

    fn test_motor() -> Motor {
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

    fn test_config() -> ChamberConfig {
        ChamberConfig {
            dt: 1e-4,
            ..ChamberConfig::default()
        }
    }

    #[test]
    fn pressure_stays_within_operating_band() {
        let sim = simulate_motor(&test_motor(), &test_config()).unwrap();
        for s in sim.samples() {
            assert!(
                s.chamber_pressure >= 101_325.0 * (1.0 - 1e-6),
                "pressure {} below ambient at t={}",
                s.chamber_pressure,
                s.time
            );
            assert!(s.chamber_pressure <= 15.0e6);
        }
    }

    #[test]
    fn terminal_sample_is_burnout_with_zero_output() {
        let sim = simulate_motor(&test_motor(), &test_config()).unwrap();
        let last = sim.samples().last().unwrap();
        assert_eq!(last.phase, MotorPhase::Burnout);
        assert_eq!(last.thrust, 0.0);
        assert_eq!(last.mass_flow, 0.0);
        assert_eq!(last.propellant_mass, 0.0);
        assert_eq!(last.time, sim.burnout_time());
        assert_eq!(sim.thrust_at(sim.burnout_time()), 0.0);
        assert_eq!(sim.thrust_at(sim.burnout_time() + 10.0), 0.0);
    }

    #[test]
    fn phases_progress_in_order() {
        let sim = simulate_motor(&test_motor(), &test_config()).unwrap();
        let mut rank_seen = 0;
        for s in sim.samples() {
            let rank = match s.phase {
                MotorPhase::Ignition => 0,
                MotorPhase::SteadyBurn => 1,
                MotorPhase::TailOff => 2,
                MotorPhase::Burnout => 3,
            };
            assert!(rank >= rank_seen, "phase regressed at t={}", s.time);
            rank_seen = rank;
        }
        assert_eq!(rank_seen, 3, "run must end in Burnout");
    }

    #[test]
    fn web_is_monotone_and_reaches_exhaustion() {
        let motor = test_motor();
        let sim = simulate_motor(&motor, &test_config()).unwrap();
        let mut prev = -1.0;
        for s in sim.samples() {
            assert!(s.web >= prev);
            prev = s.web;
        }
        assert!(prev >= motor.grain().max_web());
    }

    #[test]
    fn thrust_and_impulse_are_physical() {
        let sim = simulate_motor(&test_motor(), &test_config()).unwrap();
        assert!(sim.max_thrust() > 100.0);
        assert!(sim.total_impulse() > 100.0);
        // KN-based propellants deliver on the order of 100-160 s
        let isp = sim.specific_impulse();
        assert!(isp > 60.0 && isp < 200.0, "Isp = {}", isp);
    }

    #[test]
    fn forcing_interpolation_is_continuous() {
        let sim = simulate_motor(&test_motor(), &test_config()).unwrap();
        let mid = sim.burnout_time() / 2.0;
        let t1 = sim.thrust_at(mid);
        let t2 = sim.thrust_at(mid + 1e-5);
        assert!((t1 - t2).abs() < 50.0, "thrust jumped: {} vs {}", t1, t2);
        assert!(sim.propellant_mass_at(0.0) > 0.9 * sim.initial_propellant_mass());
    }

    #[test]
    fn reruns_are_bit_identical() {
        let motor = test_motor();
        let config = test_config();
        let a = simulate_motor(&motor, &config).unwrap();
        let b = simulate_motor(&motor, &config).unwrap();
        assert_eq!(a.samples().len(), b.samples().len());
        for (x, y) in a.samples().iter().zip(b.samples()) {
            assert_eq!(x.chamber_pressure, y.chamber_pressure);
            assert_eq!(x.thrust, y.thrust);
            assert_eq!(x.web, y.web);
        }
    }

    #[test]
    fn step_budget_exhaustion_is_a_numerical_error() {
        let config = ChamberConfig {
            dt: 1e-6,
            max_steps: 100,
            ..ChamberConfig::default()
        };
        assert!(matches!(
            simulate_motor(&test_motor(), &config),
            Err(SimError::Numerical { .. })
        ));
    }
}
