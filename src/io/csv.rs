use std::io::{self, Write};

use crate::sim::chamber::MotorSimulation;
use crate::sim::flight::FlightSimulation;

/// Write an internal ballistics run to CSV format.
///
/// Columns: time, chamber_pressure, burn_area, web, burn_rate, mass_flow,
///          thrust, propellant_mass
pub fn write_motor_csv<W: Write>(writer: &mut W, sim: &MotorSimulation) -> io::Result<()> {
    writeln!(
        writer,
        "time,chamber_pressure,burn_area,web,burn_rate,mass_flow,thrust,propellant_mass"
    )?;
    for s in sim.samples() {
        writeln!(
            writer,
            "{:.6},{:.1},{:.6},{:.6},{:.6},{:.4},{:.2},{:.4}",
            s.time,
            s.chamber_pressure,
            s.burn_area,
            s.web,
            s.burn_rate,
            s.mass_flow,
            s.thrust,
            s.propellant_mass,
        )?;
    }
    Ok(())
}

/// Write a flight run to CSV format.
///
/// Columns: time, altitude, velocity, acceleration, mach, external_pressure,
///          vehicle_mass
pub fn write_flight_csv<W: Write>(writer: &mut W, sim: &FlightSimulation) -> io::Result<()> {
    writeln!(
        writer,
        "time,altitude,velocity,acceleration,mach,external_pressure,vehicle_mass"
    )?;
    for s in sim.samples() {
        writeln!(
            writer,
            "{:.4},{:.2},{:.3},{:.3},{:.4},{:.1},{:.4}",
            s.time,
            s.altitude,
            s.velocity,
            s.acceleration,
            s.mach,
            s.external_pressure,
            s.vehicle_mass,
        )?;
    }
    Ok(())
}

/// Write a motor run to a CSV file at the given path.
pub fn write_motor_csv_file(path: &str, sim: &MotorSimulation) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_motor_csv(&mut file, sim)
}

/// Write a flight run to a CSV file at the given path.
pub fn write_flight_csv_file(path: &str, sim: &FlightSimulation) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_flight_csv(&mut file, sim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::grain::{Grain, GrainSegment};
    use crate::motor::propellant::Propellant;
    use crate::motor::Motor;
    use crate::sim::chamber::{simulate_motor, ChamberConfig};

    #[test]
    fn motor_csv_has_header_and_rows() {
        let grain = Grain::new(vec![
            GrainSegment::bates(60e-3, 20e-3, 120e-3, 10e-3, 0).unwrap()
        ])
        .unwrap();
        let motor = Motor::builder(Propellant::knsu(), grain)
            .chamber(66e-3, 140e-3)
            .nozzle(10e-3, 5.0)
            .dry_mass(1.0)
            .build()
            .unwrap();
        let sim = simulate_motor(
            &motor,
            &ChamberConfig {
                dt: 1e-4,
                ..ChamberConfig::default()
            },
        )
        .unwrap();

        let mut buf = Vec::new();
        write_motor_csv(&mut buf, &sim).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("time,chamber_pressure,"));
        assert_eq!(lines.len(), sim.samples().len() + 1);
        assert!(lines[1].starts_with("0.000000,"));
    }
}
