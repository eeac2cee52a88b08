pub mod grain;
pub mod propellant;

use std::f64::consts::PI;

use crate::error::SimError;
use grain::Grain;
use propellant::Propellant;

// ---------------------------------------------------------------------------
// Motor configuration
// ---------------------------------------------------------------------------

/// Complete solid motor description: propellant + grain stack + combustion
/// chamber + nozzle. Immutable once built; owned by a single simulation run.
#[derive(Debug, Clone)]
pub struct Motor {
    propellant: Propellant,
    grain: Grain,
    chamber_inner_diameter: f64, // m
    chamber_length: f64,         // m
    throat_diameter: f64,        // m
    expansion_ratio: f64,        // exit area / throat area
    dry_mass: f64,               // kg, casing + nozzle + bulkhead
    igniter_pressure: f64,       // Pa, chamber pressure at t = 0
}

impl Motor {
    pub fn builder(propellant: Propellant, grain: Grain) -> MotorBuilder {
        MotorBuilder::new(propellant, grain)
    }

    pub fn propellant(&self) -> &Propellant { &self.propellant }
    pub fn grain(&self) -> &Grain { &self.grain }
    pub fn chamber_inner_diameter(&self) -> f64 { self.chamber_inner_diameter }
    pub fn chamber_length(&self) -> f64 { self.chamber_length }
    pub fn throat_diameter(&self) -> f64 { self.throat_diameter }
    pub fn expansion_ratio(&self) -> f64 { self.expansion_ratio }
    pub fn dry_mass(&self) -> f64 { self.dry_mass }
    pub fn igniter_pressure(&self) -> f64 { self.igniter_pressure }

    pub fn throat_area(&self) -> f64 {
        PI / 4.0 * self.throat_diameter.powi(2)
    }

    pub fn exit_area(&self) -> f64 {
        self.throat_area() * self.expansion_ratio
    }

    /// Chamber volume with no propellant loaded.
    pub fn empty_chamber_volume(&self) -> f64 {
        PI / 4.0 * self.chamber_inner_diameter.powi(2) * self.chamber_length
    }

    /// Free (gas) volume for a given remaining propellant volume.
    pub fn free_volume(&self, propellant_volume: f64) -> f64 {
        self.empty_chamber_volume() - propellant_volume
    }

    pub fn initial_propellant_mass(&self) -> f64 {
        self.grain.propellant_volume(0.0) * self.propellant.density()
    }

    pub fn total_mass(&self) -> f64 {
        self.dry_mass + self.initial_propellant_mass()
    }

    /// Ratio of initial core flow area to throat area (BATES port check).
    pub fn initial_port_to_throat(&self) -> Option<f64> {
        let last = self.grain.segments().last()?;
        match last.shape() {
            grain::SegmentShape::Bates { core_diameter } => {
                Some(core_diameter.powi(2) / self.throat_diameter.powi(2))
            }
            grain::SegmentShape::DSlot { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Motor builder
// ---------------------------------------------------------------------------

pub struct MotorBuilder {
    propellant: Propellant,
    grain: Grain,
    chamber_inner_diameter: f64,
    chamber_length: f64,
    throat_diameter: f64,
    expansion_ratio: f64,
    dry_mass: f64,
    igniter_pressure: f64,
}

impl MotorBuilder {
    pub fn new(propellant: Propellant, grain: Grain) -> Self {
        Self {
            propellant,
            grain,
            chamber_inner_diameter: 0.0,
            chamber_length: 0.0,
            throat_diameter: 0.0,
            expansion_ratio: 0.0,
            dry_mass: 0.0,
            igniter_pressure: 1.0e6,
        }
    }

    pub fn chamber(mut self, inner_diameter: f64, length: f64) -> Self {
        self.chamber_inner_diameter = inner_diameter;
        self.chamber_length = length;
        self
    }

    pub fn nozzle(mut self, throat_diameter: f64, expansion_ratio: f64) -> Self {
        self.throat_diameter = throat_diameter;
        self.expansion_ratio = expansion_ratio;
        self
    }

    pub fn dry_mass(mut self, v: f64) -> Self { self.dry_mass = v; self }
    pub fn igniter_pressure(mut self, v: f64) -> Self { self.igniter_pressure = v; self }

    pub fn build(self) -> Result<Motor, SimError> {
        if !(self.chamber_inner_diameter > 0.0) {
            return Err(SimError::config("chamber_inner_diameter", "must be strictly positive"));
        }
        if !(self.chamber_length > 0.0) {
            return Err(SimError::config("chamber_length", "must be strictly positive"));
        }
        if !(self.throat_diameter > 0.0) {
            return Err(SimError::config("throat_diameter", "must be strictly positive"));
        }
        if self.throat_diameter >= self.chamber_inner_diameter {
            return Err(SimError::config(
                "throat_diameter",
                "must be smaller than the chamber inner diameter",
            ));
        }
        if !(self.expansion_ratio > 1.0) {
            return Err(SimError::config("expansion_ratio", "must exceed 1"));
        }
        if self.dry_mass < 0.0 {
            return Err(SimError::config("dry_mass", "must be non-negative"));
        }
        if !(self.igniter_pressure > 0.0) {
            return Err(SimError::config("igniter_pressure", "must be strictly positive"));
        }
        for (i, s) in self.grain.segments().iter().enumerate() {
            if s.outer_diameter() > self.chamber_inner_diameter {
                return Err(SimError::config(
                    "grain",
                    format!("segment {} outer diameter exceeds the chamber bore", i),
                ));
            }
        }
        if self.grain.total_length() > self.chamber_length {
            return Err(SimError::config(
                "grain",
                "grain stack is longer than the combustion chamber",
            ));
        }

        Ok(Motor {
            propellant: self.propellant,
            grain: self.grain,
            chamber_inner_diameter: self.chamber_inner_diameter,
            chamber_length: self.chamber_length,
            throat_diameter: self.throat_diameter,
            expansion_ratio: self.expansion_ratio,
            dry_mass: self.dry_mass,
            igniter_pressure: self.igniter_pressure,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use super::grain::GrainSegment;

    fn test_grain() -> Grain {
        Grain::new(vec![
            GrainSegment::bates(60e-3, 20e-3, 120e-3, 10e-3, 0).unwrap(),
            GrainSegment::bates(60e-3, 20e-3, 120e-3, 10e-3, 0).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn builder_produces_consistent_motor() {
        let motor = Motor::builder(Propellant::knsb(), test_grain())
            .chamber(66e-3, 280e-3)
            .nozzle(12e-3, 6.0)
            .dry_mass(2.0)
            .build()
            .unwrap();
        assert_relative_eq!(
            motor.throat_area(),
            PI / 4.0 * 12e-3_f64.powi(2),
            epsilon = 1e-15
        );
        assert!(motor.free_volume(motor.grain().propellant_volume(0.0)) > 0.0);
        assert!(motor.initial_propellant_mass() > 0.5);
        assert!(motor.initial_port_to_throat().unwrap() > 2.0);
    }

    #[test]
    fn oversized_grain_rejected() {
        let result = Motor::builder(Propellant::knsb(), test_grain())
            .chamber(66e-3, 200e-3) // shorter than the 250 mm stack
            .nozzle(12e-3, 6.0)
            .build();
        assert!(matches!(result, Err(SimError::Config { parameter: "grain", .. })));

        let result = Motor::builder(Propellant::knsb(), test_grain())
            .chamber(50e-3, 280e-3) // narrower than the 60 mm segments
            .nozzle(12e-3, 6.0)
            .build();
        assert!(matches!(result, Err(SimError::Config { parameter: "grain", .. })));
    }

    #[test]
    fn nozzle_validation() {
        let result = Motor::builder(Propellant::knsb(), test_grain())
            .chamber(66e-3, 280e-3)
            .nozzle(12e-3, 0.8)
            .build();
        assert!(matches!(result, Err(SimError::Config { parameter: "expansion_ratio", .. })));

        let result = Motor::builder(Propellant::knsb(), test_grain())
            .chamber(66e-3, 280e-3)
            .build();
        assert!(matches!(result, Err(SimError::Config { parameter: "throat_diameter", .. })));
    }
}
