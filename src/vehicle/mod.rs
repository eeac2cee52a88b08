use std::f64::consts::PI;

use crate::error::SimError;

// ---------------------------------------------------------------------------
// Vehicle configuration
// ---------------------------------------------------------------------------

/// Airframe parameters for the flight simulation. Mass excludes the motor;
/// the motor contributes its dry mass and instantaneous propellant mass.
#[derive(Debug, Clone)]
pub struct Rocket {
    mass_without_motor: f64, // kg
    drag_coefficient: f64,
    diameter: f64,           // m, reference body diameter
    rail_length: f64,        // m
}

impl Rocket {
    pub fn new(
        mass_without_motor: f64,
        drag_coefficient: f64,
        diameter: f64,
        rail_length: f64,
    ) -> Result<Self, SimError> {
        for (param, value) in [
            ("mass_without_motor", mass_without_motor),
            ("drag_coefficient", drag_coefficient),
            ("diameter", diameter),
            ("rail_length", rail_length),
        ] {
            if !(value > 0.0) {
                return Err(SimError::config(param, "must be strictly positive"));
            }
        }
        Ok(Self {
            mass_without_motor,
            drag_coefficient,
            diameter,
            rail_length,
        })
    }

    pub fn mass_without_motor(&self) -> f64 { self.mass_without_motor }
    pub fn drag_coefficient(&self) -> f64 { self.drag_coefficient }
    pub fn diameter(&self) -> f64 { self.diameter }
    pub fn rail_length(&self) -> f64 { self.rail_length }

    pub fn frontal_area(&self) -> f64 {
        PI / 4.0 * self.diameter.powi(2)
    }

    /// Drag coefficient times reference area for the bare airframe.
    pub fn cd_area(&self) -> f64 {
        self.drag_coefficient * self.frontal_area()
    }
}

// ---------------------------------------------------------------------------
// Recovery configuration
// ---------------------------------------------------------------------------

/// Dual-deployment recovery: a drogue opened a fixed delay after apogee and
/// a main chute opened on descent through an activation altitude. Passive
/// data; the flight solver fires the events.
#[derive(Debug, Clone)]
pub struct Recovery {
    drogue_delay: f64,             // s after apogee
    drogue_drag_coefficient: f64,
    drogue_diameter: f64,          // m
    main_drag_coefficient: f64,
    main_diameter: f64,            // m
    main_activation_altitude: f64, // m AGL
}

impl Recovery {
    pub fn new(
        drogue_delay: f64,
        drogue_drag_coefficient: f64,
        drogue_diameter: f64,
        main_drag_coefficient: f64,
        main_diameter: f64,
        main_activation_altitude: f64,
    ) -> Result<Self, SimError> {
        if drogue_delay < 0.0 {
            return Err(SimError::config("drogue_delay", "must be non-negative"));
        }
        if main_activation_altitude < 0.0 {
            return Err(SimError::config("main_activation_altitude", "must be non-negative"));
        }
        for (param, value) in [
            ("drogue_drag_coefficient", drogue_drag_coefficient),
            ("drogue_diameter", drogue_diameter),
            ("main_drag_coefficient", main_drag_coefficient),
            ("main_diameter", main_diameter),
        ] {
            if !(value > 0.0) {
                return Err(SimError::config(param, "must be strictly positive"));
            }
        }
        Ok(Self {
            drogue_delay,
            drogue_drag_coefficient,
            drogue_diameter,
            main_drag_coefficient,
            main_diameter,
            main_activation_altitude,
        })
    }

    pub fn drogue_delay(&self) -> f64 { self.drogue_delay }
    pub fn main_activation_altitude(&self) -> f64 { self.main_activation_altitude }

    pub fn drogue_cd_area(&self) -> f64 {
        self.drogue_drag_coefficient * PI / 4.0 * self.drogue_diameter.powi(2)
    }

    pub fn main_cd_area(&self) -> f64 {
        self.main_drag_coefficient * PI / 4.0 * self.main_diameter.powi(2)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
