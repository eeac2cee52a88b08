use crate::error::SimError;

// ---------------------------------------------------------------------------
// Empirical solid-propellant model
// ---------------------------------------------------------------------------
//
// Burn rate follows the Saint-Robert (Vieille) power law r = a * P^n, fitted
// piecewise over chamber-pressure brackets. Coefficients use the convention
// of the published KN* fits: `coefficient` gives mm/s with the pressure
// expressed in MPa; `burn_rate` converts to m/s. Thermochemical constants
// come from equilibrium-code output for the propellant mixture.

/// One pressure bracket of a piecewise power-law burn-rate fit.
///
/// Bounds are chamber pressures in Pa. A segment owns the half-open interval
/// `(min_pressure, max_pressure]`; the first segment of a fit additionally
/// owns its own lower bound, so boundary pressures always match exactly one
/// segment.
#[derive(Debug, Clone, Copy)]
pub struct BurnRateSegment {
    pub min_pressure: f64, // Pa
    pub max_pressure: f64, // Pa
    pub coefficient: f64,  // mm/s at 1 MPa^exponent
    pub exponent: f64,
}

/// Immutable propellant description: segmented burn-rate fit plus
/// thermochemical constants.
#[derive(Debug, Clone)]
pub struct Propellant {
    name: String,
    segments: Vec<BurnRateSegment>,
    k_chamber: f64,             // isentropic exponent of the chamber mixture
    k_exhaust: f64,             // isentropic exponent of the two-phase exhaust
    gas_constant: f64,          // J/(kg·K)
    flame_temperature: f64,     // K, efficiency-corrected
    density: f64,               // kg/m^3
    combustion_efficiency: f64, // applied to the thrust coefficient
}

impl Propellant {
    pub fn new(
        name: impl Into<String>,
        segments: Vec<BurnRateSegment>,
        k_chamber: f64,
        k_exhaust: f64,
        gas_constant: f64,
        flame_temperature: f64,
        density: f64,
        combustion_efficiency: f64,
    ) -> Result<Self, SimError> {
        if segments.is_empty() {
            return Err(SimError::config("burn_rate_segments", "no segments supplied"));
        }
        for (i, s) in segments.iter().enumerate() {
            if s.min_pressure < 0.0 || s.max_pressure <= s.min_pressure {
                return Err(SimError::config(
                    "burn_rate_segments",
                    format!(
                        "segment {} has invalid bounds [{}, {}]",
                        i, s.min_pressure, s.max_pressure
                    ),
                ));
            }
        }
        for (i, pair) in segments.windows(2).enumerate() {
            let gap = pair[1].min_pressure - pair[0].max_pressure;
            if gap.abs() > 1e-6 * pair[0].max_pressure.max(1.0) {
                let what = if gap > 0.0 { "gap" } else { "overlap" };
                return Err(SimError::config(
                    "burn_rate_segments",
                    format!("{} between segments {} and {}", what, i, i + 1),
                ));
            }
        }
        for (param, value) in [
            ("k_chamber", k_chamber - 1.0),
            ("k_exhaust", k_exhaust - 1.0),
            ("gas_constant", gas_constant),
            ("flame_temperature", flame_temperature),
            ("density", density),
            ("combustion_efficiency", combustion_efficiency),
        ] {
            if !(value > 0.0) {
                return Err(SimError::config(param, "must be strictly positive"));
            }
        }
        if combustion_efficiency > 1.0 {
            return Err(SimError::config("combustion_efficiency", "must be <= 1"));
        }
        Ok(Self {
            name: name.into(),
            segments,
            k_chamber,
            k_exhaust,
            gas_constant,
            flame_temperature,
            density,
            combustion_efficiency,
        })
    }

    /// Burn rate in m/s at the given chamber pressure (Pa).
    ///
    /// A pressure outside every fitted bracket is a modeling boundary, not a
    /// recoverable condition; callers must reject such operating points.
    pub fn burn_rate(&self, chamber_pressure: f64) -> Result<f64, SimError> {
        let first = &self.segments[0];
        let last = &self.segments[self.segments.len() - 1];
        if chamber_pressure < first.min_pressure || chamber_pressure > last.max_pressure {
            return Err(SimError::Domain {
                quantity: "chamber pressure",
                value: chamber_pressure,
                min: first.min_pressure,
                max: last.max_pressure,
            });
        }
        // Contiguity is checked at construction, so the first bracket whose
        // upper bound contains the pressure is the single match.
        let seg = self
            .segments
            .iter()
            .find(|s| chamber_pressure <= s.max_pressure)
            .unwrap_or(last);
        let p_mpa = chamber_pressure * 1e-6;
        Ok(seg.coefficient * p_mpa.powf(seg.exponent) * 1e-3)
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn k_chamber(&self) -> f64 { self.k_chamber }
    pub fn k_exhaust(&self) -> f64 { self.k_exhaust }
    pub fn gas_constant(&self) -> f64 { self.gas_constant }
    pub fn flame_temperature(&self) -> f64 { self.flame_temperature }
    pub fn density(&self) -> f64 { self.density }
    pub fn combustion_efficiency(&self) -> f64 { self.combustion_efficiency }
}

// ---------------------------------------------------------------------------
// Published KN* propellant fits
// ---------------------------------------------------------------------------

const R_UNIVERSAL: f64 = 8.314_462_618; // J/(mol·K)

fn seg(min_mpa: f64, max_mpa: f64, a: f64, n: f64) -> BurnRateSegment {
    BurnRateSegment {
        min_pressure: min_mpa * 1e6,
        max_pressure: max_mpa * 1e6,
        coefficient: a,
        exponent: n,
    }
}

impl Propellant {
    /// KNDX (potassium nitrate / dextrose), 5-bracket fit.
    pub fn kndx() -> Self {
        Self {
            name: "KNDX".into(),
            segments: vec![
                seg(0.0, 0.779, 8.875, 0.619),
                seg(0.779, 2.572, 7.553, -0.009),
                seg(2.572, 5.930, 3.841, 0.688),
                seg(5.930, 8.502, 17.20, -0.148),
                seg(8.502, 11.20, 4.775, 0.442),
            ],
            k_chamber: 1.1309,
            k_exhaust: 1.1369,
            gas_constant: R_UNIVERSAL / 42.391e-3,
            flame_temperature: 0.95 * 1712.0,
            density: 1795.0,
            combustion_efficiency: 0.95,
        }
    }

    /// KNSB (potassium nitrate / sorbitol), 5-bracket fit.
    pub fn knsb() -> Self {
        Self {
            name: "KNSB".into(),
            segments: vec![
                seg(0.0, 0.807, 10.708, 0.625),
                seg(0.807, 1.503, 8.763, -0.314),
                seg(1.503, 3.792, 7.852, -0.013),
                seg(3.792, 7.033, 3.907, 0.535),
                seg(7.033, 10.67, 9.653, 0.064),
            ],
            k_chamber: 1.1362,
            k_exhaust: 1.1484,
            gas_constant: R_UNIVERSAL / 39.857e-3,
            flame_temperature: 0.95 * 1603.0,
            density: 1837.3 * 0.95,
            combustion_efficiency: 0.95,
        }
    }

    /// KNSU (potassium nitrate / sucrose), single-bracket fit.
    pub fn knsu() -> Self {
        Self {
            name: "KNSU".into(),
            segments: vec![seg(0.0, 10.3, 8.260, 0.319)],
            k_chamber: 1.1332,
            k_exhaust: 1.1387,
            gas_constant: R_UNIVERSAL / 41.964e-3,
            flame_temperature: 0.95 * 1722.0,
            density: 1899.5 * 0.95,
            combustion_efficiency: 0.95,
        }
    }

    /// KNER (potassium nitrate / erythritol), single-bracket fit.
    pub fn kner() -> Self {
        Self {
            name: "KNER".into(),
            segments: vec![seg(0.0, 10.3, 2.903, 0.395)],
            k_chamber: 1.1392,
            k_exhaust: 1.1518,
            gas_constant: R_UNIVERSAL / 38.570e-3,
            flame_temperature: 0.94 * 1608.0,
            density: 1820.0 * 0.95,
            combustion_efficiency: 0.94,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
