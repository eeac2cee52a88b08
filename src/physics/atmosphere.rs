use crate::error::SimError;

// ---------------------------------------------------------------------------
// ISA 1976 Standard Atmosphere (sea level to 100 km)
// ---------------------------------------------------------------------------

const R_AIR: f64 = 287.052_87; // specific gas constant for dry air, J/(kg·K)
const GAMMA: f64 = 1.4;        // ratio of specific heats

const T0: f64 = 288.15;        // sea-level temperature, K
const P0: f64 = 101_325.0;     // sea-level pressure, Pa

pub const G0: f64 = 9.80665;
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Upper edge of the modeled atmosphere, m AMSL.
pub const MAX_ALTITUDE: f64 = 100_000.0;

/// Atmospheric properties at a given geometric altitude above mean sea level.
#[derive(Debug, Clone, Copy)]
pub struct AtmosphereSample {
    pub altitude: f64,     // m AMSL
    pub temperature: f64,  // K
    pub pressure: f64,     // Pa
    pub density: f64,      // kg/m^3
    pub gravity: f64,      // m/s^2
    pub sound_speed: f64,  // m/s
}

/// Sample the ISA 1976 standard atmosphere.
///
/// Piecewise temperature profile with 7 layers from 0-86 km and an
/// exponential pressure tail from 86-100 km. Clamps negative altitudes to
/// sea level; altitudes above 100 km are outside the model and fail with a
/// domain error. Deterministic and stateless.
pub fn sample(altitude_m: f64) -> Result<AtmosphereSample, SimError> {
    if altitude_m > MAX_ALTITUDE {
        return Err(SimError::Domain {
            quantity: "altitude",
            value: altitude_m,
            min: 0.0,
            max: MAX_ALTITUDE,
        });
    }
    let h = altitude_m.max(0.0);

    let (temperature, pressure) = if h < 11_000.0 {
        // Troposphere: lapse -6.5 K/km
        gradient_layer(h, 0.0, T0, -0.0065, P0)
    } else if h < 20_000.0 {
        // Tropopause: isothermal 216.65 K
        isothermal_layer(h, 11_000.0, 216.65, 22_632.1)
    } else if h < 32_000.0 {
        // Stratosphere I: lapse +1.0 K/km
        gradient_layer(h, 20_000.0, 216.65, 0.001, 5_474.89)
    } else if h < 47_000.0 {
        // Stratosphere II: lapse +2.8 K/km
        gradient_layer(h, 32_000.0, 228.65, 0.0028, 868.019)
    } else if h < 51_000.0 {
        // Mesosphere I: isothermal 270.65 K
        isothermal_layer(h, 47_000.0, 270.65, 110.906)
    } else if h < 71_000.0 {
        // Mesosphere II: lapse -2.8 K/km
        gradient_layer(h, 51_000.0, 270.65, -0.0028, 66.9389)
    } else if h < 86_000.0 {
        // Mesosphere III: lapse -2.0 K/km
        gradient_layer(h, 71_000.0, 214.65, -0.002, 3.956_42)
    } else {
        // 86-100 km: exponential decay, anchored to the 86 km layer edge so
        // pressure stays continuous across the boundary
        let (_, p_base) = gradient_layer(86_000.0, 71_000.0, 214.65, -0.002, 3.956_42);
        let t = 186.87;
        let p = p_base * (-0.000_15 * (h - 86_000.0)).exp();
        (t, p)
    };

    let density = if temperature > 0.0 {
        pressure / (R_AIR * temperature)
    } else {
        0.0
    };

    Ok(AtmosphereSample {
        altitude: h,
        temperature,
        pressure,
        density,
        gravity: gravity(h),
        sound_speed: (GAMMA * R_AIR * temperature).sqrt(),
    })
}

/// Inverse-square gravity at a given altitude above mean sea level.
pub fn gravity(altitude_m: f64) -> f64 {
    let alt = altitude_m.max(0.0);
    G0 * (EARTH_RADIUS / (EARTH_RADIUS + alt)).powi(2)
}

// ---------------------------------------------------------------------------
// Layer helpers
// ---------------------------------------------------------------------------

/// Gradient layer: T = T_base + lapse * (h - h_base)
fn gradient_layer(h: f64, h_base: f64, t_base: f64, lapse: f64, p_base: f64) -> (f64, f64) {
    let t = t_base + lapse * (h - h_base);
    let p = p_base * (t / t_base).powf(-G0 / (lapse * R_AIR));
    (t, p)
}

/// Isothermal layer: T = const, pressure decays exponentially
fn isothermal_layer(h: f64, h_base: f64, t: f64, p_base: f64) -> (f64, f64) {
    let p = p_base * ((-G0 / (R_AIR * t)) * (h - h_base)).exp();
    (t, p)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
