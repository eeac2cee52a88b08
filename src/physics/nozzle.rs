// ---------------------------------------------------------------------------
// Isentropic nozzle-flow relations
// ---------------------------------------------------------------------------
//
// Quasi-1D relations for a converging-diverging nozzle fed by a combustion
// chamber at stagnation pressure `p0`. Used by the internal ballistics
// solver for the chamber discharge term, the exit conditions and the thrust
// coefficient.

/// Critical pressure ratio `(2/(k+1))^(k/(k-1))`.
///
/// The nozzle is choked while `p_ambient / p0` is at or below this value.
pub fn critical_pressure_ratio(k: f64) -> f64 {
    (2.0 / (k + 1.0)).powf(k / (k - 1.0))
}

/// Whether the throat flow is choked for the given pressure pair.
pub fn is_choked(p0: f64, p_ambient: f64, k: f64) -> bool {
    p_ambient / p0 <= critical_pressure_ratio(k)
}

/// Discharge factor H of the chamber-pressure ODE.
///
/// Choked branch: `sqrt(k/(k+1)) * (2/(k+1))^(1/(k-1))`; below the critical
/// pressure ratio the subsonic expression takes over, so the discharge term
/// stays continuous as the nozzle unchokes during tail-off.
pub fn discharge_factor(p0: f64, p_ambient: f64, k: f64) -> f64 {
    if is_choked(p0, p_ambient, k) {
        (k / (k + 1.0)).sqrt() * (2.0 / (k + 1.0)).powf(1.0 / (k - 1.0))
    } else {
        let pr = p_ambient / p0;
        pr.powf(1.0 / k) * ((k / (k - 1.0)) * (1.0 - pr.powf((k - 1.0) / k))).sqrt()
    }
}

/// Nozzle mass flow from the chamber discharge term, kg/s.
///
/// `p0 * At * H * sqrt(2 / (R * T0))` — identical to the standard choked-flow
/// relation when H takes its choked value.
pub fn mass_flow(p0: f64, throat_area: f64, h: f64, gas_constant: f64, flame_temp: f64) -> f64 {
    p0 * throat_area * h * (2.0 / (gas_constant * flame_temp)).sqrt()
}

/// Supersonic exit Mach number for a given expansion (area) ratio.
///
/// Newton iteration on the isentropic area-Mach relation. Returns `None` if
/// the iteration fails to converge, which the caller reports as a numerical
/// error. Requires `expansion_ratio > 1`.
pub fn exit_mach(k: f64, expansion_ratio: f64) -> Option<f64> {
    let area_ratio = |m: f64| -> f64 {
        ((1.0 + 0.5 * (k - 1.0) * m * m) / (1.0 + 0.5 * (k - 1.0)))
            .powf((k + 1.0) / (2.0 * (k - 1.0)))
            / m
    };

    let mut m = 2.0;
    for _ in 0..100 {
        let f = area_ratio(m) - expansion_ratio;
        if f.abs() < 1e-10 * expansion_ratio {
            return Some(m);
        }
        // d/dM of the area-Mach relation
        let a = area_ratio(m) * m;
        let deriv = (a / (m * m)) * (2.0 * m * m - 2.0) / (2.0 + (k - 1.0) * m * m);
        if deriv.abs() < f64::EPSILON {
            return None;
        }
        let mut next = m - f / deriv;
        if next <= 1.0 {
            // Keep the iterate on the supersonic branch
            next = 0.5 * (m + 1.0);
        }
        m = next;
    }
    None
}

/// Static pressure at the nozzle exit plane for a given exit Mach number.
pub fn exit_pressure(k: f64, exit_mach: f64, p0: f64) -> f64 {
    p0 * (1.0 + 0.5 * (k - 1.0) * exit_mach * exit_mach).powf(-k / (k - 1.0))
}

/// Thrust coefficients `(Cf, Cf_ideal)`.
///
/// `Cf_ideal` is the vacuum-referenced momentum term; `Cf` adds the
/// pressure-area term `E * (P_exit - P_ambient) / P0` and applies the
/// efficiency factor. Both are clamped at zero (a deeply overexpanded
/// nozzle produces no negative thrust in this model).
pub fn thrust_coefficients(
    p0: f64,
    p_exit: f64,
    p_ambient: f64,
    expansion_ratio: f64,
    k: f64,
    efficiency: f64,
) -> (f64, f64) {
    let pr = p_exit / p0;
    let cf_ideal = ((2.0 * k * k / (k - 1.0))
        * (2.0 / (k + 1.0)).powf((k + 1.0) / (k - 1.0))
        * (1.0 - pr.powf((k - 1.0) / k)))
        .max(0.0)
        .sqrt();
    let cf = (cf_ideal + expansion_ratio * (p_exit - p_ambient) / p0) * efficiency;
    (cf.max(0.0), cf_ideal.max(0.0))
}

/// Expansion ratio that matches the exit pressure to the ambient pressure.
pub fn optimal_expansion_ratio(k: f64, p0: f64, p_ambient: f64) -> f64 {
    let pr = p_ambient / p0;
    (((k + 1.0) / 2.0).powf(1.0 / (k - 1.0))
        * pr.powf(1.0 / k)
        * (((k + 1.0) / (k - 1.0)) * (1.0 - pr.powf((k - 1.0) / k))).sqrt())
    .recip()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
