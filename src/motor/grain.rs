use std::f64::consts::PI;

use crate::error::SimError;

// ---------------------------------------------------------------------------
// Grain geometry: regression of the burning surface
// ---------------------------------------------------------------------------
//
// Every query is a pure function of the burned web distance (the normal
// distance the surface has regressed since ignition); regression state lives
// in the solver loop, not in the segment. Shapes are a closed set of
// variants so the supported geometries stay exhaustively checkable.

/// Cross-section variants of a grain segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentShape {
    /// Full-bore cylindrical segment with a central circular core.
    Bates { core_diameter: f64 },
    /// Circular cross-section truncated by a flat slot face at
    /// `slot_offset` from the axis; the flat face regresses toward the far
    /// wall.
    DSlot { slot_offset: f64 },
}

/// One segment of the propellant grain stack.
#[derive(Debug, Clone, PartialEq)]
pub struct GrainSegment {
    outer_diameter: f64,
    length: f64,
    spacing: f64,
    inhibited_ends: u8,
    shape: SegmentShape,
}

impl GrainSegment {
    /// Cylindrical (BATES) segment.
    pub fn bates(
        outer_diameter: f64,
        core_diameter: f64,
        length: f64,
        spacing: f64,
        inhibited_ends: u8,
    ) -> Result<Self, SimError> {
        validate_common(outer_diameter, length, spacing, inhibited_ends)?;
        if !(core_diameter > 0.0) {
            return Err(SimError::config("core_diameter", "must be strictly positive"));
        }
        if core_diameter >= outer_diameter {
            return Err(SimError::config(
                "core_diameter",
                format!("{} must be smaller than outer diameter {}", core_diameter, outer_diameter),
            ));
        }
        Ok(Self {
            outer_diameter,
            length,
            spacing,
            inhibited_ends,
            shape: SegmentShape::Bates { core_diameter },
        })
    }

    /// D-shaped segment with an off-center slot face.
    pub fn d_slot(
        outer_diameter: f64,
        slot_offset: f64,
        length: f64,
        spacing: f64,
        inhibited_ends: u8,
    ) -> Result<Self, SimError> {
        validate_common(outer_diameter, length, spacing, inhibited_ends)?;
        if slot_offset < 0.0 {
            return Err(SimError::config("slot_offset", "must be non-negative"));
        }
        if slot_offset >= outer_diameter / 2.0 {
            return Err(SimError::config(
                "slot_offset",
                format!(
                    "{} must lie inside the cross-section (outer radius {})",
                    slot_offset,
                    outer_diameter / 2.0
                ),
            ));
        }
        Ok(Self {
            outer_diameter,
            length,
            spacing,
            inhibited_ends,
            shape: SegmentShape::DSlot { slot_offset },
        })
    }

    pub fn outer_diameter(&self) -> f64 { self.outer_diameter }
    pub fn length(&self) -> f64 { self.length }
    pub fn spacing(&self) -> f64 { self.spacing }
    pub fn inhibited_ends(&self) -> u8 { self.inhibited_ends }
    pub fn shape(&self) -> SegmentShape { self.shape }

    /// Number of uninhibited (burning) end faces.
    fn burning_faces(&self) -> f64 {
        f64::from(2 - self.inhibited_ends)
    }

    /// Web distance at which the segment is geometrically exhausted.
    pub fn max_web(&self) -> f64 {
        let faces = self.burning_faces();
        let axial = if faces > 0.0 { self.length / faces } else { f64::INFINITY };
        let radial = match self.shape {
            SegmentShape::Bates { core_diameter } => 0.5 * (self.outer_diameter - core_diameter),
            // The slot face sweeps from the offset chord to the far wall
            SegmentShape::DSlot { slot_offset } => slot_offset + 0.5 * self.outer_diameter,
        };
        radial.min(axial)
    }

    pub fn is_burned_out(&self, web: f64) -> bool {
        web >= self.max_web()
    }

    /// Instantaneous burning surface area, m^2. Exactly zero at and after
    /// exhaustion, never negative.
    pub fn burn_area(&self, web: f64) -> f64 {
        if web < 0.0 || self.is_burned_out(web) {
            return if web < 0.0 { self.burn_area(0.0) } else { 0.0 };
        }
        let n = self.burning_faces();
        let len = self.length - n * web;
        match self.shape {
            SegmentShape::Bates { core_diameter } => {
                let d = core_diameter + 2.0 * web;
                let faces = n * (PI / 4.0) * (self.outer_diameter.powi(2) - d.powi(2));
                let core = PI * d * len;
                (faces + core).max(0.0)
            }
            SegmentShape::DSlot { slot_offset } => {
                let r = 0.5 * self.outer_diameter;
                let d = slot_offset - web;
                let chord = 2.0 * (r * r - d * d).max(0.0).sqrt();
                (chord * len + n * circular_section_area(r, d)).max(0.0)
            }
        }
    }

    /// Remaining propellant volume, m^3. Exactly zero at and after
    /// exhaustion, never negative; monotone non-increasing in web.
    pub fn propellant_volume(&self, web: f64) -> f64 {
        if web < 0.0 || self.is_burned_out(web) {
            return if web < 0.0 { self.propellant_volume(0.0) } else { 0.0 };
        }
        let n = self.burning_faces();
        let len = self.length - n * web;
        match self.shape {
            SegmentShape::Bates { core_diameter } => {
                let d = core_diameter + 2.0 * web;
                ((PI / 4.0) * (self.outer_diameter.powi(2) - d.powi(2)) * len).max(0.0)
            }
            SegmentShape::DSlot { slot_offset } => {
                let r = 0.5 * self.outer_diameter;
                (circular_section_area(r, slot_offset - web) * len).max(0.0)
            }
        }
    }

    /// Segment length giving a neutral burn profile (BATES only).
    pub fn optimal_length(&self) -> Option<f64> {
        match self.shape {
            SegmentShape::Bates { core_diameter } => {
                Some(0.5 * (3.0 * self.outer_diameter + core_diameter))
            }
            SegmentShape::DSlot { .. } => None,
        }
    }
}

fn validate_common(
    outer_diameter: f64,
    length: f64,
    spacing: f64,
    inhibited_ends: u8,
) -> Result<(), SimError> {
    if !(outer_diameter > 0.0) {
        return Err(SimError::config("outer_diameter", "must be strictly positive"));
    }
    if !(length > 0.0) {
        return Err(SimError::config("length", "must be strictly positive"));
    }
    if spacing < 0.0 {
        return Err(SimError::config("spacing", "must be non-negative"));
    }
    if inhibited_ends > 2 {
        return Err(SimError::config(
            "inhibited_ends",
            format!("{} is not in 0..=2", inhibited_ends),
        ));
    }
    Ok(())
}

/// Area of the circular cross-section of radius `r` on the propellant side
/// of a chord at signed distance `d` from the center (`d = r` keeps the full
/// disc, `d = -r` leaves nothing).
fn circular_section_area(r: f64, d: f64) -> f64 {
    let d = d.clamp(-r, r);
    let cap = r * r * (d / r).acos() - d * (r * r - d * d).max(0.0).sqrt();
    (PI * r * r - cap).max(0.0)
}

// ---------------------------------------------------------------------------
// Grain stack
// ---------------------------------------------------------------------------

/// Ordered stack of grain segments burning at a common web distance.
#[derive(Debug, Clone)]
pub struct Grain {
    segments: Vec<GrainSegment>,
}

impl Grain {
    pub fn new(segments: Vec<GrainSegment>) -> Result<Self, SimError> {
        if segments.is_empty() {
            return Err(SimError::config("segments", "grain needs at least one segment"));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[GrainSegment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Total burning surface area across segments, m^2.
    pub fn burn_area(&self, web: f64) -> f64 {
        self.segments.iter().map(|s| s.burn_area(web)).sum()
    }

    /// Total remaining propellant volume, m^3.
    pub fn propellant_volume(&self, web: f64) -> f64 {
        self.segments.iter().map(|s| s.propellant_volume(web)).sum()
    }

    /// All segments exhausted.
    pub fn is_burned_out(&self, web: f64) -> bool {
        self.segments.iter().all(|s| s.is_burned_out(web))
    }

    /// Web distance at which the last surviving segment is exhausted.
    pub fn max_web(&self) -> f64 {
        self.segments
            .iter()
            .map(GrainSegment::max_web)
            .fold(0.0, f64::max)
    }

    /// Axial extent of the stack: segment lengths plus the gaps between
    /// consecutive segments.
    pub fn total_length(&self) -> f64 {
        let lengths: f64 = self.segments.iter().map(|s| s.length()).sum();
        let gaps: f64 = self
            .segments
            .iter()
            .take(self.segments.len() - 1)
            .map(|s| s.spacing())
            .sum();
        lengths + gaps
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bates() -> GrainSegment {
        GrainSegment::bates(103e-3, 42e-3, 176e-3, 10e-3, 0).unwrap()
    }

    #[test]
    fn bates_initial_area_matches_closed_form() {
        let s = bates();
        // pi * [(Do^2 - Dc^2)/2 + L * Dc] with both end faces burning
        let expected = PI
            * ((103e-3_f64.powi(2) - 42e-3_f64.powi(2)) / 2.0 + 176e-3 * 42e-3);
        assert_relative_eq!(s.burn_area(0.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn bates_initial_volume_matches_closed_form() {
        let s = bates();
        let expected = (PI / 4.0)
            * (103e-3_f64.powi(2) - 42e-3_f64.powi(2))
            * 176e-3;
        assert_relative_eq!(s.propellant_volume(0.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn exhaustion_is_exactly_zero() {
        let s = bates();
        let w = s.max_web();
        assert_eq!(s.burn_area(w), 0.0);
        assert_eq!(s.propellant_volume(w), 0.0);
        assert_eq!(s.burn_area(w + 1e-3), 0.0);
        assert!(s.is_burned_out(w));
    }

    #[test]
    fn quantities_non_negative_over_full_web_range() {
        let segments = [
            bates(),
            GrainSegment::bates(60e-3, 20e-3, 120e-3, 10e-3, 2).unwrap(),
            GrainSegment::d_slot(100e-3, 30e-3, 120e-3, 10e-3, 0).unwrap(),
            GrainSegment::d_slot(100e-3, 0.0, 120e-3, 10e-3, 2).unwrap(),
        ];
        for s in &segments {
            let w_max = s.max_web();
            let mut prev_volume = f64::INFINITY;
            for i in 0..=1000 {
                let w = w_max * i as f64 / 1000.0;
                let a = s.burn_area(w);
                let v = s.propellant_volume(w);
                assert!(a >= 0.0 && v >= 0.0, "negative at web {}", w);
                assert!(v <= prev_volume + 1e-12, "volume rose at web {}", w);
                prev_volume = v;
            }
        }
    }

    #[test]
    fn inhibited_ends_reduce_initial_area() {
        let open = GrainSegment::bates(103e-3, 42e-3, 176e-3, 10e-3, 0).unwrap();
        let one = GrainSegment::bates(103e-3, 42e-3, 176e-3, 10e-3, 1).unwrap();
        let both = GrainSegment::bates(103e-3, 42e-3, 176e-3, 10e-3, 2).unwrap();
        assert!(open.burn_area(0.0) > one.burn_area(0.0));
        assert!(one.burn_area(0.0) > both.burn_area(0.0));
    }

    #[test]
    fn invalid_inhibited_ends_rejected() {
        let e = GrainSegment::bates(103e-3, 42e-3, 176e-3, 10e-3, 3);
        assert!(matches!(e, Err(SimError::Config { parameter: "inhibited_ends", .. })));
    }

    #[test]
    fn negative_spacing_rejected() {
        let e = GrainSegment::bates(103e-3, 42e-3, 176e-3, -1e-3, 0);
        assert!(matches!(e, Err(SimError::Config { parameter: "spacing", .. })));
    }

    #[test]
    fn valid_spacing_and_all_inhibited_variants_accepted() {
        for ends in 0..=2 {
            assert!(GrainSegment::bates(103e-3, 42e-3, 176e-3, 10e-3, ends).is_ok());
        }
    }

    #[test]
    fn d_slot_offset_bounds_enforced() {
        assert!(matches!(
            GrainSegment::d_slot(100e-3, -5e-3, 120e-3, 10e-3, 0),
            Err(SimError::Config { parameter: "slot_offset", .. })
        ));
        assert!(matches!(
            GrainSegment::d_slot(100e-3, 55e-3, 120e-3, 10e-3, 0),
            Err(SimError::Config { parameter: "slot_offset", .. })
        ));
        assert!(GrainSegment::d_slot(100e-3, 30e-3, 120e-3, 10e-3, 0).is_ok());
    }

    #[test]
    fn d_slot_initial_volume_is_truncated_disc() {
        let s = GrainSegment::d_slot(100e-3, 0.0, 120e-3, 10e-3, 2).unwrap();
        // Slot face through the axis: exactly half the disc remains
        let expected = 0.5 * PI * 50e-3_f64.powi(2) * 120e-3;
        assert_relative_eq!(s.propellant_volume(0.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn d_slot_exhausts_at_far_wall() {
        let s = GrainSegment::d_slot(100e-3, 30e-3, 120e-3, 10e-3, 2).unwrap();
        // Inhibited ends: exhaustion is radial only, offset + R
        assert_relative_eq!(s.max_web(), 30e-3 + 50e-3, epsilon = 1e-15);
    }

    #[test]
    fn grain_sums_segments() {
        let grain = Grain::new(vec![bates(), bates()]).unwrap();
        let s = bates();
        assert_relative_eq!(grain.burn_area(1e-3), 2.0 * s.burn_area(1e-3), epsilon = 1e-12);
        assert_relative_eq!(
            grain.propellant_volume(1e-3),
            2.0 * s.propellant_volume(1e-3),
            epsilon = 1e-12
        );
        assert_relative_eq!(grain.total_length(), 2.0 * 176e-3 + 10e-3, epsilon = 1e-12);
    }

    #[test]
    fn empty_grain_rejected() {
        assert!(matches!(Grain::new(vec![]), Err(SimError::Config { .. })));
    }
}
