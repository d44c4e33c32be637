//! Cross-section morphing toward a rectangle or circle near the mouth.

use crate::geom::Vec2;

use super::outline::RoundedBox;
use super::params::{EdgeType, MorphParams, MorphTarget};

/// Half extents of a cross-section, measured along x and z.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extents {
    pub half_width: f64,
    pub half_height: f64,
}

impl Extents {
    #[must_use]
    pub const fn new(half_width: f64, half_height: f64) -> Self {
        Self {
            half_width,
            half_height,
        }
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.half_width > f64::EPSILON && self.half_height > f64::EPSILON)
    }
}

/// Blend weight at `t`: 0 up to the fixed part, then `((t - f) / (1 - f))^rate`.
#[must_use]
pub fn blend_factor(t: f64, morph: &MorphParams) -> f64 {
    let fixed = morph.fixed_part;
    let span = 1.0 - fixed;
    if t <= fixed || span <= 0.0 || morph.rate <= 0.0 {
        return 0.0;
    }
    ((t - fixed) / span).clamp(0.0, 1.0).powf(morph.rate)
}

/// Target half extents: explicit target dimensions, else the mouth's.
#[must_use]
pub fn target_extents(morph: &MorphParams, mouth: Extents) -> Extents {
    let pick = |full: f64, fallback: f64| if full > 0.0 { full * 0.5 } else { fallback };
    Extents::new(
        pick(morph.target_width, mouth.half_width),
        pick(morph.target_height, mouth.half_height),
    )
}

/// Polar radius of the morph target at azimuth `p`.
#[must_use]
pub fn target_radius(p: f64, morph: &MorphParams, target: Extents) -> f64 {
    match morph.target {
        MorphTarget::Rectangle => RoundedBox::new(
            Vec2::ZERO,
            target.half_width,
            target.half_height,
            morph.corner_radius,
            EdgeType::Rounded,
        )
        .polar_radius(p),
        MorphTarget::Circle => (target.half_width * target.half_height).sqrt(),
    }
}

/// Blends the profile radius `r` at `(t, p)` toward the morph target.
///
/// Without `allow_shrinkage` the result never falls below `r`.
#[must_use]
pub fn apply_morphing(r: f64, t: f64, p: f64, morph: &MorphParams, target: Extents) -> f64 {
    let factor = blend_factor(t, morph);
    if factor <= 0.0 || target.is_degenerate() {
        return r;
    }
    let blended = r + (target_radius(p, morph, target) - r) * factor;
    if morph.allow_shrinkage { blended } else { blended.max(r) }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    use super::*;

    fn morph() -> MorphParams {
        MorphParams {
            fixed_part: 0.5,
            rate: 2.0,
            corner_radius: 10.0,
            ..MorphParams::default()
        }
    }

    #[test]
    fn fixed_part_is_untouched() {
        let m = morph();
        let target = Extents::new(200.0, 100.0);
        assert_eq!(apply_morphing(50.0, 0.3, 0.7, &m, target), 50.0);
        assert_eq!(apply_morphing(50.0, 0.5, 0.7, &m, target), 50.0);
    }

    #[test]
    fn blend_is_continuous_at_fixed_part() {
        let m = morph();
        assert!(blend_factor(0.5 + 1e-9, &m) < 1e-12);
        assert!((blend_factor(1.0, &m) - 1.0).abs() < 1e-12);
        assert!((blend_factor(0.75, &m) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn mouth_reaches_target_rectangle() {
        let m = morph();
        let target = Extents::new(200.0, 100.0);
        assert!((apply_morphing(80.0, 1.0, 0.0, &m, target) - 200.0).abs() < 1e-9);
        assert!((apply_morphing(80.0, 1.0, FRAC_PI_2, &m, target) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn shrinkage_is_clamped_unless_allowed() {
        let mut m = morph();
        let target = Extents::new(50.0, 50.0);
        assert_eq!(apply_morphing(120.0, 1.0, FRAC_PI_4, &m, target), 120.0);
        m.allow_shrinkage = true;
        assert!(apply_morphing(120.0, 1.0, FRAC_PI_4, &m, target) < 120.0);
    }

    #[test]
    fn circle_target_uses_geometric_mean() {
        let m = MorphParams {
            target: MorphTarget::Circle,
            ..morph()
        };
        assert!((target_radius(1.0, &m, Extents::new(200.0, 50.0)) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn explicit_target_dimensions_win() {
        let m = MorphParams {
            target_width: 300.0,
            ..morph()
        };
        let t = target_extents(&m, Extents::new(120.0, 80.0));
        assert_eq!(t, Extents::new(150.0, 80.0));
    }
}
