//! Azimuth sampling of the cross-section.
//!
//! Ring point counts that are multiples of four use a shape-aware sampler: one
//! quadrant of a rounded rectangle is split into a straight run, a corner arc
//! and a second straight run, points are spread by arc length with a minimum
//! on the corner, and the quadrant is mirrored into the other three. Mirrored
//! angles are exact (`π - θ`, `π + θ`, `2π - θ`), so symmetric inputs give
//! bit-identical vertices on both sides. Other counts fall back to uniform
//! spacing.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::geom::{ProfileCache, Tolerance, Vec2};

use super::morph::{Extents, target_extents};
use super::params::{HornParams, MorphTarget, Symmetry};
use super::profile::evaluate_profile;

/// Azimuths scanned when measuring the mouth extents.
const EXTENT_SCAN_SAMPLES: usize = 256;

/// Half width and half height of the unmorphed mouth ring.
pub fn measure_mouth_extents(params: &HornParams, cache: &mut ProfileCache) -> Extents {
    let mut extents = Extents::default();
    for i in 0..EXTENT_SCAN_SAMPLES {
        let p = TAU * i as f64 / EXTENT_SCAN_SAMPLES as f64;
        let r = evaluate_profile(1.0, p, &params.profile, cache).radius;
        if !r.is_finite() {
            continue;
        }
        let (sin, cos) = p.sin_cos();
        extents.half_width = extents.half_width.max((r * cos).abs());
        extents.half_height = extents.half_height.max((r * sin).abs());
    }
    extents
}

/// Extents of the cross-section the sampler should follow: the morph target
/// when morphing is on, the raw mouth otherwise.
#[must_use]
pub fn sampling_extents(params: &HornParams, mouth: Extents) -> Extents {
    params
        .morph
        .as_ref()
        .map_or(mouth, |morph| target_extents(morph, mouth))
}

/// Corner radius used for corner placement.
///
/// An explicit sampling radius wins; a rectangular morph contributes its
/// corner radius; otherwise the whole quadrant is treated as corner.
#[must_use]
pub fn sampling_corner_radius(params: &HornParams, extents: Extents) -> f64 {
    let limit = extents.half_width.min(extents.half_height).max(0.0);
    let radius = params.sampling.corner_radius.unwrap_or_else(|| match &params.morph {
        Some(morph) if morph.target == MorphTarget::Rectangle => morph.corner_radius,
        _ => limit,
    });
    radius.clamp(0.0, limit)
}

/// Angle list of the full-resolution ring, reduced to the symmetry domain.
#[must_use]
pub fn build_angle_list(params: &HornParams, extents: Extents) -> Vec<f64> {
    let sampling = &params.sampling;
    sample_angles(
        sampling.angular_segments,
        extents,
        sampling_corner_radius(params, extents),
        sampling.corner_segments,
        sampling.symmetry,
    )
}

/// Samples `segments` full-circle angles and reduces them to `symmetry`.
#[must_use]
pub fn sample_angles(
    segments: usize,
    extents: Extents,
    corner_radius: f64,
    corner_segments: usize,
    symmetry: Symmetry,
) -> Vec<f64> {
    let full = full_circle_angles(segments, extents, corner_radius, corner_segments);
    reduce_to_symmetry(&full, symmetry)
}

/// Per-slice angle lists.
///
/// With adaptive throat segments the point count grows linearly in `t` from
/// the throat count to the full count (kept a multiple of four when the full
/// count is); otherwise every ring shares the same list.
#[must_use]
pub fn ring_angle_lists(params: &HornParams, slices: &[f64], extents: Extents) -> Vec<Vec<f64>> {
    let sampling = &params.sampling;
    let full = build_angle_list(params, extents);
    let Some(throat_count) = sampling.adaptive_throat_segments else {
        return vec![full; slices.len()];
    };

    let max_count = sampling.angular_segments.max(3);
    let min_count = throat_count.clamp(3, max_count);
    let corner_radius = sampling_corner_radius(params, extents);

    let mut lists: Vec<Vec<f64>> = Vec::with_capacity(slices.len());
    let mut previous_count = 0;
    for &t in slices {
        let count = adaptive_count(min_count, max_count, t);
        if count == previous_count {
            if let Some(last) = lists.last() {
                lists.push(last.clone());
                continue;
            }
        }
        previous_count = count;
        let list = if count == max_count {
            full.clone()
        } else {
            sample_angles(count, extents, corner_radius, sampling.corner_segments, sampling.symmetry)
        };
        lists.push(list);
    }
    lists
}

fn adaptive_count(min_count: usize, max_count: usize, t: f64) -> usize {
    let raw = min_count as f64 + (max_count - min_count) as f64 * t.clamp(0.0, 1.0);
    if max_count % 4 == 0 {
        (((raw / 4.0).round() as usize) * 4).clamp(4, max_count)
    } else {
        (raw.round() as usize).clamp(3, max_count)
    }
}

/// Full-circle angles in `[0, 2π)`, starting at 0 and increasing.
#[must_use]
pub fn full_circle_angles(segments: usize, extents: Extents, corner_radius: f64, corner_segments: usize) -> Vec<f64> {
    let segments = segments.max(3);
    if segments % 4 != 0 || extents.is_degenerate() {
        return uniform_angles(segments);
    }

    let quarter = quadrant_angles(segments / 4, extents, corner_radius, corner_segments);
    let nq = quarter.len() - 1;
    let mut out = Vec::with_capacity(segments);
    out.extend_from_slice(&quarter[..nq]);
    out.extend((1..=nq).rev().map(|j| PI - quarter[j]));
    out.extend(quarter[..nq].iter().map(|&theta| PI + theta));
    out.extend((1..=nq).rev().map(|j| TAU - quarter[j]));
    out
}

#[must_use]
pub fn uniform_angles(segments: usize) -> Vec<f64> {
    (0..segments).map(|i| TAU * i as f64 / segments as f64).collect()
}

/// `nq + 1` angles from 0 to π/2 following a rounded-rectangle quadrant.
fn quadrant_angles(nq: usize, extents: Extents, corner_radius: f64, corner_segments: usize) -> Vec<f64> {
    let w = extents.half_width;
    let h = extents.half_height;
    let rc = corner_radius.clamp(0.0, w.min(h));
    const EPS: f64 = 1e-9;

    let side_len = h - rc;
    let corner_len = rc * FRAC_PI_2;
    let top_len = w - rc;
    let has_side = side_len > EPS;
    let has_corner = corner_len > EPS;
    let has_top = top_len > EPS;

    let straight_min = usize::from(has_side) + usize::from(has_top);
    if nq < straight_min + usize::from(has_corner) {
        return (0..=nq).map(|i| FRAC_PI_2 * i as f64 / nq as f64).collect();
    }

    let total = side_len.max(0.0) + corner_len + top_len.max(0.0);
    let mut n_corner = if has_corner {
        let by_length = (nq as f64 * corner_len / total).round() as usize;
        by_length.max(corner_segments.max(1)).min(nq - straight_min)
    } else {
        0
    };
    if !has_side && !has_top {
        n_corner = nq;
    }
    let rest = nq - n_corner;
    let n_side = match (has_side, has_top) {
        (true, true) => {
            let share = (rest as f64 * side_len / (side_len + top_len)).round() as usize;
            share.clamp(1, rest - 1)
        }
        (true, false) => rest,
        _ => 0,
    };
    let n_top = rest - n_side;

    let mut points: Vec<Vec2> = Vec::with_capacity(nq + 1);
    points.extend((0..n_side).map(|i| Vec2::new(w, side_len * i as f64 / n_side as f64)));
    let corner_center = Vec2::new(w - rc, h - rc);
    points.extend((0..n_corner).map(|i| {
        let phi = FRAC_PI_2 * i as f64 / n_corner as f64;
        corner_center + Vec2::from_angle(phi) * rc
    }));
    points.extend((0..n_top).map(|i| Vec2::new((w - rc) * (1.0 - i as f64 / n_top as f64), h)));
    points.push(Vec2::new(0.0, h));

    let mut angles: Vec<f64> = points.iter().map(|p| p.angle()).collect();
    angles[0] = 0.0;
    angles[nq] = FRAC_PI_2;
    angles
}

/// Keeps the angles inside the symmetry domain, snapping near-boundary
/// values onto the mirror planes and inserting missing boundary angles.
#[must_use]
pub fn reduce_to_symmetry(angles: &[f64], symmetry: Symmetry) -> Vec<f64> {
    let (lo, hi) = match symmetry {
        Symmetry::Full => return angles.to_vec(),
        Symmetry::HalfX => (-FRAC_PI_2, FRAC_PI_2),
        Symmetry::HalfZ => (0.0, PI),
        Symmetry::Quarter => (0.0, FRAC_PI_2),
    };
    let eps = Tolerance::ANGLE.eps;

    let mut kept: Vec<f64> = angles
        .iter()
        .map(|&a| {
            let mut a = a;
            while a < lo - eps {
                a += TAU;
            }
            while a >= lo - eps + TAU {
                a -= TAU;
            }
            a
        })
        .filter(|&a| a <= hi + eps)
        .map(|a| {
            if (a - lo).abs() <= eps {
                lo
            } else if (a - hi).abs() <= eps {
                hi
            } else {
                a
            }
        })
        .collect();
    kept.sort_by(f64::total_cmp);
    kept.dedup_by(|b, a| (*b - *a).abs() <= eps);

    if kept.first() != Some(&lo) {
        kept.insert(0, lo);
    }
    if kept.last() != Some(&hi) {
        kept.push(hi);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extents() -> Extents {
        Extents::new(150.0, 90.0)
    }

    #[test]
    fn quadrant_sampler_mirrors_exactly() {
        let angles = full_circle_angles(40, extents(), 30.0, 3);
        assert_eq!(angles.len(), 40);
        assert_eq!(angles[0], 0.0);
        assert_eq!(angles[10], FRAC_PI_2);
        assert_eq!(angles[20], PI);
        assert!(angles.windows(2).all(|w| w[1] > w[0]));
        for j in 1..10 {
            assert_eq!(angles[20 - j], PI - angles[j]);
            assert_eq!(angles[20 + j], PI + angles[j]);
            assert_eq!(angles[40 - j], TAU - angles[j]);
        }
    }

    #[test]
    fn corner_gets_minimum_segments() {
        let q = quadrant_angles(6, extents(), 5.0, 3);
        let corner_start = (90.0 - 5.0_f64).atan2(150.0);
        let corner_end = 90.0_f64.atan2(150.0 - 5.0);
        let in_corner = q.iter().filter(|&&a| a > corner_start + 1e-12 && a <= corner_end).count();
        assert!(in_corner >= 3, "{q:?}");
    }

    #[test]
    fn non_multiple_of_four_is_uniform() {
        let angles = full_circle_angles(6, extents(), 30.0, 3);
        assert_eq!(angles.len(), 6);
        assert!((angles[1] - TAU / 6.0).abs() < 1e-15);
    }

    #[test]
    fn half_x_keeps_right_side_with_boundaries() {
        let full = full_circle_angles(16, extents(), 20.0, 2);
        let half = reduce_to_symmetry(&full, Symmetry::HalfX);
        assert_eq!(half.first().copied(), Some(-FRAC_PI_2));
        assert_eq!(half.last().copied(), Some(FRAC_PI_2));
        assert_eq!(half.len(), 9);
        assert!(half.iter().all(|a| a.cos() >= -1e-12));
    }

    #[test]
    fn quarter_inserts_missing_boundary() {
        let quarter = reduce_to_symmetry(&uniform_angles(6), Symmetry::Quarter);
        assert_eq!(quarter, vec![0.0, TAU / 6.0, FRAC_PI_2]);
    }

    #[test]
    fn adaptive_counts_stay_multiples_of_four() {
        assert_eq!(adaptive_count(16, 64, 0.0), 16);
        assert_eq!(adaptive_count(16, 64, 1.0), 64);
        assert_eq!(adaptive_count(16, 64, 0.3) % 4, 0);
    }
}
