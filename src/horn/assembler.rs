//! Horn wall assembly: one vertex ring per slice, stitched throat to mouth.
//!
//! Ring `i` holds the points of slice `t_i` at the azimuths of its angle list,
//! placed at `(r cos p, axial, r sin p)`. Consecutive rings of equal size are
//! joined by plain quad strips; rings of different size (adaptive sampling)
//! are merged by azimuth. Every strip follows the same winding convention as
//! the throat cap and the enclosure, so the whole surface is consistently
//! oriented.

use crate::geom::{
    MeshBuilder, ProfileCache, RingSpan, ring_fan_indices, ring_strip_indices, stitch_rings_by_angle,
};

use super::morph::{Extents, apply_morphing};
use super::params::HornParams;
use super::profile::evaluate_profile;

/// Rings of the horn wall as laid out in the builder.
#[derive(Debug, Clone, Default)]
pub struct HornRings {
    pub rings: Vec<RingSpan>,
    pub angles: Vec<Vec<f64>>,
}

impl HornRings {
    #[must_use]
    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    #[must_use]
    pub fn mouth(&self) -> Option<(&RingSpan, &[f64])> {
        Some((self.rings.last()?, self.angles.last()?.as_slice()))
    }
}

/// Evaluates the profile (and morph) for every slice and pushes the rings.
///
/// `slices` and `ring_angles` run in parallel; `morph_target` is the morph
/// target extents when morphing is active.
pub fn push_horn_rings(
    builder: &mut MeshBuilder,
    params: &HornParams,
    slices: &[f64],
    ring_angles: &[Vec<f64>],
    morph_target: Extents,
    cache: &mut ProfileCache,
) -> HornRings {
    let closed = params.sampling.symmetry.is_full();
    let mut rings = Vec::with_capacity(slices.len());
    for (&t, angles) in slices.iter().zip(ring_angles) {
        let points: Vec<[f64; 3]> = angles
            .iter()
            .map(|&p| {
                let point = evaluate_profile(t, p, &params.profile, cache);
                let radius = match &params.morph {
                    Some(morph) => apply_morphing(point.radius, t, p, morph, morph_target),
                    None => point.radius,
                };
                let (sin, cos) = p.sin_cos();
                [radius * cos, point.axial, radius * sin]
            })
            .collect();
        rings.push(builder.push_ring(points, t, closed));
    }
    HornRings {
        rings,
        angles: ring_angles.to_vec(),
    }
}

/// Emits the wall triangles between consecutive rings and tags them `horn`.
pub fn connect_horn_rings(builder: &mut MeshBuilder, horn: &HornRings) {
    let start = builder.triangle_count();
    for (pair, angle_pair) in horn.rings.windows(2).zip(horn.angles.windows(2)) {
        let (a, b) = (&pair[0], &pair[1]);
        let indices = if a.len == b.len {
            ring_strip_indices(a, b)
        } else {
            stitch_rings_by_angle(a, &angle_pair[0], b, &angle_pair[1])
        };
        builder.extend_triangles(&indices);
    }
    builder.tag_group("horn", start);
}

/// Closes the throat with a fan around an on-axis vertex, tagged `source`.
///
/// The apex sits at the mean axial position of the throat ring, so it lies on
/// every mirror plane of a symmetry-reduced mesh.
pub fn cap_throat(builder: &mut MeshBuilder, horn: &HornRings) {
    let Some(throat) = horn.rings.first() else {
        return;
    };
    if throat.len < 2 {
        return;
    }
    let positions = builder.positions();
    let axial = throat.indices().map(|i| positions[i][1]).sum::<f64>() / throat.len as f64;

    let start = builder.triangle_count();
    let apex = builder.push_vertex([0.0, axial, 0.0]);
    let indices = ring_fan_indices(apex, throat, true);
    builder.extend_triangles(&indices);
    builder.tag_group("source", start);
}
