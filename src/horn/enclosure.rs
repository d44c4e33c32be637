//! Rectangular enclosure behind the horn mouth.
//!
//! The box is the mouth's bounding rectangle grown by the baffle margins. Its
//! outline is ray-cast from the box center at sampled angles to give outer
//! points with normals; the inset outline (outer point moved inward by the
//! edge radius) carries the flat front and rear panels. Rings are emitted in
//! one chain, front to back:
//!
//! ```text
//! mouth ring ─zipper→ front inset ─fan→ front outer ─sidewall→ [interface]
//!            ─sidewall→ rear outer ─fan→ rear inset ─cap→ rear centroid
//! ```
//!
//! The strip behind the optional interface ring is emitted last so it forms
//! its own contiguous `interface` group.

use crate::geom::{MeshBuilder, RingSpan, Vec2, ring_fan_indices, ring_strip_indices, zipper_stitch};

use super::angles::sample_angles;
use super::morph::Extents;
use super::outline::{OutlinePoint, RoundedBox};
use super::params::{EdgeType, EnclosureParams, Symmetry};

/// Zipper fans longer than this are reported as a warning.
pub const LONG_FAN_WARNING: usize = 8;

/// Outcome of [`append_enclosure`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnclosureBuild {
    /// Outer outline of the box, after clamping.
    pub outline: Option<RoundedBox>,
    /// Edge radius actually used.
    pub edge_radius: f64,
    pub ring_count: usize,
    pub longest_fan: usize,
    pub warnings: Vec<String>,
}

/// Options the enclosure shares with the horn sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnclosureSampling {
    pub symmetry: Symmetry,
    pub corner_segments: usize,
}

/// Appends the enclosure behind `mouth` and tags its triangles.
pub fn append_enclosure(
    builder: &mut MeshBuilder,
    mouth: &RingSpan,
    params: &EnclosureParams,
    sampling: EnclosureSampling,
) -> EnclosureBuild {
    let mut out = EnclosureBuild::default();
    if mouth.len < 2 {
        out.warnings.push("enclosure skipped: mouth ring has fewer than 2 points".to_string());
        return out;
    }

    let positions = builder.positions();
    let mouth_points: Vec<[f64; 3]> = mouth.indices().map(|i| positions[i]).collect();
    let outline = enclosure_outline(&mouth_points, params, sampling.symmetry);
    let y_mouth = mouth_points
        .iter()
        .map(|p| p[1])
        .filter(|y| y.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !y_mouth.is_finite() {
        out.warnings.push("enclosure skipped: mouth ring is not finite".to_string());
        return out;
    }

    let depth = params.depth.max(f64::EPSILON);
    let edge_radius = clamp_edge_radius(params, outline, depth, &mut out.warnings);
    let outline = RoundedBox::new(
        outline.center,
        outline.half_width,
        outline.half_height,
        params.corner_radius.max(edge_radius),
        params.edge_type,
    );
    out.outline = Some(outline);
    out.edge_radius = edge_radius;

    let segments = params
        .angular_segments
        .unwrap_or_else(|| sampling.symmetry.full_circle_count(mouth.len));
    let angles = sample_angles(
        segments,
        Extents::new(outline.half_width, outline.half_height),
        outline.corner,
        sampling.corner_segments,
        sampling.symmetry,
    );
    let outer: Vec<OutlinePoint> = angles.iter().map(|&a| outline.ray_hit(a)).collect();

    let y_rear = y_mouth - depth;
    let layout = RingLayout::new(params, edge_radius, y_mouth, y_rear, &mut out.warnings);
    let closed = mouth.closed;
    let rings: Vec<RingSpan> = layout
        .stations
        .iter()
        .map(|station| {
            let points = outer.iter().map(|point| station.place(point, edge_radius).at_axial(station.y));
            builder.push_ring(points, 1.0, closed)
        })
        .collect();
    let rear_apex = builder.push_vertex(outline.center.at_axial(y_rear));
    out.ring_count = rings.len();

    let enclosure_start = builder.triangle_count();
    let (mouth_start, ring_start) = zipper_starts(builder.positions(), mouth, &rings[0], outline.center);
    let zipper = zipper_stitch(mouth, mouth_start, &rings[0], ring_start);
    builder.extend_triangles(&zipper.indices);
    out.longest_fan = zipper.longest_fan;
    if zipper.longest_fan > LONG_FAN_WARNING {
        let warning = format!(
            "mouth-to-enclosure zipper has a fan of {} triangles from one vertex",
            zipper.longest_fan
        );
        log::warn!("{warning}");
        out.warnings.push(warning);
    }

    let mut interface_strip = None;
    for (k, pair) in rings.windows(2).enumerate() {
        if layout.interface == Some(k) {
            interface_strip = Some((pair[0], pair[1]));
            continue;
        }
        builder.extend_triangles(&ring_strip_indices(&pair[0], &pair[1]));
    }
    if let Some(rear) = rings.last() {
        builder.extend_triangles(&ring_fan_indices(rear_apex, rear, false));
    }
    builder.tag_group("enclosure", enclosure_start);

    if let Some((a, b)) = interface_strip {
        let interface_start = builder.triangle_count();
        builder.extend_triangles(&ring_strip_indices(&a, &b));
        builder.tag_group("interface", interface_start);
    }

    log::debug!(
        "enclosure: {} rings x {} points, edge radius {edge_radius:.3}, longest fan {}",
        out.ring_count,
        outer.len(),
        out.longest_fan
    );
    out
}

/// Outer box around the mouth points (before edge clamping).
///
/// For symmetry-reduced meshes the kept half is mirrored so the box is
/// centered on the mirror plane(s).
#[must_use]
pub fn enclosure_outline(mouth_points: &[[f64; 3]], params: &EnclosureParams, symmetry: Symmetry) -> RoundedBox {
    let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
    let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in mouth_points.iter().filter(|p| p[0].is_finite() && p[2].is_finite()) {
        min = Vec2::new(min.x.min(p[0]), min.z.min(p[2]));
        max = Vec2::new(max.x.max(p[0]), max.z.max(p[2]));
    }
    if !(min.x <= max.x && min.z <= max.z) {
        min = Vec2::ZERO;
        max = Vec2::ZERO;
    }

    let spacing = params.spacing;
    let (mut left, right, top, mut bottom) = (
        spacing.left.max(0.0),
        spacing.right.max(0.0),
        spacing.top.max(0.0),
        spacing.bottom.max(0.0),
    );
    if matches!(symmetry, Symmetry::HalfX | Symmetry::Quarter) {
        min.x = -max.x.abs().max(min.x.abs());
        max.x = -min.x;
        left = right;
    }
    if matches!(symmetry, Symmetry::HalfZ | Symmetry::Quarter) {
        min.z = -max.z.abs().max(min.z.abs());
        max.z = -min.z;
        bottom = top;
    }

    let lo = Vec2::new(min.x - left, min.z - bottom);
    let hi = Vec2::new(max.x + right, max.z + top);
    RoundedBox::new(
        lo.lerp(hi, 0.5),
        (hi.x - lo.x) * 0.5,
        (hi.z - lo.z) * 0.5,
        params.corner_radius,
        params.edge_type,
    )
}

/// Limits the edge radius so the inset outline stays outside the mouth and
/// the front and rear edges never overlap.
fn clamp_edge_radius(params: &EnclosureParams, outline: RoundedBox, depth: f64, warnings: &mut Vec<String>) -> f64 {
    let requested = params.edge_radius.max(0.0);
    let limit = params
        .spacing
        .min()
        .max(0.0)
        .min(outline.half_width.min(outline.half_height) * 0.99)
        .min(depth * 0.5);
    if requested > limit {
        let warning = format!("enclosure edge radius {requested} clamped to {limit:.3}");
        log::warn!("{warning}");
        warnings.push(warning);
        return limit;
    }
    requested
}

/// Start indices for the mouth zipper: on closed rings the enclosure cursor
/// starts at the point nearest in azimuth to the mouth's first vertex.
fn zipper_starts(positions: &[[f64; 3]], mouth: &RingSpan, ring: &RingSpan, center: Vec2) -> (usize, usize) {
    if !mouth.closed || !ring.closed {
        return (0, 0);
    }
    let azimuth = |index: usize| {
        let p = positions[index];
        (Vec2::new(p[0], p[2]) - center).angle()
    };
    let reference = azimuth(mouth.start as usize);
    let nearest = ring
        .indices()
        .enumerate()
        .map(|(k, index)| {
            let delta = (azimuth(index) - reference).rem_euclid(std::f64::consts::TAU);
            (k, delta.min(std::f64::consts::TAU - delta))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(0, |(k, _)| k);
    (0, nearest)
}

/// Where one enclosure ring sits: its axial position and how far it has
/// moved from the inset outline toward the outer outline.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Station {
    y: f64,
    /// 0 = inset outline, 1 = outer outline.
    blend: f64,
}

impl Station {
    fn place(&self, outer: &OutlinePoint, edge_radius: f64) -> Vec2 {
        let inset = outer.inset(edge_radius);
        inset.lerp(outer.position, self.blend)
    }
}

struct RingLayout {
    stations: Vec<Station>,
    /// Index of the interface ring; the strip starting there forms the
    /// `interface` group.
    interface: Option<usize>,
}

impl RingLayout {
    fn new(params: &EnclosureParams, edge_radius: f64, y_mouth: f64, y_rear: f64, warnings: &mut Vec<String>) -> Self {
        use std::f64::consts::FRAC_PI_2;

        let mut stations = vec![Station { y: y_mouth, blend: 0.0 }];
        let has_edge = edge_radius > 1e-9;
        let segments = params.edge_segments.max(1);
        let rounded = params.edge_type == EdgeType::Rounded;

        // Front edge: from the inset ring on the baffle to the outer sidewall.
        if has_edge {
            for s in 1..=segments {
                let u = s as f64 / segments as f64;
                let (blend, drop) = if rounded {
                    let theta = u * FRAC_PI_2;
                    (theta.sin(), 1.0 - theta.cos())
                } else {
                    (u, u)
                };
                stations.push(Station {
                    y: y_mouth - edge_radius * drop,
                    blend,
                });
            }
        } else {
            stations[0].blend = 1.0;
        }

        let front_y = y_mouth - edge_radius;
        let back_y = y_rear + edge_radius;
        let mut interface = None;
        if params.interface_offset.abs() > 0.0 {
            let wanted = front_y - params.interface_offset.abs();
            let margin = 1e-6 * (1.0 + (front_y - back_y).abs());
            if front_y - back_y > 2.0 * margin {
                let y = wanted.clamp(back_y + margin, front_y - margin);
                if (y - wanted).abs() > margin {
                    warnings.push(format!("enclosure interface offset clamped to {:.3}", front_y - y));
                }
                interface = Some(stations.len());
                stations.push(Station { y, blend: 1.0 });
            } else {
                warnings.push("enclosure interface ring skipped: sidewall has no length".to_string());
            }
        }
        // Sidewall end; shared with the front edge when depth == 2 * edge.
        if front_y - back_y > 1e-9 || !has_edge {
            stations.push(Station { y: back_y, blend: 1.0 });
        }

        if has_edge {
            for s in 1..=segments {
                let u = s as f64 / segments as f64;
                let (blend, rise) = if rounded {
                    let theta = u * FRAC_PI_2;
                    (theta.cos(), theta.sin())
                } else {
                    (1.0 - u, u)
                };
                stations.push(Station {
                    y: back_y - edge_radius * rise,
                    blend,
                });
            }
        }

        Self { stations, interface }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{QualityOptions, validate_mesh};
    use crate::horn::angles::uniform_angles;
    use crate::horn::params::EnclosureSpacing;

    fn circle_mouth(builder: &mut MeshBuilder, count: usize, radius: f64, closed: bool) -> RingSpan {
        let angles = if closed {
            uniform_angles(count)
        } else {
            (0..count)
                .map(|i| -std::f64::consts::FRAC_PI_2 + std::f64::consts::PI * i as f64 / (count - 1) as f64)
                .collect()
        };
        let points: Vec<[f64; 3]> = angles
            .iter()
            .map(|a| [radius * a.cos(), 100.0, radius * a.sin()])
            .collect();
        builder.push_ring(points, 1.0, closed)
    }

    fn sampling(symmetry: Symmetry) -> EnclosureSampling {
        EnclosureSampling {
            symmetry,
            corner_segments: 3,
        }
    }

    #[test]
    fn layout_rounded_edges_span_depth() {
        let params = EnclosureParams {
            edge_segments: 4,
            ..EnclosureParams::default()
        };
        let mut warnings = Vec::new();
        let layout = RingLayout::new(&params, 10.0, 0.0, -100.0, &mut warnings);
        assert_eq!(layout.stations.len(), 1 + 4 + 1 + 4);
        assert_eq!(layout.stations[0].y, 0.0);
        assert!((layout.stations[4].y + 10.0).abs() < 1e-12);
        assert!((layout.stations.last().map_or(0.0, |s| s.y) + 100.0).abs() < 1e-12);
        assert!(layout.interface.is_none());
    }

    #[test]
    fn interface_strip_follows_its_ring() {
        let params = EnclosureParams {
            edge_segments: 2,
            interface_offset: 30.0,
            ..EnclosureParams::default()
        };
        let mut warnings = Vec::new();
        let layout = RingLayout::new(&params, 10.0, 0.0, -200.0, &mut warnings);
        let k = layout.interface.expect("interface strip");
        assert!((layout.stations[k].y + 40.0).abs() < 1e-9);
        assert!((layout.stations[k + 1].y + 190.0).abs() < 1e-9);
        assert!(warnings.is_empty());
    }

    #[test]
    fn edge_radius_is_clamped_by_spacing_and_depth() {
        let params = EnclosureParams {
            edge_radius: 40.0,
            depth: 50.0,
            spacing: EnclosureSpacing::uniform(30.0),
            ..EnclosureParams::default()
        };
        let outline = RoundedBox::new(Vec2::ZERO, 100.0, 80.0, 0.0, EdgeType::Rounded);
        let mut warnings = Vec::new();
        assert_eq!(clamp_edge_radius(&params, outline, 50.0, &mut warnings), 25.0);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn closed_enclosure_on_disc_is_watertight() {
        let mut builder = MeshBuilder::new();
        let mouth = circle_mouth(&mut builder, 24, 60.0, true);
        // Close the mouth disc so the solid has no other opening.
        let start = builder.triangle_count();
        let apex = builder.push_vertex([0.0, 100.0, 0.0]);
        builder.extend_triangles(&ring_fan_indices(apex, &mouth, true));
        builder.tag_group("horn", start);

        let params = EnclosureParams {
            depth: 50.0,
            edge_radius: 5.0,
            spacing: EnclosureSpacing::uniform(30.0),
            ..EnclosureParams::default()
        };
        let build = append_enclosure(&mut builder, &mouth, &params, sampling(Symmetry::Full));
        assert_eq!(build.edge_radius, 5.0);
        let mesh = builder.finish(1, true).expect("valid buffers");
        let report = validate_mesh(&mesh.positions, &mesh.indices, &mesh.groups, &QualityOptions::default());
        assert_eq!(report.boundary_edge_count, 0, "{report}");
        assert_eq!(report.non_manifold_edge_count, 0);
        assert_eq!(report.component_count, 1);
        assert!(report.seam.as_ref().is_some_and(|seam| seam.is_consistent()));
    }

    #[test]
    fn chamfered_corners_follow_the_chamfer_line() {
        let mut builder = MeshBuilder::new();
        let mouth = circle_mouth(&mut builder, 24, 60.0, true);
        let params = EnclosureParams {
            edge_radius: 0.0,
            edge_type: EdgeType::Chamfered,
            corner_radius: 20.0,
            angular_segments: Some(48),
            ..EnclosureParams::default()
        };
        let build = append_enclosure(&mut builder, &mouth, &params, sampling(Symmetry::Full));
        let outline = build.outline.expect("outline");
        assert_eq!(outline.style, EdgeType::Chamfered);

        let (w, h, rc) = (outline.half_width, outline.half_height, outline.corner);
        let mut corner_points = 0;
        for ring in &builder.rings()[1..] {
            for i in ring.indices() {
                let p = builder.positions()[i];
                let (x, z) = ((p[0] - outline.center.x).abs(), (p[2] - outline.center.z).abs());
                if x > w - rc + 1e-9 && z > h - rc + 1e-9 {
                    corner_points += 1;
                    assert!((x + z - (w + h - rc)).abs() < 1e-9, "({x}, {z}) off the chamfer");
                }
            }
        }
        assert!(corner_points > 0);
    }

    #[test]
    fn half_enclosure_is_centered_on_the_mirror_plane() {
        let mut builder = MeshBuilder::new();
        let mouth = circle_mouth(&mut builder, 13, 60.0, false);
        let params = EnclosureParams::default();
        let build = append_enclosure(&mut builder, &mouth, &params, sampling(Symmetry::HalfX));
        let outline = build.outline.expect("outline");
        assert!(outline.center.x.abs() < 1e-9);
        assert!((outline.half_width - 85.0).abs() < 1e-9);
        assert_eq!(build.longest_fan, 1);
    }
}
