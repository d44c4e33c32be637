//! Ring-to-ring triangulation.
//!
//! Every routine here walks two rings "forward" from ring `a` to ring `b` and
//! emits triangles as `(a_i, a_{i+1}, b_j)` or `(a_i, b_{j+1}, b_j)`: ring `a`
//! is traversed forward and ring `b` backward. As long as each ring is ordered
//! by increasing azimuth, consecutive strips share their edges in opposite
//! directions, so a chain of strips is consistently wound whatever the
//! geometry of the individual rings. For a horn wall (rings growing along +Y
//! with azimuth from +X toward +Z) the normals point toward the axis, which is
//! outward for the solid between the wall and the enclosure.

use super::mesh::RingSpan;

/// Result of a greedy zipper stitch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZipperStitch {
    pub indices: Vec<u32>,
    /// Longest run of triangles sharing a single apex vertex.
    pub longest_fan: usize,
}

impl ZipperStitch {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Two triangles per quad between equally sized rings.
///
/// Open rings omit the wrap-around quad. When ring sizes differ the extra
/// points of the larger ring are ignored; use [`stitch_rings_by_angle`] instead.
#[must_use]
pub fn ring_strip_indices(a: &RingSpan, b: &RingSpan) -> Vec<u32> {
    let n = a.len.min(b.len);
    let closed = a.closed && b.closed;
    let quads = if closed { n } else { n.saturating_sub(1) };
    let mut indices = Vec::with_capacity(quads * 6);

    for j in 0..quads {
        let a0 = a.vertex(j);
        let a1 = a.vertex(j + 1);
        let b0 = b.vertex(j);
        let b1 = b.vertex(j + 1);
        indices.extend_from_slice(&[a0, a1, b0]);
        indices.extend_from_slice(&[a1, b1, b0]);
    }

    indices
}

/// Fan triangles from a single apex vertex onto a ring.
///
/// `apex_first` selects the orientation: `true` when the apex precedes the
/// ring in the strip chain (a start cap), `false` when it follows (an end cap).
#[must_use]
pub fn ring_fan_indices(apex: u32, ring: &RingSpan, apex_first: bool) -> Vec<u32> {
    let segments = if ring.closed { ring.len } else { ring.len.saturating_sub(1) };
    let mut indices = Vec::with_capacity(segments * 3);

    for j in 0..segments {
        let r0 = ring.vertex(j);
        let r1 = ring.vertex(j + 1);
        if apex_first {
            indices.extend_from_slice(&[apex, r1, r0]);
        } else {
            indices.extend_from_slice(&[r0, r1, apex]);
        }
    }

    indices
}

/// Stitches two rings with differing point counts by merging their azimuths.
///
/// Both angle lists must be increasing and share the same reference start
/// angle (index 0). At every step the ring whose next edge midpoint has the
/// smaller azimuth advances, so each extra point of the larger ring fans onto
/// the nearest vertex of the smaller one.
#[must_use]
pub fn stitch_rings_by_angle(a: &RingSpan, a_angles: &[f64], b: &RingSpan, b_angles: &[f64]) -> Vec<u32> {
    let n = a.len.min(a_angles.len());
    let m = b.len.min(b_angles.len());
    if n == 0 || m == 0 {
        return Vec::new();
    }

    let closed = a.closed && b.closed;
    let (steps_a, steps_b) = if closed { (n, m) } else { (n - 1, m - 1) };
    let unwrapped = |angles: &[f64], count: usize, i: usize| {
        let turns = (i / count) as f64;
        angles[i % count] + turns * std::f64::consts::TAU
    };

    let mut indices = Vec::with_capacity((steps_a + steps_b) * 3);
    let (mut i, mut j) = (0usize, 0usize);
    while i < steps_a || j < steps_b {
        let advance_a = if i == steps_a {
            false
        } else if j == steps_b {
            true
        } else {
            let mid_a = unwrapped(a_angles, n, i) + unwrapped(a_angles, n, i + 1);
            let mid_b = unwrapped(b_angles, m, j) + unwrapped(b_angles, m, j + 1);
            mid_a <= mid_b
        };

        if advance_a {
            indices.extend_from_slice(&[a.vertex(i), a.vertex(i + 1), b.vertex(j)]);
            i += 1;
        } else {
            indices.extend_from_slice(&[a.vertex(i), b.vertex(j + 1), b.vertex(j)]);
            j += 1;
        }
    }

    indices
}

/// Greedy zipper between two rings of possibly different sizes.
///
/// `a_start`/`b_start` are the ring-local indices both cursors begin at. The
/// cursor that is behind in fractional progress (`i / len_a` vs `j / len_b`)
/// advances; ties advance `a`. Closed rings wrap exactly once, producing
/// `len_a + len_b` triangles; open arcs produce `len_a + len_b - 2`.
///
/// The fan length is not capped: a very lopsided ratio yields long fans from a
/// single vertex, reported through [`ZipperStitch::longest_fan`].
#[must_use]
pub fn zipper_stitch(a: &RingSpan, a_start: usize, b: &RingSpan, b_start: usize) -> ZipperStitch {
    if a.len == 0 || b.len == 0 {
        return ZipperStitch::default();
    }

    let closed = a.closed && b.closed;
    let (a_start, b_start) = if closed { (a_start % a.len, b_start % b.len) } else { (0, 0) };
    let (steps_a, steps_b) = if closed { (a.len, b.len) } else { (a.len - 1, b.len - 1) };

    let mut indices = Vec::with_capacity((steps_a + steps_b) * 3);
    let (mut i, mut j) = (0usize, 0usize);
    let mut run = 0usize;
    let mut last_advanced_a = None;
    let mut longest_fan = 0usize;

    while i < steps_a || j < steps_b {
        let advance_a = if i == steps_a {
            false
        } else if j == steps_b {
            true
        } else {
            i * steps_b <= j * steps_a
        };

        let ai = a.vertex(a_start + i);
        let bj = b.vertex(b_start + j);
        if advance_a {
            indices.extend_from_slice(&[ai, a.vertex(a_start + i + 1), bj]);
            i += 1;
        } else {
            indices.extend_from_slice(&[ai, b.vertex(b_start + j + 1), bj]);
            j += 1;
        }

        run = if last_advanced_a == Some(advance_a) { run + 1 } else { 1 };
        last_advanced_a = Some(advance_a);
        longest_fan = longest_fan.max(run);
    }

    ZipperStitch { indices, longest_fan }
}
