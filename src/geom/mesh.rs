use std::collections::BTreeMap;
use std::ops::Range;

use serde::Serialize;

/// Fatal buffer errors raised while finalizing a mesh.
///
/// Any of these means an assembler produced a corrupt buffer; downstream
/// consumers must never see the mesh.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshBufferError {
    #[error("index buffer length {len} is not a triangle list (len % 3 != 0)")]
    NotTriangleList { len: usize },
    #[error("triangle index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: u32, vertex_count: usize },
    #[error("vertex count {vertex_count} exceeds the u32 index range")]
    IndexOverflow { vertex_count: usize },
    #[error("group `{name}` range {start}..{end} exceeds {triangle_count} triangles")]
    GroupOutOfBounds {
        name: String,
        start: usize,
        end: usize,
        triangle_count: usize,
    },
}

/// A contiguous span of vertices forming one cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RingSpan {
    /// Index of the first vertex of the ring.
    pub start: u32,
    /// Number of vertices in the ring.
    pub len: usize,
    /// Normalized axial parameter of the slice.
    pub t: f64,
    /// Whether the ring wraps around (full circle).
    pub closed: bool,
}

impl RingSpan {
    /// Vertex index of the `i`-th ring point, wrapping for closed rings.
    #[must_use]
    pub fn vertex(&self, i: usize) -> u32 {
        let i = if self.closed && self.len > 0 { i % self.len } else { i };
        self.start + i as u32
    }

    #[must_use]
    pub fn indices(&self) -> Range<usize> {
        let start = self.start as usize;
        start..start + self.len
    }
}

/// Named half-open range of triangle indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupRange {
    pub start: usize,
    pub end: usize,
}

impl GroupRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn contains(&self, triangle: usize) -> bool {
        triangle >= self.start && triangle < self.end
    }

    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Final, immutable horn mesh snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HornMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
    /// Number of horn-body rings (`length_segments + 1`).
    pub ring_count: usize,
    /// Whether the rings close the full circle (no symmetry reduction).
    pub full_circle: bool,
    /// Every ring emitted by the build, horn body first.
    pub rings: Vec<RingSpan>,
    pub groups: BTreeMap<String, GroupRange>,
}

impl HornMesh {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        check_indices(&self.positions, &self.indices).is_ok()
    }

    /// Checks the buffer invariants every consumer relies on.
    pub fn validate(&self) -> Result<(), MeshBufferError> {
        check_indices(&self.positions, &self.indices)?;
        check_groups(&self.groups, self.triangle_count())
    }

    /// Position buffer as a flat slice: `[x0, y0, z0, x1, y1, z1, ...]`.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        self.positions.as_flattened()
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<GroupRange> {
        self.groups.get(name).copied()
    }

    /// Index sub-slice for the triangles of a named group.
    #[must_use]
    pub fn group_indices(&self, name: &str) -> Option<&[u32]> {
        let range = self.group(name)?;
        self.indices.get(range.start * 3..range.end * 3)
    }

    /// The mouth ring: the last ring of the horn body.
    #[must_use]
    pub fn mouth_ring(&self) -> Option<&RingSpan> {
        self.ring_count.checked_sub(1).and_then(|i| self.rings.get(i))
    }
}

/// Growing vertex/index buffers owned by a single build.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    positions: Vec<[f64; 3]>,
    indices: Vec<u32>,
    rings: Vec<RingSpan>,
    groups: BTreeMap<String, GroupRange>,
}

impl MeshBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(triangles * 3),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    #[must_use]
    pub fn rings(&self) -> &[RingSpan] {
        &self.rings
    }

    pub fn push_vertex(&mut self, position: [f64; 3]) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        index
    }

    /// Appends a ring of vertices and records its span.
    pub fn push_ring(&mut self, points: impl IntoIterator<Item = [f64; 3]>, t: f64, closed: bool) -> RingSpan {
        let start = self.positions.len() as u32;
        self.positions.extend(points);
        let ring = RingSpan {
            start,
            len: self.positions.len() - start as usize,
            t,
            closed,
        };
        self.rings.push(ring);
        ring
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn extend_triangles(&mut self, indices: &[u32]) {
        self.indices.extend_from_slice(indices);
    }

    /// Tags every triangle emitted since `start` with `name`.
    pub fn tag_group(&mut self, name: &str, start: usize) {
        let end = self.triangle_count();
        if end > start {
            self.groups.insert(name.to_string(), GroupRange::new(start, end));
        }
    }

    /// Consumes the builder and returns the immutable snapshot.
    ///
    /// Fails on any out-of-bounds index; the buffers are discarded in that case.
    pub fn finish(self, ring_count: usize, full_circle: bool) -> Result<HornMesh, MeshBufferError> {
        check_indices(&self.positions, &self.indices)?;
        check_groups(&self.groups, self.indices.len() / 3)?;
        Ok(HornMesh {
            positions: self.positions,
            indices: self.indices,
            ring_count,
            full_circle,
            rings: self.rings,
            groups: self.groups,
        })
    }
}

fn check_indices(positions: &[[f64; 3]], indices: &[u32]) -> Result<(), MeshBufferError> {
    if indices.len() % 3 != 0 {
        return Err(MeshBufferError::NotTriangleList { len: indices.len() });
    }
    let vertex_count = positions.len();
    if u32::try_from(vertex_count).is_err() {
        return Err(MeshBufferError::IndexOverflow { vertex_count });
    }
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(&index) => Err(MeshBufferError::IndexOutOfBounds { index, vertex_count }),
        None => Ok(()),
    }
}

fn check_groups(groups: &BTreeMap<String, GroupRange>, triangle_count: usize) -> Result<(), MeshBufferError> {
    for (name, range) in groups {
        if range.start > range.end || range.end > triangle_count {
            return Err(MeshBufferError::GroupOutOfBounds {
                name: name.clone(),
                start: range.start,
                end: range.end,
                triangle_count,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_rejects_out_of_bounds_index() {
        let mut builder = MeshBuilder::new();
        builder.push_vertex([0.0, 0.0, 0.0]);
        builder.push_vertex([1.0, 0.0, 0.0]);
        builder.push_triangle(0, 1, 2);
        let err = builder.finish(0, true).unwrap_err();
        assert_eq!(
            err,
            MeshBufferError::IndexOutOfBounds {
                index: 2,
                vertex_count: 2
            }
        );
    }

    #[test]
    fn ring_vertex_wraps_only_when_closed() {
        let closed = RingSpan { start: 10, len: 4, t: 0.0, closed: true };
        assert_eq!(closed.vertex(4), 10);
        let open = RingSpan { closed: false, ..closed };
        assert_eq!(open.vertex(3), 13);
    }

    #[test]
    fn tag_group_skips_empty_ranges() {
        let mut builder = MeshBuilder::new();
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            builder.push_vertex(p);
        }
        builder.tag_group("empty", 0);
        builder.push_triangle(0, 1, 2);
        builder.tag_group("horn", 0);
        let mesh = builder.finish(0, true).expect("valid mesh");
        assert!(mesh.group("empty").is_none());
        assert_eq!(mesh.group("horn"), Some(GroupRange::new(0, 1)));
        assert_eq!(mesh.group_indices("horn"), Some(&[0u32, 1, 2][..]));
        assert_eq!(mesh.positions_flat().len(), 9);
    }

    #[test]
    fn group_ranges_overlap_check() {
        let a = GroupRange::new(0, 10);
        assert!(a.overlaps(&GroupRange::new(9, 12)));
        assert!(!a.overlaps(&GroupRange::new(10, 12)));
    }
}
