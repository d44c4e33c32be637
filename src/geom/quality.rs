//! Read-only mesh quality validation.
//!
//! Runs after every build and reports degenerate triangles, boundary and
//! non-manifold edges, edge-connected components and the winding agreement
//! along the seam between two named groups. Nothing here mutates geometry.

use std::collections::{BTreeMap, HashMap};

use super::diagnostics::{MeshQualityReport, SeamStats};
use super::mesh::GroupRange;
use super::{Tolerance, Vec3};

/// Options for [`validate_mesh`].
#[derive(Debug, Clone, PartialEq)]
pub struct QualityOptions {
    /// A triangle whose cross-product magnitude is at or below `tolerance.eps`
    /// counts as degenerate.
    pub tolerance: Tolerance,
    /// The pair of groups whose shared edges are checked for winding agreement.
    pub seam_groups: Option<(String, String)>,
}

impl Default for QualityOptions {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default_geom(),
            seam_groups: Some(("horn".to_string(), "enclosure".to_string())),
        }
    }
}

/// Limits applied in strict mode. Each exceeded limit is one violation.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityThresholds {
    pub max_degenerate_triangles: usize,
    /// `None` accepts any number of boundary edges (open or half meshes).
    pub max_boundary_edges: Option<usize>,
    pub max_non_manifold_edges: usize,
    pub max_components: usize,
    pub max_inverted_seam_edges: usize,
    pub allow_non_finite_vertices: bool,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            max_degenerate_triangles: 0,
            max_boundary_edges: None,
            max_non_manifold_edges: 0,
            max_components: 1,
            max_inverted_seam_edges: 0,
            allow_non_finite_vertices: false,
        }
    }
}

impl QualityThresholds {
    /// Thresholds for a mesh that is expected to be closed.
    #[must_use]
    pub fn watertight() -> Self {
        Self {
            max_boundary_edges: Some(0),
            ..Self::default()
        }
    }

    /// Human-readable list of every limit the report exceeds.
    #[must_use]
    pub fn violations(&self, report: &MeshQualityReport) -> Vec<String> {
        let mut out = Vec::new();
        if report.degenerate_triangle_count > self.max_degenerate_triangles {
            out.push(format!(
                "{} degenerate triangles (max {})",
                report.degenerate_triangle_count, self.max_degenerate_triangles
            ));
        }
        if let Some(max) = self.max_boundary_edges {
            if report.boundary_edge_count > max {
                out.push(format!("{} boundary edges (max {max})", report.boundary_edge_count));
            }
        }
        if report.non_manifold_edge_count > self.max_non_manifold_edges {
            out.push(format!(
                "{} non-manifold edges (max {})",
                report.non_manifold_edge_count, self.max_non_manifold_edges
            ));
        }
        if report.component_count > self.max_components {
            out.push(format!(
                "{} components (max {})",
                report.component_count, self.max_components
            ));
        }
        if let Some(seam) = &report.seam {
            if seam.inverted_edges > self.max_inverted_seam_edges {
                out.push(format!(
                    "{} inverted seam edges between `{}` and `{}`",
                    seam.inverted_edges, seam.first_group, seam.second_group
                ));
            }
        }
        if !self.allow_non_finite_vertices && report.non_finite_vertex_count > 0 {
            out.push(format!("{} non-finite vertices", report.non_finite_vertex_count));
        }
        out
    }
}

/// Validates a triangle mesh and returns its quality report.
///
/// Out-of-range indices are never dereferenced; such triangles count as
/// degenerate and contribute no edges.
#[must_use]
pub fn validate_mesh(
    positions: &[[f64; 3]],
    indices: &[u32],
    groups: &BTreeMap<String, GroupRange>,
    options: &QualityOptions,
) -> MeshQualityReport {
    let triangles: Vec<[u32; 3]> = indices
        .chunks_exact(3)
        .map(|tri| [tri[0], tri[1], tri[2]])
        .collect();

    let mut report = MeshQualityReport {
        vertex_count: positions.len(),
        triangle_count: triangles.len(),
        non_finite_vertex_count: positions
            .iter()
            .filter(|p| !Vec3::from_array(**p).is_finite())
            .count(),
        ..MeshQualityReport::default()
    };

    report.degenerate_triangle_count = triangles
        .iter()
        .filter(|tri| is_degenerate(positions, **tri, options.tolerance))
        .count();

    let edge_map = build_edge_map(positions.len(), &triangles);
    for users in edge_map.values() {
        match users.len() {
            1 => report.boundary_edge_count += 1,
            n if n > 2 => report.non_manifold_edge_count += 1,
            _ => {}
        }
    }

    report.component_count = count_components(&triangles, &edge_map, positions.len());

    if let Some((first, second)) = &options.seam_groups {
        if let (Some(a), Some(b)) = (groups.get(first), groups.get(second)) {
            report.seam = Some(seam_stats(first, *a, second, *b, &triangles, positions.len()));
        }
    }

    if report.boundary_edge_count > 0 {
        report.add_warning("mesh has boundary edges");
    }
    if report.non_manifold_edge_count > 0 {
        report.add_warning("mesh has non-manifold edges");
    }
    if report.component_count > 1 {
        report.add_warning(format!("mesh has {} disconnected components", report.component_count));
    }
    if report.degenerate_triangle_count > 0 {
        report.add_warning("mesh has degenerate triangles");
    }
    if report.non_finite_vertex_count > 0 {
        report.add_warning("mesh has non-finite vertices");
    }

    report
}

fn is_degenerate(positions: &[[f64; 3]], tri: [u32; 3], tol: Tolerance) -> bool {
    let [i0, i1, i2] = tri;
    if i0 == i1 || i1 == i2 || i0 == i2 {
        return true;
    }
    let (Some(a), Some(b), Some(c)) = (
        positions.get(i0 as usize),
        positions.get(i1 as usize),
        positions.get(i2 as usize),
    ) else {
        return true;
    };
    let a = Vec3::from_array(*a);
    let area2 = (Vec3::from_array(*b) - a)
        .cross(Vec3::from_array(*c) - a)
        .length();
    !area2.is_finite() || area2 <= tol.eps
}

fn undirected(a: u32, b: u32) -> (u32, u32) {
    if a <= b { (a, b) } else { (b, a) }
}

fn triangle_edges(tri: [u32; 3]) -> [(u32, u32); 3] {
    [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]
}

/// Undirected edge → triangles using it. Self-edges and out-of-range
/// triangles are skipped.
fn build_edge_map(vertex_count: usize, triangles: &[[u32; 3]]) -> HashMap<(u32, u32), Vec<usize>> {
    let mut edges: HashMap<(u32, u32), Vec<usize>> = HashMap::with_capacity(triangles.len() * 3 / 2);
    for (t, tri) in triangles.iter().enumerate() {
        if tri.iter().any(|&i| i as usize >= vertex_count) {
            continue;
        }
        for (a, b) in triangle_edges(*tri) {
            if a != b {
                edges.entry(undirected(a, b)).or_default().push(t);
            }
        }
    }
    edges
}

/// Flood fill over triangles that share an edge.
fn count_components(
    triangles: &[[u32; 3]],
    edge_map: &HashMap<(u32, u32), Vec<usize>>,
    vertex_count: usize,
) -> usize {
    let mut visited = vec![false; triangles.len()];
    let mut stack = Vec::new();
    let mut components = 0usize;

    for seed in 0..triangles.len() {
        if visited[seed] || triangles[seed].iter().any(|&i| i as usize >= vertex_count) {
            continue;
        }
        components += 1;
        visited[seed] = true;
        stack.push(seed);

        while let Some(t) = stack.pop() {
            for (a, b) in triangle_edges(triangles[t]) {
                let Some(neighbours) = edge_map.get(&undirected(a, b)) else {
                    continue;
                };
                for &n in neighbours {
                    if !visited[n] {
                        visited[n] = true;
                        stack.push(n);
                    }
                }
            }
        }
    }

    components
}

/// Directed traversal of each undirected edge inside one group (first seen wins).
fn group_edge_directions(
    range: GroupRange,
    triangles: &[[u32; 3]],
    vertex_count: usize,
) -> HashMap<(u32, u32), bool> {
    let mut directions = HashMap::new();
    let end = range.end.min(triangles.len());
    for tri in triangles.get(range.start..end).unwrap_or_default() {
        if tri.iter().any(|&i| i as usize >= vertex_count) {
            continue;
        }
        for (a, b) in triangle_edges(*tri) {
            if a != b {
                directions.entry(undirected(a, b)).or_insert(a < b);
            }
        }
    }
    directions
}

fn seam_stats(
    first: &str,
    first_range: GroupRange,
    second: &str,
    second_range: GroupRange,
    triangles: &[[u32; 3]],
    vertex_count: usize,
) -> SeamStats {
    let a = group_edge_directions(first_range, triangles, vertex_count);
    let b = group_edge_directions(second_range, triangles, vertex_count);

    let mut stats = SeamStats {
        first_group: first.to_string(),
        second_group: second.to_string(),
        ..SeamStats::default()
    };
    for (edge, forward_a) in &a {
        if let Some(forward_b) = b.get(edge) {
            stats.shared_edges += 1;
            if forward_a == forward_b {
                stats.inverted_edges += 1;
            } else {
                stats.consistent_edges += 1;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> (Vec<[f64; 3]>, Vec<u32>) {
        let positions = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let indices = vec![0, 2, 1, 0, 1, 3, 1, 2, 3, 2, 0, 3];
        (positions, indices)
    }

    #[test]
    fn closed_tetrahedron_is_clean() {
        let (positions, indices) = tetrahedron();
        let report = validate_mesh(&positions, &indices, &BTreeMap::new(), &QualityOptions::default());
        assert_eq!(report.degenerate_triangle_count, 0);
        assert_eq!(report.boundary_edge_count, 0);
        assert_eq!(report.non_manifold_edge_count, 0);
        assert_eq!(report.component_count, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn disjoint_triangles_are_two_components() {
        let positions = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [5.0, 0.0, 0.0],
            [6.0, 0.0, 0.0],
            [5.0, 1.0, 0.0],
        ];
        let indices = vec![0, 1, 2, 3, 4, 5];
        let report = validate_mesh(&positions, &indices, &BTreeMap::new(), &QualityOptions::default());
        assert_eq!(report.component_count, 2);
        assert_eq!(report.boundary_edge_count, 6);
        assert!(!report.is_watertight());
    }

    #[test]
    fn three_triangles_on_one_edge_are_non_manifold() {
        let positions = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let indices = vec![0, 1, 2, 1, 0, 3, 0, 1, 4];
        let report = validate_mesh(&positions, &indices, &BTreeMap::new(), &QualityOptions::default());
        assert_eq!(report.non_manifold_edge_count, 1);
        assert_eq!(report.component_count, 1);
    }

    #[test]
    fn collinear_triangle_is_degenerate() {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let report = validate_mesh(&positions, &[0, 1, 2], &BTreeMap::new(), &QualityOptions::default());
        assert_eq!(report.degenerate_triangle_count, 1);
    }

    #[test]
    fn seam_detects_inverted_group() {
        let (positions, mut indices) = tetrahedron();
        let mut groups = BTreeMap::new();
        groups.insert("horn".to_string(), GroupRange::new(0, 2));
        groups.insert("enclosure".to_string(), GroupRange::new(2, 4));

        let report = validate_mesh(&positions, &indices, &groups, &QualityOptions::default());
        let seam = report.seam.expect("both groups present");
        assert_eq!(seam.shared_edges, 4);
        assert_eq!(seam.inverted_edges, 0);

        // Flip the second group.
        for tri in indices[6..].chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        let report = validate_mesh(&positions, &indices, &groups, &QualityOptions::default());
        let seam = report.seam.expect("both groups present");
        assert_eq!(seam.inverted_edges, 4);
        assert_eq!(seam.consistent_edges, 0);
    }

    #[test]
    fn out_of_range_indices_do_not_panic() {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let report = validate_mesh(&positions, &[0, 1, 7], &BTreeMap::new(), &QualityOptions::default());
        assert_eq!(report.degenerate_triangle_count, 1);
        assert_eq!(report.component_count, 0);
    }

    #[test]
    fn thresholds_report_each_violation() {
        let report = MeshQualityReport {
            boundary_edge_count: 3,
            component_count: 2,
            ..MeshQualityReport::default()
        };
        assert_eq!(QualityThresholds::default().violations(&report).len(), 1);
        assert_eq!(QualityThresholds::watertight().violations(&report).len(), 2);
    }
}
