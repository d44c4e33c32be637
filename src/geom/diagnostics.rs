//! Mesh quality diagnostics for the horn mesh engine.
//!
//! The report is produced by the quality validator after every build and
//! travels with the mesh. It never drives repairs; consumers decide what a
//! defect means for them (an STL export tolerates open edges on a
//! symmetry-reduced half mesh, a BEM export does not).
//!
//! # Example
//!
//! ```ignore
//! use waveguide_engine::horn::{build_horn, HornParams};
//!
//! let build = build_horn(&HornParams::default())?;
//! if build.quality.is_watertight() {
//!     println!("closed mesh with {} triangles", build.quality.triangle_count);
//! } else {
//!     println!("{} boundary edges", build.quality.boundary_edge_count);
//! }
//! ```

use std::fmt;

use serde::Serialize;

/// Edge-orientation statistics along the seam between two named groups.
///
/// Two correctly wound neighbouring surfaces traverse every shared edge in
/// opposite directions. A shared edge traversed in the same direction by
/// both groups means one side of the seam is inverted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeamStats {
    pub first_group: String,
    pub second_group: String,
    /// Undirected edges used by both groups.
    pub shared_edges: usize,
    /// Shared edges traversed in opposite directions (expected).
    pub consistent_edges: usize,
    /// Shared edges traversed in the same direction (inverted winding).
    pub inverted_edges: usize,
}

impl SeamStats {
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.inverted_edges == 0
    }
}

/// Quality report for a generated mesh.
///
/// # Topology Metrics
///
/// - `boundary_edge_count`: Edges with only one adjacent triangle
/// - `non_manifold_edge_count`: Edges with more than two adjacent triangles
/// - `component_count`: Triangle islands connected through shared edges
///
/// # Geometry Metrics
///
/// - `degenerate_triangle_count`: Zero-area or index-collapsed triangles
/// - `non_finite_vertex_count`: Vertices carrying NaN/Inf coordinates
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshQualityReport {
    /// Total number of vertices in the mesh.
    pub vertex_count: usize,

    /// Total number of triangles in the mesh.
    pub triangle_count: usize,

    /// Triangles whose cross-product magnitude is at or below the tolerance,
    /// or which repeat a vertex index.
    pub degenerate_triangle_count: usize,

    /// Edges used by exactly one triangle.
    ///
    /// A fully closed mesh has zero. Symmetry-reduced meshes keep their cut
    /// edges open on the mirror planes.
    pub boundary_edge_count: usize,

    /// Edges used by more than two triangles. Always a defect.
    pub non_manifold_edge_count: usize,

    /// Number of edge-connected triangle components. One is expected.
    pub component_count: usize,

    /// Vertices with NaN or infinite coordinates.
    pub non_finite_vertex_count: usize,

    /// Seam statistics between the two inspected groups, when both exist.
    pub seam: Option<SeamStats>,

    /// Longest single-apex fan emitted by the mouth-to-enclosure zipper.
    pub longest_zipper_fan: usize,

    /// Optional timing breakdown (`mesh_metrics` feature, native only).
    #[serde(skip)]
    pub timing: Option<super::metrics::HornTimingReport>,

    /// Human-readable warnings, e.g. "mesh has boundary edges".
    pub warnings: Vec<String>,
}

impl MeshQualityReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the mesh has no boundary edges.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.boundary_edge_count == 0
    }

    /// Returns `true` if no edge is shared by more than two triangles.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    #[must_use]
    pub fn is_single_component(&self) -> bool {
        self.component_count == 1
    }

    /// Watertight, manifold and in one piece.
    #[must_use]
    pub fn is_valid_solid(&self) -> bool {
        self.is_watertight() && self.is_manifold() && self.is_single_component()
    }

    /// Returns `true` when no defect of any kind was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.is_valid_solid()
            && self.degenerate_triangle_count == 0
            && self.non_finite_vertex_count == 0
            && self.seam.as_ref().is_none_or(SeamStats::is_consistent)
            && self.warnings.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Boundary plus non-manifold edges.
    #[must_use]
    pub fn topology_issue_count(&self) -> usize {
        self.boundary_edge_count + self.non_manifold_edge_count
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Short summary suitable for logging.
    ///
    /// Format: `"V:{vertices} T:{triangles} C:{components} [issues...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "V:{} T:{} C:{}",
            self.vertex_count, self.triangle_count, self.component_count
        )];

        if self.degenerate_triangle_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_triangle_count));
        }
        if self.boundary_edge_count > 0 {
            parts.push(format!("boundary:{}", self.boundary_edge_count));
        }
        if self.non_manifold_edge_count > 0 {
            parts.push(format!("non-manifold:{}", self.non_manifold_edge_count));
        }
        if self.non_finite_vertex_count > 0 {
            parts.push(format!("non-finite:{}", self.non_finite_vertex_count));
        }
        if let Some(seam) = self.seam.as_ref().filter(|seam| !seam.is_consistent()) {
            parts.push(format!("inverted-seam:{}", seam.inverted_edges));
        }

        parts.join(" ")
    }
}

impl fmt::Display for MeshQualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh Quality:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(f, "  Components: {}", self.component_count)?;

        if self.topology_issue_count() > 0 {
            writeln!(f, "  Topology issues:")?;
            if self.boundary_edge_count > 0 {
                writeln!(f, "    - Boundary edges: {}", self.boundary_edge_count)?;
            }
            if self.non_manifold_edge_count > 0 {
                writeln!(f, "    - Non-manifold edges: {}", self.non_manifold_edge_count)?;
            }
        }

        if self.degenerate_triangle_count > 0 {
            writeln!(f, "  Degenerate triangles: {}", self.degenerate_triangle_count)?;
        }
        if self.non_finite_vertex_count > 0 {
            writeln!(f, "  Non-finite vertices: {}", self.non_finite_vertex_count)?;
        }

        if let Some(seam) = &self.seam {
            writeln!(
                f,
                "  Seam {}/{}: {} shared, {} inverted",
                seam.first_group, seam.second_group, seam.shared_edges, seam.inverted_edges
            )?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        if let Some(ref timing) = self.timing {
            writeln!(f, "  Timing: {} ms total", timing.total_ms())?;
        }

        let status = if self.is_clean() {
            "CLEAN"
        } else if self.is_valid_solid() {
            "VALID (with warnings)"
        } else {
            "ISSUES DETECTED"
        };
        writeln!(f, "  Status: {status}")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_report() -> MeshQualityReport {
        MeshQualityReport {
            vertex_count: 4,
            triangle_count: 4,
            component_count: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_closed_single_component_is_clean() {
        let report = closed_report();
        assert!(report.is_clean());
        assert!(report.is_valid_solid());
    }

    #[test]
    fn test_boundary_edges_not_watertight() {
        let report = MeshQualityReport {
            boundary_edge_count: 6,
            ..closed_report()
        };
        assert!(!report.is_watertight());
        assert!(report.is_manifold());
        assert!(!report.is_valid_solid());
    }

    #[test]
    fn test_inverted_seam_is_not_clean() {
        let report = MeshQualityReport {
            seam: Some(SeamStats {
                first_group: "horn".into(),
                second_group: "enclosure".into(),
                shared_edges: 24,
                consistent_edges: 20,
                inverted_edges: 4,
            }),
            ..closed_report()
        };
        assert!(report.is_valid_solid());
        assert!(!report.is_clean());
        assert!(report.summary().contains("inverted-seam:4"));
    }

    #[test]
    fn test_display() {
        let mut report = MeshQualityReport {
            boundary_edge_count: 2,
            ..closed_report()
        };
        report.add_warning("mesh has boundary edges");

        let output = format!("{report}");
        assert!(output.contains("Vertices: 4"));
        assert!(output.contains("Boundary edges: 2"));
        assert!(output.contains("mesh has boundary edges"));
        assert!(output.contains("ISSUES DETECTED"));
    }
}
