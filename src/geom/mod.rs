mod cache;
mod core;
mod diagnostics;
mod mesh;
mod metrics;
mod quality;
mod triangulation;

pub use cache::{ProfileCache, ProfileCacheStats};
pub use core::{Tolerance, Vec2, Vec3, sqrt_clamped};
pub use diagnostics::{MeshQualityReport, SeamStats};
pub use mesh::{GroupRange, HornMesh, MeshBufferError, MeshBuilder, RingSpan};
pub use metrics::{HornMetrics, HornTimingReport, TimingBucket};
pub use quality::{QualityOptions, QualityThresholds, validate_mesh};
pub use triangulation::{
    ZipperStitch, ring_fan_indices, ring_strip_indices, stitch_rings_by_angle, zipper_stitch,
};
