//! Build entry points: parameters in, mesh plus quality report out.

use crate::geom::{
    HornMesh, HornMetrics, MeshBufferError, MeshBuilder, MeshQualityReport, ProfileCache,
    QualityOptions, QualityThresholds, TimingBucket, Tolerance, validate_mesh,
};

use super::angles::{measure_mouth_extents, ring_angle_lists, sampling_extents};
use super::assembler::{cap_throat, connect_horn_rings, push_horn_rings};
use super::enclosure::{EnclosureSampling, append_enclosure};
use super::morph::target_extents;
use super::params::HornParams;
use super::slices::build_slice_map;
use super::validate::{ParamIssue, validate_params};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The assembler produced an inconsistent buffer. Never recoverable.
    #[error("mesh buffer invariant violated: {0}")]
    Buffer(#[from] MeshBufferError),
    #[error("invalid parameters: {}", summarize(.issues))]
    InvalidParameters { issues: Vec<ParamIssue> },
    #[error("mesh quality check failed: {}", .violations.join("; "))]
    QualityThreshold {
        violations: Vec<String>,
        report: Box<MeshQualityReport>,
    },
}

fn summarize(issues: &[ParamIssue]) -> String {
    issues
        .iter()
        .filter(|issue| issue.is_error())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Per-build state: tolerances, the profile cache and timing.
///
/// A context can be reused across builds; the cache is cleared at the start
/// of each one.
#[derive(Debug, Default)]
pub struct HornContext {
    pub tolerance: Tolerance,
    pub cache: ProfileCache,
    pub metrics: HornMetrics,
    pub quality: QualityOptions,
    /// Fails the build on parameter errors or quality violations instead of
    /// reporting them.
    pub strict: bool,
    /// Overrides the thresholds strict mode applies.
    pub thresholds: Option<QualityThresholds>,
}

impl HornContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

/// A finished build.
#[derive(Debug, Clone)]
pub struct HornBuild {
    pub mesh: HornMesh,
    pub quality: MeshQualityReport,
    /// Parameter findings; errors here did not stop a non-strict build.
    pub issues: Vec<ParamIssue>,
}

impl HornBuild {
    #[must_use]
    pub fn has_param_errors(&self) -> bool {
        self.issues.iter().any(ParamIssue::is_error)
    }
}

/// Builds a horn with a fresh, non-strict context.
pub fn build_horn(params: &HornParams) -> Result<HornBuild, BuildError> {
    build_horn_with_context(params, &mut HornContext::new())
}

/// Builds a horn mesh, its optional enclosure and the quality report.
pub fn build_horn_with_context(params: &HornParams, ctx: &mut HornContext) -> Result<HornBuild, BuildError> {
    ctx.metrics.begin();
    ctx.cache.clear();

    let issues = validate_params(params);
    for issue in &issues {
        log::warn!("{issue}");
    }
    if ctx.strict && issues.iter().any(ParamIssue::is_error) {
        return Err(BuildError::InvalidParameters { issues });
    }

    let sampling = &params.sampling;
    let steps = sampling.length_segments.max(1);
    let slices = ctx.metrics.time(TimingBucket::SlicePlanning, || build_slice_map(params, steps));

    let cache = &mut ctx.cache;
    let (mouth, ring_angles) = ctx.metrics.time(TimingBucket::AngularSampling, || {
        let mouth = measure_mouth_extents(params, cache);
        let angles = ring_angle_lists(params, &slices, sampling_extents(params, mouth));
        (mouth, angles)
    });
    let morph_target = params
        .morph
        .as_ref()
        .map(|morph| target_extents(morph, mouth))
        .unwrap_or_default();
    log::debug!(
        "{} horn: {} slices, mouth {:.2} x {:.2}, {} points on the mouth ring",
        params.profile.name(),
        slices.len(),
        mouth.half_width * 2.0,
        mouth.half_height * 2.0,
        ring_angles.last().map_or(0, Vec::len),
    );

    let vertex_estimate = ring_angles.iter().map(Vec::len).sum::<usize>() + 1;
    let mut builder = MeshBuilder::with_capacity(vertex_estimate, vertex_estimate * 2);

    let horn = ctx.metrics.time(TimingBucket::ProfileEvaluation, || {
        push_horn_rings(&mut builder, params, &slices, &ring_angles, morph_target, cache)
    });
    ctx.metrics.time(TimingBucket::RingAssembly, || {
        connect_horn_rings(&mut builder, &horn);
        if params.emits_source_cap() {
            cap_throat(&mut builder, &horn);
        }
    });

    let enclosure = match (&params.enclosure, horn.mouth()) {
        (Some(enclosure), Some((mouth_ring, _))) => {
            let enclosure_sampling = EnclosureSampling {
                symmetry: sampling.symmetry,
                corner_segments: sampling.corner_segments,
            };
            Some(ctx.metrics.time(TimingBucket::Enclosure, || {
                append_enclosure(&mut builder, mouth_ring, enclosure, enclosure_sampling)
            }))
        }
        _ => None,
    };

    let mesh = builder.finish(horn.ring_count(), sampling.symmetry.is_full())?;

    let quality_options = QualityOptions {
        tolerance: ctx.tolerance,
        ..ctx.quality.clone()
    };
    let mut quality = ctx.metrics.time(TimingBucket::Validation, || {
        validate_mesh(&mesh.positions, &mesh.indices, &mesh.groups, &quality_options)
    });
    if let Some(enclosure) = enclosure {
        quality.longest_zipper_fan = enclosure.longest_fan;
        for warning in enclosure.warnings {
            quality.add_warning(warning);
        }
    }
    quality.timing = ctx.metrics.end();

    let cache_stats = ctx.cache.stats();
    log::debug!(
        "build done: {} (cache {} entries, hit rate {:.2})",
        quality.summary(),
        cache_stats.total_entries(),
        cache_stats.hit_rate()
    );

    if ctx.strict {
        let thresholds = ctx.thresholds.clone().unwrap_or_else(|| default_thresholds(params));
        let violations = thresholds.violations(&quality);
        if !violations.is_empty() {
            return Err(BuildError::QualityThreshold {
                violations,
                report: Box::new(quality),
            });
        }
    }

    Ok(HornBuild { mesh, quality, issues })
}

/// Watertight thresholds when the build is expected to be closed: a full
/// circle with an enclosure (which always caps the throat).
fn default_thresholds(params: &HornParams) -> QualityThresholds {
    if params.sampling.symmetry.is_full() && params.enclosure.is_some() {
        QualityThresholds::watertight()
    } else {
        QualityThresholds::default()
    }
}
