//! Parametric horn mesh generation.
//!
//! The pipeline for one build:
//!
//! 1. [`validate_params`] checks the parameter record
//! 2. [`build_slice_map`] plans the axial positions `t`
//! 3. [`build_angle_list`] samples azimuths per ring
//! 4. [`evaluate_profile`] and [`apply_morphing`] give each ring point
//! 5. the assembler stitches rings, optionally capping the throat
//! 6. [`append_enclosure`] adds the box behind the mouth
//! 7. the mesh is validated and returned with its quality report
//!
//! Coordinates: the horn axis is +Y with the throat at `y = 0`; azimuth `p`
//! is measured in the XZ plane from +X toward +Z.

mod angles;
mod assembler;
mod build;
mod enclosure;
mod expr;
mod formula;
mod morph;
mod outline;
mod params;
mod profile;
mod slices;
mod validate;

#[cfg(test)]
mod tests;

pub use angles::{
    build_angle_list, full_circle_angles, measure_mouth_extents, reduce_to_symmetry, ring_angle_lists,
    sample_angles, sampling_corner_radius, sampling_extents, uniform_angles,
};
pub use assembler::{HornRings, cap_throat, connect_horn_rings, push_horn_rings};
pub use build::{BuildError, HornBuild, HornContext, build_horn, build_horn_with_context};
pub use enclosure::{EnclosureBuild, EnclosureSampling, LONG_FAN_WARNING, append_enclosure, enclosure_outline};
pub use expr::{AzimuthFn, ParamValue};
pub use formula::{AZIMUTH_VARIABLE, FormulaError};
pub use morph::{Extents, apply_morphing, blend_factor, target_extents, target_radius};
pub use outline::{OutlinePoint, RoundedBox};
pub use params::{
    CircularArc, EdgeType, EnclosureParams, EnclosureSpacing, GuidingCurve, GuidingShape, HornParams,
    MorphParams, MorphTarget, OsseParams, ProfileParams, RosseParams, SamplingParams, Symmetry,
};
pub use profile::{
    OsseTerms, ProfilePoint, evaluate_profile, guided_coverage_deg, profile_length, profile_radius,
};
pub use slices::{LEAD_IN_STEP_FRACTION, build_slice_map, resample_slice_map, uniform_slices};
pub use validate::{ParamIssue, Severity, validate_params};
