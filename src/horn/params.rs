//! The horn parameter record.
//!
//! All records deserialize from camelCase JSON with per-field defaults, so a
//! partial record such as `{"profile": {"type": "R-OSSE"}}` is a complete
//! build request. Azimuth-dependent scalars are [`ParamValue`]s and accept
//! either a number or a formula string in `p`.

use serde::Deserialize;

use super::expr::ParamValue;

/// Complete input of one horn build.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HornParams {
    pub profile: ProfileParams,
    pub sampling: SamplingParams,
    pub morph: Option<MorphParams>,
    pub enclosure: Option<EnclosureParams>,
    /// Closes the throat with a flat source disc (the `source` group).
    ///
    /// The disc is always emitted when an enclosure is attached, since the
    /// enclosed solid is otherwise open at the throat.
    pub cap_throat: bool,
}

impl HornParams {
    /// Whether the throat disc is part of the mesh.
    #[must_use]
    pub fn emits_source_cap(&self) -> bool {
        self.cap_throat || self.enclosure.is_some()
    }
}

/// The profile family and its parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ProfileParams {
    #[serde(rename = "OSSE", alias = "osse")]
    Osse(OsseParams),
    #[serde(rename = "R-OSSE", alias = "rosse", alias = "ROSSE")]
    ROsse(RosseParams),
}

impl Default for ProfileParams {
    fn default() -> Self {
        Self::ROsse(RosseParams::default())
    }
}

impl ProfileParams {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Osse(_) => "OSSE",
            Self::ROsse(_) => "R-OSSE",
        }
    }
}

/// OSSE profile. Angles are in degrees, lengths in millimetres.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OsseParams {
    /// Axial length `L` of the main body (excluding extension and slot).
    pub length: ParamValue,
    /// Throat radius `r0`.
    pub throat_radius: ParamValue,
    /// Throat half-angle `a0`.
    pub throat_angle: ParamValue,
    /// Coverage half-angle `a`. Ignored when a guiding curve is set.
    pub coverage_angle: ParamValue,
    /// Throat rounding `k`.
    pub k: ParamValue,
    /// Termination strength `s`.
    pub s: ParamValue,
    /// Termination shape `n`.
    pub n: ParamValue,
    /// Termination truncation `q`.
    pub q: ParamValue,
    /// Conical throat extension ahead of the main body.
    pub throat_ext_length: f64,
    /// Half-angle of the throat extension.
    pub throat_ext_angle: f64,
    /// Constant-radius slot between extension and main body.
    pub slot_length: f64,
    /// Replaces the OSSE body by a circular arc between throat and mouth.
    pub circular_arc: Option<CircularArc>,
    /// Derives the coverage angle per azimuth from a guiding curve.
    pub guiding_curve: Option<GuidingCurve>,
}

impl Default for OsseParams {
    fn default() -> Self {
        Self {
            length: 120.0.into(),
            throat_radius: 12.7.into(),
            throat_angle: 15.5.into(),
            coverage_angle: 45.0.into(),
            k: 7.0.into(),
            s: 0.6.into(),
            n: 4.0.into(),
            q: 0.995.into(),
            throat_ext_length: 0.0,
            throat_ext_angle: 0.0,
            slot_length: 0.0,
            circular_arc: None,
            guiding_curve: None,
        }
    }
}

impl OsseParams {
    /// Length of extension plus slot ahead of the main body.
    #[must_use]
    pub fn lead_in_length(&self) -> f64 {
        self.throat_ext_length.max(0.0) + self.slot_length.max(0.0)
    }
}

/// Circular-arc mode: the arc is defined by its radius or by the wall angle
/// at the mouth (degrees from the axis).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CircularArc {
    Radius(f64),
    TerminalAngle(f64),
}

/// Shape of the coverage guiding curve in the cross-section plane.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum GuidingShape {
    Superellipse {
        #[serde(default = "default_superellipse_exponent")]
        exponent: f64,
    },
    #[serde(rename_all = "camelCase")]
    Superformula {
        a: f64,
        b: f64,
        m: f64,
        n1: f64,
        n2: f64,
        n3: f64,
    },
}

const fn default_superellipse_exponent() -> f64 {
    3.0
}

impl Default for GuidingShape {
    fn default() -> Self {
        Self::Superellipse {
            exponent: default_superellipse_exponent(),
        }
    }
}

/// A curve the horn wall must pass through at a given axial position.
///
/// The coverage angle at each azimuth is solved so that the OSSE radius at
/// `distance * L` equals the curve's polar radius at that azimuth.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuidingCurve {
    #[serde(flatten)]
    pub shape: GuidingShape,
    /// Axial position as a fraction of the main body length, in `(0, 1]`.
    pub distance: f64,
    /// Full width of the curve along x.
    pub width: f64,
    /// Height over width.
    pub aspect_ratio: f64,
    /// Rotation of the curve about the axis, degrees.
    pub rotation: f64,
}

impl Default for GuidingCurve {
    fn default() -> Self {
        Self {
            shape: GuidingShape::default(),
            distance: 1.0,
            width: 300.0,
            aspect_ratio: 0.6,
            rotation: 0.0,
        }
    }
}

/// R-OSSE profile. Angles are in degrees, lengths in millimetres.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RosseParams {
    /// Mouth radius `R`.
    pub mouth_radius: ParamValue,
    /// Coverage half-angle `a`.
    pub coverage_angle: ParamValue,
    /// Throat radius `r0`.
    pub throat_radius: ParamValue,
    /// Throat half-angle `a0`.
    pub throat_angle: ParamValue,
    /// Throat rounding `k`.
    pub k: ParamValue,
    /// Apex radius `r`.
    pub apex_radius: ParamValue,
    /// Bending `b`.
    pub bending: ParamValue,
    /// Apex shift `m`.
    pub apex_shift: ParamValue,
    /// Shape factor `q`.
    pub shape: ParamValue,
    /// Truncation of the curve parameter, `t ∈ [0, tmax]`.
    pub tmax: f64,
}

impl Default for RosseParams {
    fn default() -> Self {
        Self {
            mouth_radius: 150.0.into(),
            coverage_angle: 60.0.into(),
            throat_radius: 12.7.into(),
            throat_angle: 15.5.into(),
            k: 2.0.into(),
            apex_radius: 0.4.into(),
            bending: 0.2.into(),
            apex_shift: 0.85.into(),
            shape: 3.4.into(),
            tmax: 1.0,
        }
    }
}

/// Which half-spaces of the full horn are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Symmetry {
    #[default]
    Full,
    /// Keeps `x >= 0` (mirror plane x = 0).
    HalfX,
    /// Keeps `z >= 0` (mirror plane z = 0).
    HalfZ,
    /// Keeps `x >= 0` and `z >= 0`.
    Quarter,
}

impl Symmetry {
    #[must_use]
    pub const fn is_full(self) -> bool {
        matches!(self, Self::Full)
    }

    /// Full-circle sample count equivalent to an open arc of `arc_len` points.
    #[must_use]
    pub const fn full_circle_count(self, arc_len: usize) -> usize {
        let segments = arc_len.saturating_sub(1);
        match self {
            Self::Full => arc_len,
            Self::HalfX | Self::HalfZ => segments * 2,
            Self::Quarter => segments * 4,
        }
    }
}

/// Axial and angular sampling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SamplingParams {
    /// Points per full ring. Multiples of 4 select the shape-aware sampler.
    pub angular_segments: usize,
    /// Number of axial steps; the horn has `length_segments + 1` rings.
    pub length_segments: usize,
    /// Minimum number of segments on each rounded corner.
    pub corner_segments: usize,
    /// Corner radius used by the shape-aware sampler. Derived when unset.
    pub corner_radius: Option<f64>,
    /// Explicit axial distribution, resampled to `length_segments + 1`.
    pub slice_map: Option<Vec<f64>>,
    /// Target axial resolution at the throat (mm per step); 0 disables.
    pub throat_resolution: f64,
    /// Target axial resolution at the mouth (mm per step); 0 disables.
    pub mouth_resolution: f64,
    /// Point count of the throat ring when rings grow toward the mouth.
    pub adaptive_throat_segments: Option<usize>,
    pub symmetry: Symmetry,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            angular_segments: 80,
            length_segments: 40,
            corner_segments: 4,
            corner_radius: None,
            slice_map: None,
            throat_resolution: 0.0,
            mouth_resolution: 0.0,
            adaptive_throat_segments: None,
            symmetry: Symmetry::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MorphTarget {
    #[default]
    Rectangle,
    Circle,
}

/// Blends the mouth region toward a target cross-section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MorphParams {
    pub target: MorphTarget,
    /// Fraction of the length left untouched, in `[0, 1)`.
    pub fixed_part: f64,
    /// Blend exponent; larger values keep the profile longer.
    pub rate: f64,
    /// Corner radius of the rectangular target.
    pub corner_radius: f64,
    /// Full target width; 0 uses the measured mouth width.
    pub target_width: f64,
    /// Full target height; 0 uses the measured mouth height.
    pub target_height: f64,
    /// Allows the blended radius to fall below the profile radius.
    pub allow_shrinkage: bool,
}

impl Default for MorphParams {
    fn default() -> Self {
        Self {
            target: MorphTarget::Rectangle,
            fixed_part: 0.3,
            rate: 3.0,
            corner_radius: 35.0,
            target_width: 0.0,
            target_height: 0.0,
            allow_shrinkage: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeType {
    #[default]
    Rounded,
    Chamfered,
}

/// Baffle margins around the mouth bounding box.
///
/// `left`/`right` extend along -x/+x, `bottom`/`top` along -z/+z.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnclosureSpacing {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl EnclosureSpacing {
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            left: value,
            right: value,
            top: value,
            bottom: value,
        }
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.left.min(self.right).min(self.top).min(self.bottom)
    }
}

impl Default for EnclosureSpacing {
    fn default() -> Self {
        Self::uniform(25.0)
    }
}

/// Rectangular enclosure box behind the mouth.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnclosureParams {
    /// Distance from the baffle plane to the rear panel.
    pub depth: f64,
    /// Radius (or chamfer size) of the front and rear box edges.
    pub edge_radius: f64,
    pub edge_type: EdgeType,
    pub spacing: EnclosureSpacing,
    /// Radius of the vertical box corners, seen from the front.
    pub corner_radius: f64,
    /// Rings across each front/rear edge.
    pub edge_segments: usize,
    /// Points per full outline ring; defaults to the mouth ring's count.
    pub angular_segments: Option<usize>,
    /// Places an extra sidewall ring this far behind the front edge; the
    /// strip behind it forms the `interface` group. 0 disables.
    pub interface_offset: f64,
}

impl Default for EnclosureParams {
    fn default() -> Self {
        Self {
            depth: 200.0,
            edge_radius: 18.0,
            edge_type: EdgeType::Rounded,
            spacing: EnclosureSpacing::default(),
            corner_radius: 18.0,
            edge_segments: 4,
            angular_segments: None,
            interface_offset: 0.0,
        }
    }
}
