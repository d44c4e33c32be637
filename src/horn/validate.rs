//! Parameter validation.
//!
//! Reports domain violations without touching geometry. Azimuth-dependent
//! values are probed at a handful of azimuths; the first failing azimuth is
//! named in the message.

use std::f64::consts::TAU;
use std::fmt;

use serde::Serialize;

use crate::geom::ProfileCache;

use super::expr::ParamValue;
use super::params::{
    CircularArc, EnclosureParams, GuidingCurve, GuidingShape, HornParams, MorphParams, OsseParams,
    ProfileParams, RosseParams, SamplingParams,
};
use super::profile::profile_length;

/// Azimuths probed for expression-valued parameters.
const PROBE_COUNT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Warning,
    Error,
}

/// One finding about the parameter record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamIssue {
    /// Dotted path of the offending field, e.g. `profile.throatRadius`.
    pub param: String,
    pub message: String,
    pub severity: Severity,
}

impl ParamIssue {
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ParamIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{level}: {}: {}", self.param, self.message)
    }
}

#[derive(Default)]
struct Issues(Vec<ParamIssue>);

impl Issues {
    fn push(&mut self, param: &str, severity: Severity, message: impl Into<String>) {
        self.0.push(ParamIssue {
            param: param.to_string(),
            message: message.into(),
            severity,
        });
    }

    fn error(&mut self, param: &str, message: impl Into<String>) {
        self.push(param, Severity::Error, message);
    }

    fn warning(&mut self, param: &str, message: impl Into<String>) {
        self.push(param, Severity::Warning, message);
    }

    /// Probes `value` and reports the first azimuth where `ok` fails.
    fn check(
        &mut self,
        param: &str,
        value: &ParamValue,
        severity: Severity,
        requirement: &str,
        ok: impl Fn(f64) -> bool,
    ) {
        let probes: &[f64] = if value.is_constant() { &[0.0] } else { &PROBES };
        for &p in probes {
            let v = value.eval(p);
            if !v.is_finite() {
                self.error(param, format!("not finite at p = {p:.3} rad"));
                return;
            }
            if !ok(v) {
                let at = if value.is_constant() { String::new() } else { format!(" at p = {p:.3} rad") };
                self.push(param, severity, format!("{v} {requirement}{at}"));
                return;
            }
        }
    }
}

const PROBES: [f64; PROBE_COUNT] = {
    let mut out = [0.0; PROBE_COUNT];
    let mut i = 0;
    while i < PROBE_COUNT {
        out[i] = TAU * i as f64 / PROBE_COUNT as f64;
        i += 1;
    }
    out
};

/// Checks the whole parameter record.
#[must_use]
pub fn validate_params(params: &HornParams) -> Vec<ParamIssue> {
    let mut issues = Issues::default();
    match &params.profile {
        ProfileParams::Osse(osse) => check_osse(&mut issues, osse),
        ProfileParams::ROsse(rosse) => check_rosse(&mut issues, rosse),
    }
    check_sampling(&mut issues, &params.sampling);
    if let Some(morph) = &params.morph {
        check_morph(&mut issues, morph);
    }
    if let Some(enclosure) = &params.enclosure {
        check_enclosure(&mut issues, enclosure, &params.profile);
    }
    issues.0
}

fn check_throat(issues: &mut Issues, throat_radius: &ParamValue, throat_angle: &ParamValue, k: &ParamValue) {
    use Severity::Error;
    issues.check("profile.throatRadius", throat_radius, Error, "must be > 0", |v| v > 0.0);
    issues.check("profile.throatAngle", throat_angle, Error, "must be within [0, 90) degrees", |v| {
        (0.0..90.0).contains(&v)
    });
    issues.check("profile.k", k, Error, "must be > 0", |v| v > 0.0);
}

fn check_coverage(issues: &mut Issues, coverage: &ParamValue, throat_angle: &ParamValue) {
    issues.check(
        "profile.coverageAngle",
        coverage,
        Severity::Error,
        "must be within (0, 90) degrees",
        |v| v > 0.0 && v < 90.0,
    );
    let narrows = PROBES
        .iter()
        .any(|&p| coverage.eval(p) < throat_angle.eval(p));
    if narrows {
        issues.warning("profile.coverageAngle", "smaller than the throat angle; the wall narrows");
    }
}

fn check_osse(issues: &mut Issues, osse: &OsseParams) {
    use Severity::{Error, Warning};
    issues.check("profile.length", &osse.length, Error, "must be > 0", |v| v > 0.0);
    check_throat(issues, &osse.throat_radius, &osse.throat_angle, &osse.k);
    if osse.guiding_curve.is_none() {
        check_coverage(issues, &osse.coverage_angle, &osse.throat_angle);
    }
    issues.check("profile.s", &osse.s, Warning, "is negative", |v| v >= 0.0);
    issues.check("profile.n", &osse.n, Warning, "disables the termination (must be > 0)", |v| v > 0.0);
    issues.check("profile.q", &osse.q, Warning, "disables the termination (must be > 0)", |v| v > 0.0);

    if osse.throat_ext_length < 0.0 {
        issues.warning("profile.throatExtLength", "negative length treated as 0");
    }
    if osse.slot_length < 0.0 {
        issues.warning("profile.slotLength", "negative length treated as 0");
    }
    if !(-90.0..90.0).contains(&osse.throat_ext_angle) {
        issues.error("profile.throatExtAngle", "must be within (-90, 90) degrees");
    }
    if let Some(CircularArc::Radius(r) | CircularArc::TerminalAngle(r)) = osse.circular_arc {
        if !r.is_finite() {
            issues.error("profile.circularArc", "must be finite");
        }
    }
    if let Some(curve) = &osse.guiding_curve {
        check_guiding_curve(issues, curve);
    }
}

fn check_guiding_curve(issues: &mut Issues, curve: &GuidingCurve) {
    if !(curve.distance > 0.0 && curve.distance <= 1.0) {
        issues.error("profile.guidingCurve.distance", "must be within (0, 1]");
    }
    if !(curve.width > 0.0) {
        issues.error("profile.guidingCurve.width", "must be > 0");
    }
    if !(curve.aspect_ratio > 0.0) {
        issues.error("profile.guidingCurve.aspectRatio", "must be > 0");
    }
    match curve.shape {
        GuidingShape::Superellipse { exponent } if !(exponent > 0.0) => {
            issues.error("profile.guidingCurve.exponent", "must be > 0");
        }
        GuidingShape::Superformula { a, b, n1, .. } if a == 0.0 || b == 0.0 || n1 == 0.0 => {
            issues.error("profile.guidingCurve", "superformula a, b and n1 must be non-zero");
        }
        _ => {}
    }
}

fn check_rosse(issues: &mut Issues, rosse: &RosseParams) {
    use Severity::{Error, Warning};
    check_throat(issues, &rosse.throat_radius, &rosse.throat_angle, &rosse.k);
    check_coverage(issues, &rosse.coverage_angle, &rosse.throat_angle);
    issues.check("profile.mouthRadius", &rosse.mouth_radius, Error, "must be > 0", |v| v > 0.0);
    let too_small = PROBES
        .iter()
        .any(|&p| rosse.mouth_radius.eval(p) <= rosse.throat_radius.eval(p));
    if too_small {
        issues.error("profile.mouthRadius", "must exceed the throat radius");
    }
    issues.check("profile.apexRadius", &rosse.apex_radius, Warning, "is negative", |v| v >= 0.0);
    issues.check("profile.apexShift", &rosse.apex_shift, Warning, "is outside [0, 1]", |v| {
        (0.0..=1.0).contains(&v)
    });
    issues.check("profile.shape", &rosse.shape, Warning, "must be > 0", |v| v > 0.0);
    issues.check("profile.bending", &rosse.bending, Warning, "is negative", |v| v >= 0.0);
    if !(rosse.tmax > 0.0 && rosse.tmax <= 1.0) {
        issues.error("profile.tmax", "must be within (0, 1]");
    }
}

fn check_sampling(issues: &mut Issues, sampling: &SamplingParams) {
    if sampling.angular_segments < 4 {
        issues.error("sampling.angularSegments", "must be at least 4");
    } else if !sampling.symmetry.is_full() && sampling.angular_segments % 4 != 0 {
        issues.warning(
            "sampling.angularSegments",
            "not a multiple of 4; symmetry planes get inserted boundary points",
        );
    }
    if sampling.length_segments == 0 {
        issues.error("sampling.lengthSegments", "must be at least 1");
    }
    if let Some(map) = &sampling.slice_map {
        if map.iter().any(|v| !v.is_finite()) {
            issues.warning("sampling.sliceMap", "non-finite values are ignored");
        }
        if map.len() < 2 {
            issues.warning("sampling.sliceMap", "fewer than 2 values; falling back");
        }
    }
    if sampling.throat_resolution < 0.0 || sampling.mouth_resolution < 0.0 {
        issues.warning("sampling.throatResolution", "negative resolutions disable grading");
    }
    if let Some(count) = sampling.adaptive_throat_segments {
        if count > sampling.angular_segments {
            issues.warning("sampling.adaptiveThroatSegments", "exceeds angularSegments; clamped");
        }
    }
    if sampling.corner_radius.is_some_and(|r| r < 0.0) {
        issues.warning("sampling.cornerRadius", "negative radius treated as 0");
    }
}

fn check_morph(issues: &mut Issues, morph: &MorphParams) {
    if !(0.0..1.0).contains(&morph.fixed_part) {
        issues.error("morph.fixedPart", "must be within [0, 1)");
    }
    if !(morph.rate > 0.0) {
        issues.error("morph.rate", "must be > 0");
    }
    if morph.target_width < 0.0 || morph.target_height < 0.0 {
        issues.warning("morph.targetWidth", "negative target dimensions use the mouth size");
    }
    if morph.corner_radius < 0.0 {
        issues.warning("morph.cornerRadius", "negative radius treated as 0");
    }
}

fn check_enclosure(issues: &mut Issues, enclosure: &EnclosureParams, profile: &ProfileParams) {
    if !(enclosure.depth > 0.0) {
        issues.error("enclosure.depth", "must be > 0");
    } else {
        // The rear panel sits `depth` behind the mouth; it must clear the throat.
        let mut cache = ProfileCache::new();
        let length = PROBES
            .iter()
            .map(|&p| profile_length(p, profile, &mut cache))
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max);
        if enclosure.depth <= length {
            let message = format!(
                "{} does not reach behind the throat (horn length {length:.3}); the rear panel cuts the horn wall",
                enclosure.depth
            );
            issues.warning("enclosure.depth", message);
        }
    }
    if enclosure.edge_radius < 0.0 {
        issues.warning("enclosure.edgeRadius", "negative radius treated as 0");
    }
    let spacing = enclosure.spacing;
    if [spacing.left, spacing.right, spacing.top, spacing.bottom]
        .iter()
        .any(|&v| v < 0.0)
    {
        issues.warning("enclosure.spacing", "negative margins treated as 0");
    }
    if enclosure.edge_segments == 0 {
        issues.warning("enclosure.edgeSegments", "0 treated as 1");
    }
    if enclosure.angular_segments.is_some_and(|n| n < 4) {
        issues.error("enclosure.angularSegments", "must be at least 4");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_clean() {
        assert!(validate_params(&HornParams::default()).is_empty());
        let osse = HornParams {
            profile: ProfileParams::Osse(OsseParams::default()),
            ..HornParams::default()
        };
        assert!(validate_params(&osse).is_empty());
    }

    #[test]
    fn negative_throat_radius_is_an_error() {
        let params = HornParams {
            profile: ProfileParams::Osse(OsseParams {
                throat_radius: (-1.0).into(),
                ..OsseParams::default()
            }),
            ..HornParams::default()
        };
        let issues = validate_params(&params);
        assert!(issues.iter().any(|i| i.is_error() && i.param == "profile.throatRadius"));
    }

    #[test]
    fn expression_failure_names_the_azimuth() {
        let params = HornParams {
            profile: ProfileParams::ROsse(RosseParams {
                coverage_angle: ParamValue::expression(|p| if p > 3.0 { 95.0 } else { 60.0 }),
                ..RosseParams::default()
            }),
            ..HornParams::default()
        };
        let issues = validate_params(&params);
        let issue = issues
            .iter()
            .find(|i| i.param == "profile.coverageAngle")
            .expect("coverage issue");
        assert!(issue.message.contains("at p ="), "{issue}");
    }

    #[test]
    fn morph_domain_is_checked() {
        let params = HornParams {
            morph: Some(MorphParams {
                fixed_part: 1.0,
                rate: 0.0,
                ..MorphParams::default()
            }),
            ..HornParams::default()
        };
        let errors = validate_params(&params).into_iter().filter(ParamIssue::is_error).count();
        assert_eq!(errors, 2);
    }

    #[test]
    fn shallow_enclosure_is_flagged() {
        let osse = OsseParams {
            length: 120.0.into(),
            ..OsseParams::default()
        };
        let shallow = HornParams {
            profile: ProfileParams::Osse(osse.clone()),
            enclosure: Some(EnclosureParams {
                depth: 50.0,
                ..EnclosureParams::default()
            }),
            ..HornParams::default()
        };
        let issues = validate_params(&shallow);
        let issue = issues
            .iter()
            .find(|i| i.param == "enclosure.depth")
            .expect("depth warning");
        assert_eq!(issue.severity, Severity::Warning);

        let deep = HornParams {
            profile: ProfileParams::Osse(osse),
            enclosure: Some(EnclosureParams {
                depth: 150.0,
                ..EnclosureParams::default()
            }),
            ..HornParams::default()
        };
        assert!(validate_params(&deep).iter().all(|i| i.param != "enclosure.depth"));
    }
}
