//! Profile evaluation: `(t, p) -> (axial, radius)`.
//!
//! `t ∈ [0, 1]` runs from throat to mouth and `p` is the azimuth in radians.
//! OSSE treats `t` as a fraction of the effective length (extension, slot and
//! main body); R-OSSE treats it as the curve parameter scaled by `tmax`.
//!
//! Evaluation never fails. Degenerate terms are guarded (a vanishing
//! termination, a near-zero coverage slope) and invalid inputs surface as
//! non-finite values that parameter validation and the quality report flag.

use crate::geom::{ProfileCache, Vec2, sqrt_clamped};

use super::params::{
    CircularArc, GuidingCurve, GuidingShape, OsseParams, ProfileParams, RosseParams,
};

/// One profile sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePoint {
    /// Distance from the throat along the horn axis.
    pub axial: f64,
    /// Distance from the axis.
    pub radius: f64,
}

/// Lower bound of the coverage search, degrees.
const MIN_COVERAGE_DEG: f64 = 0.5;
/// Upper bound of the coverage search, degrees.
const MAX_COVERAGE_DEG: f64 = 89.5;
const COVERAGE_ITERATIONS: usize = 64;

/// Evaluates the profile at `(t, p)`.
pub fn evaluate_profile(t: f64, p: f64, profile: &ProfileParams, cache: &mut ProfileCache) -> ProfilePoint {
    match profile {
        ProfileParams::Osse(params) => osse_point(t, p, params, cache),
        ProfileParams::ROsse(params) => rosse_point(t, p, params, cache),
    }
}

/// Radius only; see [`evaluate_profile`].
#[inline]
pub fn profile_radius(t: f64, p: f64, profile: &ProfileParams, cache: &mut ProfileCache) -> f64 {
    evaluate_profile(t, p, profile, cache).radius
}

/// Effective axial length of the profile at azimuth `p`.
pub fn profile_length(p: f64, profile: &ProfileParams, cache: &mut ProfileCache) -> f64 {
    match profile {
        ProfileParams::Osse(params) => params.lead_in_length() + params.length.eval(p),
        ProfileParams::ROsse(_) => evaluate_profile(1.0, p, profile, cache).axial,
    }
}

// OSSE

/// The OSSE terms at one azimuth, angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OsseTerms {
    pub length: f64,
    pub throat_radius: f64,
    pub throat_angle: f64,
    pub coverage_angle: f64,
    pub k: f64,
    pub s: f64,
    pub n: f64,
    pub q: f64,
}

impl OsseTerms {
    /// OSSE radius at axial position `z` of the main body.
    #[must_use]
    pub fn radius(&self, z: f64) -> f64 {
        let kr0 = self.k * self.throat_radius;
        let tan_a0 = self.throat_angle.tan();
        let tan_a = self.coverage_angle.tan();
        let expansion = sqrt_clamped(kr0 * kr0 + 2.0 * kr0 * z * tan_a0 + z * z * tan_a * tan_a);
        expansion + self.throat_radius * (1.0 - self.k) + self.termination(z)
    }

    /// Termination term `rTERM`; zero whenever `q` or `n` is not positive.
    #[must_use]
    pub fn termination(&self, z: f64) -> f64 {
        if self.q <= 0.0 || self.n <= 0.0 || self.length <= 0.0 {
            return 0.0;
        }
        let amplitude = self.s * self.length / self.q;
        let u = self.q * z / self.length;
        if u > 1.0 {
            return amplitude;
        }
        let inner = (1.0 - u.max(0.0).powf(self.n)).max(0.0);
        amplitude * (1.0 - inner.powf(1.0 / self.n))
    }
}

fn osse_point(t: f64, p: f64, params: &OsseParams, cache: &mut ProfileCache) -> ProfilePoint {
    let ext_length = params.throat_ext_length.max(0.0);
    let slot_length = params.slot_length.max(0.0);
    let ext_tan = params.throat_ext_angle.to_radians().tan();
    let r0 = params.throat_radius.eval(p);
    let body_r0 = r0 + ext_length * ext_tan;

    let mut terms = OsseTerms {
        length: params.length.eval(p),
        throat_radius: body_r0,
        throat_angle: params.throat_angle.eval_radians(p),
        coverage_angle: 0.0,
        k: params.k.eval(p),
        s: params.s.eval(p),
        n: params.n.eval(p),
        q: params.q.eval(p),
    };

    let total = ext_length + slot_length + terms.length;
    let z = t * total;

    if ext_length > 0.0 && z <= ext_length {
        return ProfilePoint {
            axial: z,
            radius: r0 + z * ext_tan,
        };
    }
    if z <= ext_length + slot_length {
        return ProfilePoint { axial: z, radius: body_r0 };
    }

    terms.coverage_angle = match &params.guiding_curve {
        Some(curve) => cache
            .get_or_insert_coverage(p, || guided_coverage_deg(p, &terms, curve))
            .to_radians(),
        None => params.coverage_angle.eval_radians(p),
    };

    let body_z = z - ext_length - slot_length;
    let radius = match params.circular_arc {
        Some(arc) => ArcBody::fit(&terms, arc).radius(body_z),
        None => terms.radius(body_z),
    };
    ProfilePoint { axial: z, radius }
}

/// The main body replaced by an arc (or, when no arc fits, a line) from the
/// throat point to the OSSE mouth point.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ArcBody {
    Arc { center: Vec2, radius: f64, lower: bool },
    Line { start: Vec2, end: Vec2 },
}

impl ArcBody {
    /// Points are `Vec2 { x: axial, z: radius }`.
    fn fit(terms: &OsseTerms, arc: CircularArc) -> Self {
        let start = Vec2::new(0.0, terms.throat_radius);
        let end = Vec2::new(terms.length, terms.radius(terms.length));
        let line = Self::Line { start, end };
        let chord = end - start;
        let chord_len = chord.length();
        if !(chord_len > 0.0) || !chord_len.is_finite() {
            return line;
        }

        let candidate = match arc {
            CircularArc::Radius(radius) => {
                let radius = radius.abs().max(chord_len * 0.5);
                let h = sqrt_clamped(radius * radius - chord_len * chord_len * 0.25);
                // Left of the chord direction, i.e. outside the flare.
                let normal = Vec2::new(-chord.z, chord.x) * (1.0 / chord_len);
                let center = start.lerp(end, 0.5) + normal * h;
                Self::Arc { center, radius, lower: true }
            }
            CircularArc::TerminalAngle(angle_deg) => {
                let phi = angle_deg.to_radians();
                let m = Vec2::new(-phi.sin(), phi.cos());
                let denom = 2.0 * chord.dot(m);
                if denom.abs() <= f64::EPSILON * chord_len {
                    return line;
                }
                let rho = -(chord_len * chord_len) / denom;
                Self::Arc {
                    center: end + m * rho,
                    radius: rho.abs(),
                    lower: rho > 0.0,
                }
            }
        };

        let tolerance = 1e-6 * (1.0 + chord_len);
        let fits = (candidate.radius(start.x) - start.z).abs() <= tolerance
            && (candidate.radius(end.x) - end.z).abs() <= tolerance;
        if fits { candidate } else { line }
    }

    fn radius(&self, z: f64) -> f64 {
        match *self {
            Self::Arc { center, radius, lower } => {
                let dz = z - center.x;
                let h = sqrt_clamped(radius * radius - dz * dz);
                if lower { center.z - h } else { center.z + h }
            }
            Self::Line { start, end } => {
                let span = end.x - start.x;
                if span.abs() <= f64::EPSILON {
                    return end.z;
                }
                start.z + (end.z - start.z) * ((z - start.x) / span)
            }
        }
    }
}

impl GuidingCurve {
    /// Polar radius of the curve at azimuth `p`.
    #[must_use]
    pub fn polar_radius(&self, p: f64) -> f64 {
        let half_width = self.width * 0.5;
        let half_height = half_width * self.aspect_ratio;
        let angle = p - self.rotation.to_radians();
        let (sin, cos) = angle.sin_cos();
        match self.shape {
            GuidingShape::Superellipse { exponent } => {
                if half_width <= 0.0 || half_height <= 0.0 || exponent <= 0.0 {
                    return 0.0;
                }
                let sum = (cos / half_width).abs().powf(exponent) + (sin / half_height).abs().powf(exponent);
                if sum > 0.0 { sum.powf(-1.0 / exponent) } else { 0.0 }
            }
            GuidingShape::Superformula { a, b, m, n1, n2, n3 } => {
                if a == 0.0 || b == 0.0 || n1 == 0.0 {
                    return 0.0;
                }
                let phase = m * angle * 0.25;
                let sum = (phase.cos() / a).abs().powf(n2) + (phase.sin() / b).abs().powf(n3);
                if sum > 0.0 {
                    sum.powf(-1.0 / n1) * half_width
                } else {
                    0.0
                }
            }
        }
    }
}

/// Coverage angle (degrees) that puts the OSSE wall on the guiding curve.
///
/// The OSSE radius grows monotonically with the coverage angle, so a
/// bisection over `[MIN_COVERAGE_DEG, MAX_COVERAGE_DEG]` converges; targets
/// outside the reachable range clamp to the nearest bound.
#[must_use]
pub fn guided_coverage_deg(p: f64, terms: &OsseTerms, curve: &GuidingCurve) -> f64 {
    let target = curve.polar_radius(p);
    let z = curve.distance.clamp(0.0, 1.0) * terms.length;
    let radius_at = |deg: f64| {
        OsseTerms {
            coverage_angle: deg.to_radians(),
            ..*terms
        }
        .radius(z)
    };

    let (mut lo, mut hi) = (MIN_COVERAGE_DEG, MAX_COVERAGE_DEG);
    if !target.is_finite() || radius_at(lo) >= target {
        return lo;
    }
    if radius_at(hi) <= target {
        return hi;
    }
    for _ in 0..COVERAGE_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if radius_at(mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

// R-OSSE

/// R-OSSE coefficients `c1, c2, c3` at one azimuth.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RosseTerms {
    c1: f64,
    c2: f64,
    c3: f64,
}

impl RosseTerms {
    fn new(r0: f64, a0: f64, a: f64, k: f64) -> Self {
        let kr0 = k * r0;
        let tan_a = a.tan();
        Self {
            c1: kr0 * kr0,
            c2: 2.0 * kr0 * a0.tan(),
            c3: tan_a * tan_a,
        }
    }

    /// Axial length `L` at which the expansion reaches the mouth radius.
    fn length(&self, mouth_radius: f64, r0: f64, k: f64) -> f64 {
        let reach = mouth_radius + r0 * (k - 1.0);
        if self.c3.abs() <= f64::EPSILON {
            // The quadratic degenerates to c1 + c2 L = reach².
            return if self.c2.abs() > f64::EPSILON {
                ((reach * reach - self.c1) / self.c2).max(0.0)
            } else {
                0.0
            };
        }
        let disc = self.c2 * self.c2 - 4.0 * self.c3 * (self.c1 - reach * reach);
        (sqrt_clamped(disc) - self.c2) / (2.0 * self.c3)
    }
}

fn rosse_point(t: f64, p: f64, params: &RosseParams, cache: &mut ProfileCache) -> ProfilePoint {
    let mouth_radius = params.mouth_radius.eval(p);
    let r0 = params.throat_radius.eval(p);
    let k = params.k.eval(p);
    let terms = RosseTerms::new(
        r0,
        params.throat_angle.eval_radians(p),
        params.coverage_angle.eval_radians(p),
        k,
    );
    let length = cache.get_or_insert_rosse_length(p, || terms.length(mouth_radius, r0, k));

    let r = params.apex_radius.eval(p);
    let b = params.bending.eval(p);
    let m = params.apex_shift.eval(p);
    let q = params.shape.eval(p);
    let tt = t * params.tmax;

    let r2 = r * r;
    let axial = length * ((r2 + m * m).sqrt() - (r2 + (tt - m) * (tt - m)).sqrt())
        + b * length * ((r2 + (1.0 - m) * (1.0 - m)).sqrt() - (r2 + m * m).sqrt()) * tt * tt;

    let blend = tt.powf(q);
    let RosseTerms { c1, c2, c3 } = terms;
    let throat_side = sqrt_clamped(c1 + c2 * length * tt + c3 * length * length * tt * tt) + r0 * (1.0 - k);
    let mouth_side = mouth_radius + length * (1.0 - (1.0 + c3 * (tt - 1.0) * (tt - 1.0)).sqrt());
    let radius = (1.0 - blend) * throat_side + blend * mouth_side;

    ProfilePoint { axial, radius }
}
