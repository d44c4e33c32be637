//! Rounded or chamfered rectangles in the cross-section plane.
//!
//! Shared by the morph target (polar radius of a rounded rectangle), the
//! angular sampler (corner placement) and the enclosure (ray-cast outline
//! with outward normals for insetting).

use crate::geom::{Vec2, sqrt_clamped};

use super::params::EdgeType;

/// A point on an outline together with its outward unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlinePoint {
    pub position: Vec2,
    pub normal: Vec2,
}

impl OutlinePoint {
    /// Moves the point `distance` along the inward normal.
    #[must_use]
    pub fn inset(&self, distance: f64) -> Vec2 {
        self.position - self.normal * distance
    }
}

/// Axis-aligned rectangle with rounded or chamfered corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedBox {
    pub center: Vec2,
    pub half_width: f64,
    pub half_height: f64,
    /// Corner radius (or chamfer leg), already clamped to the half extents.
    pub corner: f64,
    pub style: EdgeType,
}

impl RoundedBox {
    /// Builds a box; the corner is clamped to `[0, min(half_width, half_height)]`
    /// and dropped entirely when either extent is degenerate.
    #[must_use]
    pub fn new(center: Vec2, half_width: f64, half_height: f64, corner: f64, style: EdgeType) -> Self {
        let half_width = half_width.max(0.0);
        let half_height = half_height.max(0.0);
        let limit = half_width.min(half_height);
        let corner = if limit <= f64::EPSILON || !corner.is_finite() {
            0.0
        } else {
            corner.clamp(0.0, limit)
        };
        Self {
            center,
            half_width,
            half_height,
            corner,
            style,
        }
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.half_width <= f64::EPSILON || self.half_height <= f64::EPSILON
    }

    /// Intersection of the ray from the center at `angle` with the outline.
    #[must_use]
    pub fn ray_hit(&self, angle: f64) -> OutlinePoint {
        let (sin, cos) = angle.sin_cos();
        let sx = if cos < 0.0 { -1.0 } else { 1.0 };
        let sz = if sin < 0.0 { -1.0 } else { 1.0 };
        let (local, normal) = self.first_quadrant_hit(cos.abs(), sin.abs());
        OutlinePoint {
            position: self.center + Vec2::new(sx * local.x, sz * local.z),
            normal: Vec2::new(sx * normal.x, sz * normal.z),
        }
    }

    /// Distance from the center to the outline along `angle`.
    #[must_use]
    pub fn polar_radius(&self, angle: f64) -> f64 {
        (self.ray_hit(angle).position - self.center).length()
    }

    /// Hit point and normal for a direction `(c, s)` with `c, s >= 0`.
    fn first_quadrant_hit(&self, c: f64, s: f64) -> (Vec2, Vec2) {
        let w = self.half_width;
        let h = self.half_height;
        let rc = self.corner;
        const EPS: f64 = 1e-12;

        if c > EPS {
            let t = w / c;
            if t * s <= h - rc + EPS * (1.0 + h) {
                return (Vec2::new(w, t * s), Vec2::new(1.0, 0.0));
            }
        }
        if s > EPS {
            let t = h / s;
            if t * c <= w - rc + EPS * (1.0 + w) {
                return (Vec2::new(t * c, h), Vec2::new(0.0, 1.0));
            }
        }

        if rc <= EPS {
            // Sharp corner reached exactly.
            let diagonal = Vec2::new(1.0, 1.0) * std::f64::consts::FRAC_1_SQRT_2;
            return (Vec2::new(w, h), diagonal);
        }

        match self.style {
            EdgeType::Rounded => {
                let corner_center = Vec2::new(w - rc, h - rc);
                let b = c * corner_center.x + s * corner_center.z;
                let disc = b * b - (corner_center.dot(corner_center) - rc * rc);
                let t = b + sqrt_clamped(disc);
                let hit = Vec2::new(t * c, t * s);
                let normal = (hit - corner_center)
                    .normalized()
                    .unwrap_or(Vec2::new(1.0, 1.0) * std::f64::consts::FRAC_1_SQRT_2);
                (hit, normal)
            }
            EdgeType::Chamfered => {
                // Chamfer line x + z = w + h - rc.
                let t = (w + h - rc) / (c + s);
                let normal = Vec2::new(1.0, 1.0) * std::f64::consts::FRAC_1_SQRT_2;
                (Vec2::new(t * c, t * s), normal)
            }
        }
    }
}
