//! Distance fade and anti-aliased line coverage for the grid surface.
//!
//! Host mirrors of the fragment-shader functions, so their edge behaviour
//! can be tested without a GPU.

use glam::{Vec2, Vec3};

use crate::FieldError;

/// Hermite step, `3t² - 2t³` with `t = clamp((x - edge0) / (edge1 - edge0), 0, 1)`.
///
/// Same definition as the WGSL builtin. Callers must keep `edge0 < edge1`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Opacity fade by horizontal distance from a reference point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeParameters {
    start: f32,
    end: f32,
}

impl FadeParameters {
    /// Fully opaque inside `start`, fully transparent beyond `end`.
    pub fn new(start: f32, end: f32) -> Result<Self, FieldError> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || start >= end {
            return Err(FieldError::InvalidFade { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    /// `1 - smoothstep(start, end, distance)`, always in `[0, 1]`.
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 - smoothstep(self.start, self.end, distance)
    }

    /// Fade for `point`, measured in the xz plane from `reference`.
    ///
    /// No reference (e.g. the spacecraft has not loaded yet) means the
    /// distance is measured from the world origin.
    pub fn factor_at(&self, reference: Option<Vec3>, point: Vec3) -> f32 {
        let reference = reference.unwrap_or(Vec3::ZERO);
        let distance = Vec2::new(point.x - reference.x, point.z - reference.z).length();
        self.factor(distance)
    }
}

/// Anti-aliased coverage of unit-spaced grid lines.
///
/// `coord` is the grid-space coordinate (world xz divided by line spacing)
/// and `derivative` its screen-space rate of change, i.e. `fwidth(coord)` in
/// the shader. Returns 1 on a line and falls to 0 about one pixel away.
pub fn grid_line_coverage(coord: Vec2, derivative: Vec2) -> f32 {
    let shifted = coord - Vec2::splat(0.5);
    let wrapped = shifted - shifted.floor();
    let distance = (wrapped - Vec2::splat(0.5)).abs();
    let g = distance / derivative.max(Vec2::splat(f32::EPSILON));
    1.0 - g.x.min(g.y).min(1.0)
}
