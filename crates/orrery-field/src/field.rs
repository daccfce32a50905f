//! Softened inverse-square displacement field.

use glam::{Vec2, Vec3};

use crate::{FieldError, PointMass};

/// Added to every horizontal distance so a query exactly under a mass never
/// divides by a zero distance. Must match `DISTANCE_EPSILON` in the grid shader.
pub const DISTANCE_EPSILON: f32 = 1e-4;

/// Field constants: strength `g` and softening `falloff`.
///
/// `falloff` has no physical derivation. It is a visual tuning parameter and
/// only has to stay positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravityField {
    g: f32,
    falloff: f32,
}

impl GravityField {
    pub fn new(g: f32, falloff: f32) -> Result<Self, FieldError> {
        if !g.is_finite() {
            return Err(FieldError::NonFinite { name: "g" });
        }
        if !falloff.is_finite() {
            return Err(FieldError::NonFinite { name: "falloff" });
        }
        if g < 0.0 {
            return Err(FieldError::NegativeGravity(g));
        }
        if falloff <= 0.0 {
            return Err(FieldError::NonPositiveFalloff(falloff));
        }
        Ok(Self { g, falloff })
    }

    pub fn g(&self) -> f32 {
        self.g
    }

    pub fn falloff(&self) -> f32 {
        self.falloff
    }

    /// Dip contributed by one mass at a query point on the plane.
    ///
    /// Returns the negative vertical offset `-g·m / (d² + falloff)` where `d`
    /// is the horizontal distance plus [`DISTANCE_EPSILON`].
    pub fn point_displacement(&self, query_xz: Vec2, mass: &PointMass) -> f32 {
        -self.magnitude(query_xz, mass)
    }

    /// Vertical offset at `query_xz` from every mass in `masses`.
    ///
    /// Pure: nothing is cached, every call recomputes from the current
    /// positions.
    pub fn displacement<'a>(
        &self,
        query_xz: Vec2,
        masses: impl IntoIterator<Item = &'a PointMass>,
    ) -> f32 {
        let dip: f32 = masses
            .into_iter()
            .map(|mass| self.magnitude(query_xz, mass))
            .sum();
        -dip
    }

    /// Displaced copy of a point lying on the undeformed plane.
    pub fn displace<'a>(
        &self,
        point: Vec3,
        masses: impl IntoIterator<Item = &'a PointMass>,
    ) -> Vec3 {
        let offset = self.displacement(Vec2::new(point.x, point.z), masses);
        Vec3::new(point.x, point.y + offset, point.z)
    }

    fn magnitude(&self, query_xz: Vec2, mass: &PointMass) -> f32 {
        let source = Vec2::new(mass.position.x, mass.position.z);
        let d = query_xz.distance(source) + DISTANCE_EPSILON;
        self.g * mass.mass() / (d * d + self.falloff)
    }
}
