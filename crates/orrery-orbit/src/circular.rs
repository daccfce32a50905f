//! Circular orbits around a fixed parent.

use glam::DVec3;

use crate::OrbitError;

/// A circular orbit in the horizontal (x, z) plane of its parent.
///
/// The angular rate `ω = sqrt(g_orbit · M / r³)` is computed once in
/// [`CircularOrbit::new`]. Angles are unbounded and grow linearly with time.
#[derive(Clone, Debug, PartialEq)]
pub struct CircularOrbit {
    radius: f64,
    height: f64,
    angular_rate: f64,
}

impl CircularOrbit {
    /// Build an orbit from the orbital pseudo-gravity constant, the parent's
    /// mass, the orbit radius and the height of the orbital plane.
    ///
    /// Rejects a non-positive radius, a negative mass or constant, and any
    /// non-finite input. Nothing is clamped.
    pub fn new(
        g_orbit: f64,
        central_mass: f64,
        radius: f64,
        height: f64,
    ) -> Result<Self, OrbitError> {
        for (name, value) in [
            ("g_orbit", g_orbit),
            ("central_mass", central_mass),
            ("radius", radius),
            ("height", height),
        ] {
            if !value.is_finite() {
                return Err(OrbitError::NonFinite { name });
            }
        }
        if radius <= 0.0 {
            return Err(OrbitError::NonPositiveRadius(radius));
        }
        if central_mass < 0.0 {
            return Err(OrbitError::NegativeMass(central_mass));
        }
        if g_orbit < 0.0 {
            return Err(OrbitError::NegativeGravity(g_orbit));
        }

        let angular_rate = (g_orbit * central_mass / radius.powi(3)).sqrt();
        Ok(Self {
            radius,
            height,
            angular_rate,
        })
    }

    /// Orbit radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Height of the orbital plane.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Angular rate ω in radians per second.
    pub fn angular_rate(&self) -> f64 {
        self.angular_rate
    }

    /// Time for one full revolution. Infinite for a massless parent.
    pub fn period(&self) -> f64 {
        if self.angular_rate > 0.0 {
            std::f64::consts::TAU / self.angular_rate
        } else {
            f64::INFINITY
        }
    }

    /// Orbital angle `ω · t` in radians. Not wrapped.
    pub fn angle_at(&self, time_seconds: f64) -> f64 {
        self.angular_rate * time_seconds
    }

    /// Offset from the parent at `time_seconds`:
    /// `(r·cos(ωt), height, r·sin(ωt))`.
    pub fn position_at(&self, time_seconds: f64) -> DVec3 {
        let angle = self.angle_at(time_seconds);
        DVec3::new(
            self.radius * angle.cos(),
            self.height,
            self.radius * angle.sin(),
        )
    }
}
