//! Axial spin of orbiting bodies.

use glam::{DQuat, DVec3};

use crate::CircularOrbit;

/// A satellite whose spin angle is defined to equal its orbital angle.
///
/// This is a rendering rule rather than a physical result: the spin rate is
/// set to the orbital rate so one face always points at the parent, with no
/// moment-of-inertia model behind it.
#[derive(Clone, Debug, PartialEq)]
pub struct TidallyLocked {
    orbit: CircularOrbit,
}

impl TidallyLocked {
    pub fn new(orbit: CircularOrbit) -> Self {
        Self { orbit }
    }

    pub fn orbit(&self) -> &CircularOrbit {
        &self.orbit
    }

    /// Orbital angle around the parent at `time_seconds`.
    pub fn orbital_angle(&self, time_seconds: f64) -> f64 {
        self.orbit.angle_at(time_seconds)
    }

    /// Spin angle about the local Y axis. Always equal to the orbital angle.
    pub fn spin_angle(&self, time_seconds: f64) -> f64 {
        self.orbit.angle_at(time_seconds)
    }

    /// Body orientation for the current spin angle.
    ///
    /// Orbits advance from +X toward +Z, which is a negative rotation about
    /// +Y in a right-handed frame, so the quaternion uses `-spin_angle`. The
    /// satellite's local +X axis then stays radial and local -X faces the parent.
    pub fn spin_rotation(&self, time_seconds: f64) -> DQuat {
        DQuat::from_rotation_y(-self.spin_angle(time_seconds))
    }

    /// World position given the parent's current world position.
    pub fn world_position(&self, parent: DVec3, time_seconds: f64) -> DVec3 {
        parent + self.orbit.position_at(time_seconds)
    }
}

/// A body spinning at a constant rate about its Y axis (day rotation).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinningBody {
    /// Spin rate in radians per second.
    pub rate: f64,
}

impl SpinningBody {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    pub fn spin_angle(&self, time_seconds: f64) -> f64 {
        self.rate * time_seconds
    }

    pub fn spin_rotation(&self, time_seconds: f64) -> DQuat {
        DQuat::from_rotation_y(self.spin_angle(time_seconds))
    }
}
