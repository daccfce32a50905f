//! Point masses and the per-frame mass set.

use glam::Vec3;

use crate::FieldError;

/// Bodies that contribute to the gravity well.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyId {
    Sun,
    Earth,
}

/// A point mass. Only the horizontal (x, z) position matters to the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMass {
    pub position: Vec3,
    mass: f32,
}

impl PointMass {
    /// Rejects negative or non-finite masses.
    pub fn new(position: Vec3, mass: f32) -> Result<Self, FieldError> {
        if !mass.is_finite() {
            return Err(FieldError::NonFinite { name: "mass" });
        }
        if mass < 0.0 {
            return Err(FieldError::NegativeMass(mass));
        }
        Ok(Self { position, mass })
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }
}

/// Mapping from body to point mass.
///
/// Masses are fixed once inserted; positions are rewritten every frame by
/// the scene coordinator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MassSet {
    entries: Vec<(BodyId, PointMass)>,
}

impl MassSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a body's mass.
    pub fn insert(&mut self, id: BodyId, mass: PointMass) {
        match self.entries.iter_mut().find(|(body, _)| *body == id) {
            Some((_, existing)) => *existing = mass,
            None => self.entries.push((id, mass)),
        }
    }

    /// Remove a body. Returns the removed mass, if any.
    pub fn remove(&mut self, id: BodyId) -> Option<PointMass> {
        let index = self.entries.iter().position(|(body, _)| *body == id)?;
        Some(self.entries.remove(index).1)
    }

    /// Move a body. Returns `false` if the body is not in the set.
    pub fn set_position(&mut self, id: BodyId, position: Vec3) -> bool {
        match self.entries.iter_mut().find(|(body, _)| *body == id) {
            Some((_, mass)) => {
                mass.position = position;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: BodyId) -> Option<&PointMass> {
        self.entries
            .iter()
            .find(|(body, _)| *body == id)
            .map(|(_, mass)| mass)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointMass> {
        self.entries.iter().map(|(_, mass)| mass)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
