//! Batch evaluation of the field over a square patch of the plane.

use glam::{Vec2, Vec3};
use rayon::prelude::*;

use crate::{FieldError, GravityField, PointMass};

/// Largest number of samples per side a [`GridSampler`] accepts.
pub const MAX_RESOLUTION: u32 = 8192;

/// Evaluates a [`GravityField`] over a regular grid centred on the origin.
#[derive(Clone, Copy, Debug)]
pub struct GridSampler {
    field: GravityField,
    size: f32,
    resolution: u32,
}

/// Row-major displacement samples; row index grows along +Z, column along +X.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightmap {
    pub resolution: u32,
    pub size: f32,
    pub values: Vec<f32>,
}

impl GridSampler {
    /// `size` is the side length in world units, `resolution` the number of
    /// samples per side (both edges included).
    pub fn new(field: GravityField, size: f32, resolution: u32) -> Result<Self, FieldError> {
        if !(size.is_finite() && size > 0.0) || !(2..=MAX_RESOLUTION).contains(&resolution) {
            return Err(FieldError::InvalidSampling { size, resolution });
        }
        Ok(Self {
            field,
            size,
            resolution,
        })
    }

    pub fn field(&self) -> &GravityField {
        &self.field
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// World xz of sample `(col, row)`.
    pub fn sample_position(&self, col: u32, row: u32) -> Vec2 {
        let step = self.size / (self.resolution - 1) as f32;
        let half = self.size * 0.5;
        Vec2::new(col as f32 * step - half, row as f32 * step - half)
    }

    /// Offset every vertex's y by the field at its xz, in parallel.
    pub fn displace_in_place(&self, vertices: &mut [Vec3], masses: &[PointMass]) {
        let field = self.field;
        vertices.par_iter_mut().for_each(|v| {
            v.y += field.displacement(Vec2::new(v.x, v.z), masses);
        });
    }

    /// Sample the field at every grid point. Rows are filled in parallel.
    pub fn heightmap(&self, masses: &[PointMass]) -> Heightmap {
        let res = self.resolution as usize;
        let mut values = vec![0.0f32; res * res];
        values
            .par_chunks_mut(res)
            .enumerate()
            .for_each(|(row, line)| {
                for (col, value) in line.iter_mut().enumerate() {
                    let q = self.sample_position(col as u32, row as u32);
                    *value = self.field.displacement(q, masses);
                }
            });

        Heightmap {
            resolution: self.resolution,
            size: self.size,
            values,
        }
    }
}

impl Heightmap {
    pub fn get(&self, col: u32, row: u32) -> Option<f32> {
        if col >= self.resolution || row >= self.resolution {
            return None;
        }
        self.values
            .get(row as usize * self.resolution as usize + col as usize)
            .copied()
    }

    /// Smallest and largest sample. `(0, 0)` when empty.
    pub fn range(&self) -> (f32, f32) {
        if self.values.is_empty() {
            return (0.0, 0.0);
        }
        self.values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Samples rescaled to the full `u16` range, deepest point at 0.
    ///
    /// A flat map maps entirely to `u16::MAX`.
    pub fn to_u16(&self) -> Vec<u16> {
        let (lo, hi) = self.range();
        let span = hi - lo;
        self.values
            .iter()
            .map(|&v| {
                if span <= f32::EPSILON {
                    u16::MAX
                } else {
                    (((v - lo) / span) * u16::MAX as f32).round() as u16
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler(resolution: u32) -> GridSampler {
        GridSampler::new(GravityField::new(9.8, 10.0).unwrap(), 1000.0, resolution).unwrap()
    }

    fn sun() -> PointMass {
        PointMass::new(Vec3::ZERO, 1.9885e5).unwrap()
    }

    #[test]
    fn test_rejects_degenerate_grid() {
        let field = GravityField::new(9.8, 10.0).unwrap();
        assert!(GridSampler::new(field, 100.0, 1).is_err());
        assert!(GridSampler::new(field, 0.0, 16).is_err());
        assert!(GridSampler::new(field, f32::NAN, 16).is_err());
    }

    #[test]
    fn test_resolution_is_capped() {
        let field = GravityField::new(9.8, 10.0).unwrap();
        assert!(GridSampler::new(field, 2000.0, MAX_RESOLUTION).is_ok());
        assert_eq!(
            GridSampler::new(field, 2000.0, MAX_RESOLUTION + 1).unwrap_err(),
            FieldError::InvalidSampling {
                size: 2000.0,
                resolution: MAX_RESOLUTION + 1
            }
        );
        assert!(GridSampler::new(field, 2000.0, 3_000_000_000).is_err());
    }

    #[test]
    fn test_sample_positions_span_the_patch() {
        let s = sampler(11);
        assert_eq!(s.sample_position(0, 0), Vec2::new(-500.0, -500.0));
        assert_eq!(s.sample_position(10, 10), Vec2::new(500.0, 500.0));
        assert_eq!(s.sample_position(5, 5), Vec2::ZERO);
    }

    #[test]
    fn test_displace_matches_scalar_field() {
        let s = sampler(8);
        let masses = [sun()];
        let mut vertices: Vec<Vec3> = (0..64)
            .map(|i| Vec3::new((i % 8) as f32 * 37.0 - 120.0, 1.0, (i / 8) as f32 * 29.0))
            .collect();
        let original = vertices.clone();

        s.displace_in_place(&mut vertices, &masses);

        for (v, o) in vertices.iter().zip(&original) {
            assert_eq!(v.x, o.x);
            assert_eq!(v.z, o.z);
            let expected = o.y + s.field().displacement(Vec2::new(o.x, o.z), &masses);
            assert_eq!(v.y, expected);
        }
    }

    #[test]
    fn test_heightmap_deepest_at_centre() {
        let s = sampler(21);
        let map = s.heightmap(&[sun()]);
        assert_eq!(map.values.len(), 21 * 21);

        let centre = map.get(10, 10).unwrap();
        let (lo, hi) = map.range();
        assert_eq!(centre, lo);
        assert!(hi < 0.0);
        assert_eq!(map.get(0, 0), map.get(20, 20));
        assert_eq!(map.get(21, 0), None);
    }

    #[test]
    fn test_heightmap_to_u16_spans_full_range() {
        let map = sampler(9).heightmap(&[sun()]);
        let pixels = map.to_u16();
        assert_eq!(pixels[4 * 9 + 4], 0);
        assert_eq!(*pixels.iter().max().unwrap(), u16::MAX);
    }

    #[test]
    fn test_flat_heightmap() {
        let map = sampler(4).heightmap(&[]);
        assert_eq!(map.range(), (0.0, 0.0));
        assert!(map.to_u16().iter().all(|&p| p == u16::MAX));
    }
}
