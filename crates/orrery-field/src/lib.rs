//! Gravity-well field model for the deformed grid.
//!
//! The field is a superposition of softened inverse-square dips, one per
//! point mass. It is a visual model, not Newtonian gravity: the softening
//! term keeps the dip finite directly under a mass. The same formulas run in
//! the grid vertex shader; this crate is the host-side reference used for
//! tests, data export and anything that needs the surface height on the CPU.

mod error;
mod fade;
mod field;
mod mass;
mod sampler;

pub use error::FieldError;
pub use fade::{FadeParameters, grid_line_coverage, smoothstep};
pub use field::{DISTANCE_EPSILON, GravityField};
pub use mass::{BodyId, MassSet, PointMass};
pub use sampler::{GridSampler, Heightmap, MAX_RESOLUTION};
