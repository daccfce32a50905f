//! Closed-form circular orbital kinematics.
//!
//! Every position and angle here is a pure function of elapsed time: the
//! angular rate is derived once from the orbital constants and then only `t`
//! varies. Nothing is integrated step by step, so positions never drift and
//! seeking to an arbitrary time is a single evaluation.

mod circular;
mod error;
mod spin;

pub use circular::CircularOrbit;
pub use error::OrbitError;
pub use spin::{SpinningBody, TidallyLocked};
