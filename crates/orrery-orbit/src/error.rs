/// Orbital configuration errors, raised when an orbit is constructed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrbitError {
    /// The orbit radius is zero or negative, leaving the angular rate undefined.
    #[error("orbit radius must be positive, got {0}")]
    NonPositiveRadius(f64),

    /// The central body mass is negative.
    #[error("central mass must not be negative, got {0}")]
    NegativeMass(f64),

    /// The orbital pseudo-gravity constant is negative.
    #[error("orbital gravity constant must not be negative, got {0}")]
    NegativeGravity(f64),

    /// A constant is NaN or infinite.
    #[error("orbital constant `{name}` is not finite")]
    NonFinite { name: &'static str },
}
