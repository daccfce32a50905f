use crate::MAX_RESOLUTION;

/// Invalid field, mass or fade configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// The softening term must be strictly positive or the field diverges.
    #[error("falloff must be positive, got {0}")]
    NonPositiveFalloff(f32),

    /// The field strength constant is negative.
    #[error("gravity constant must not be negative, got {0}")]
    NegativeGravity(f32),

    /// A point mass is negative.
    #[error("mass must not be negative, got {0}")]
    NegativeMass(f32),

    /// The fade range is empty or inverted.
    #[error("fade range requires 0 <= start < end, got start={start} end={end}")]
    InvalidFade { start: f32, end: f32 },

    /// A sampling grid has no area, fewer than two samples per side, or more
    /// than [`MAX_RESOLUTION`].
    #[error(
        "sampling grid needs size > 0 and resolution in 2..={MAX_RESOLUTION}, got size={size} resolution={resolution}"
    )]
    InvalidSampling { size: f32, resolution: u32 },

    /// A constant is NaN or infinite.
    #[error("field constant `{name}` is not finite")]
    NonFinite { name: &'static str },
}
