use thiserror::Error;

/// Errors returned while building or evaluating a spline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplineError {
    /// Fewer distinct samples (or basis points) than the construction needs.
    #[error("at least {required} distinct points are required, got {found}")]
    InsufficientData { required: usize, found: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Gram matrix of the smoothing basis (or its penalized form) is not invertible.
    #[error("smoothing system is singular, basis points are degenerate for the given data")]
    SingularSystem,

    /// Interpolation equations have no unique solution.
    #[error("interpolation system is singular")]
    SingularMatrix,

    #[error("x = {x} is out of range [{min}, {max}]")]
    OutOfRange { x: f64, min: f64, max: f64 },

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("expected {expected} values, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// x values must be strictly increasing; `index` is the first offending position.
    #[error("x values are not strictly increasing at index {index}")]
    NonIncreasingX { index: usize },

    #[error("input contains NaN or infinite values")]
    NonFinite,

    #[error("duplicate x value {0}")]
    DuplicateX(f64),
}

pub type Result<T> = std::result::Result<T, SplineError>;

pub(crate) const MIN_POINTS: usize = 3;

pub(crate) fn ensure_min_points(found: usize) -> Result<()> {
    if found < MIN_POINTS {
        return Err(SplineError::InsufficientData { required: MIN_POINTS, found });
    }
    Ok(())
}

/// Checks that `x` is finite and strictly increasing.
pub(crate) fn ensure_strictly_increasing(x: &[f64]) -> Result<()> {
    if x.iter().any(|v| !v.is_finite()) {
        return Err(SplineError::NonFinite);
    }
    match x.windows(2).position(|w| w[1] <= w[0]) {
        Some(i) => Err(SplineError::NonIncreasingX { index: i + 1 }),
        None => Ok(()),
    }
}
