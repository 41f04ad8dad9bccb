//! Curves through scattered samples: penalized smoothing splines for noisy data, piecewise cubic
//! splines with selectable boundary conditions and cubic Hermite splines for exact data.
//!
//! # Example
//! ```
//! use scatter_spline::{compute_coefficients, evaluate, BoundaryCondition, HermiteInterpolant};
//! use assert_approx_eq::assert_approx_eq;
//!
//! let x = vec![0.0, 1.0, 2.0, 3.0];
//! let y = vec![1.0, 3.0, 2.0, 4.0];
//!
//! let coefficients = compute_coefficients(BoundaryCondition::Natural, &x, &y).unwrap();
//! assert_approx_eq!(3.0, evaluate(&coefficients, &x, 1.0).unwrap(), 1e-9);
//!
//! let hermite = HermiteInterpolant::with_auto_slopes(&x, &y).unwrap();
//! assert_eq!(4.0, hermite.interpolate(3.0).unwrap());
//! assert!(hermite.interpolate(3.5).is_err());
//! ```

mod error;
mod hermite;
mod interval;
mod linalg;
mod piecewise;
mod polynomial;
mod sample;
mod smoothing;

pub use error::{Result, SplineError};
pub use hermite::{build_interpolant, get_slopes, HermiteInterpolant};
pub use linalg::{LinearSolver, LuSolver};
pub use piecewise::{compute_coefficients, compute_coefficients_with_solver, evaluate, BoundaryCondition, PiecewiseCubic};
pub use polynomial::Cubic;
pub use sample::{preprocess, preprocess_points, DuplicatePolicy, Sample};
pub use smoothing::{build_smoother, NaturalCubicBasis, Smoother, SmoothingSpline};

pub use nalgebra;
