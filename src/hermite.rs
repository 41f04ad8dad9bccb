use log::debug;

use crate::{
    error::{ensure_min_points, ensure_strictly_increasing, Result, SplineError},
    interval::{check_range, find_interval_index, find_interval_index_with_hint},
};

/// Slopes at every knot: one-sided secant at both ends, mean of the two adjacent secants inside.
/// # Example
/// ```
/// use scatter_spline::get_slopes;
///
/// let slopes = get_slopes(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
/// assert_eq!(vec![1.0, 2.0, 3.0], slopes);
/// ```
/// # Errors
/// Same input checks as [HermiteInterpolant::new].
pub fn get_slopes(x_data: &[f64], y_data: &[f64]) -> Result<Vec<f64>> {
    validate(x_data, y_data)?;

    let secants: Vec<f64> = x_data
        .windows(2)
        .zip(y_data.windows(2))
        .map(|(x, y)| (y[1] - y[0]) / (x[1] - x[0]))
        .collect();

    let n = x_data.len();
    let mut slopes = Vec::with_capacity(n);
    slopes.push(secants[0]);
    slopes.extend(secants.windows(2).map(|s| 0.5 * (s[0] + s[1])));
    slopes.push(secants[n - 2]);
    Ok(slopes)
}

/// Shorthand for [HermiteInterpolant::new].
pub fn build_interpolant(x_data: &[f64], y_data: &[f64], slopes: &[f64]) -> Result<HermiteInterpolant> {
    HermiteInterpolant::new(x_data, y_data, slopes)
}

/// Cubic Hermite spline matching values and slopes at every knot.
/// # Example
/// ```
/// use scatter_spline::HermiteInterpolant;
/// use assert_approx_eq::assert_approx_eq;
///
/// let x = vec![0.0, 1.0, 2.0];
/// let y = vec![0.0, 1.0, 4.0];
/// let interpolant = HermiteInterpolant::new(&x, &y, &[0.0, 2.0, 4.0]).unwrap();
///
/// // x^2 has exactly these slopes, so it is reproduced between the knots
/// assert_approx_eq!(2.25, interpolant.interpolate(1.5).unwrap(), 1e-12);
/// assert_eq!(4.0, interpolant.interpolate(2.0).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct HermiteInterpolant {
    x: Vec<f64>,
    y: Vec<f64>,
    slopes: Vec<f64>,
}

impl HermiteInterpolant {
    /// # Errors
    /// - [SplineError::InsufficientData] for fewer than 3 knots,
    /// - [SplineError::LengthMismatch] if `y_data` or `slopes` differ in length from `x_data`,
    /// - [SplineError::NonIncreasingX] if `x_data` is not sorted with unique values,
    /// - [SplineError::NonFinite] for NaN or infinite input.
    pub fn new(x_data: &[f64], y_data: &[f64], slopes: &[f64]) -> Result<Self> {
        validate(x_data, y_data)?;
        ensure_same_length(x_data, slopes)?;
        if slopes.iter().any(|s| !s.is_finite()) {
            return Err(SplineError::NonFinite);
        }
        debug!("hermite interpolant over {} knots", x_data.len());

        Ok(HermiteInterpolant {
            x: x_data.to_vec(),
            y: y_data.to_vec(),
            slopes: slopes.to_vec(),
        })
    }

    /// Builds the interpolant with slopes from [get_slopes].
    pub fn with_auto_slopes(x_data: &[f64], y_data: &[f64]) -> Result<Self> {
        let slopes = get_slopes(x_data, y_data)?;
        Self::new(x_data, y_data, &slopes)
    }

    pub fn interpolate(&self, x: f64) -> Result<f64> {
        check_range(&self.x, x)?;
        Ok(self.evaluate_in_interval(find_interval_index(&self.x, x), x))
    }

    /// Interpolates every value of `x_vector`, failing if any of them is out of range.
    pub fn batch_interpolate(&self, x_vector: &[f64]) -> Result<Vec<f64>> {
        for x in x_vector {
            check_range(&self.x, *x)?;
        }

        let mut index = 0;
        Ok(x_vector
            .iter()
            .map(|x| {
                index = find_interval_index_with_hint(&self.x, index, *x);
                self.evaluate_in_interval(index, *x)
            })
            .collect())
    }

    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }

    fn evaluate_in_interval(&self, i: usize, x: f64) -> f64 {
        let last = self.x.len() - 1;
        if x == self.x[last] {
            return self.y[last];
        }

        let h = self.x[i + 1] - self.x[i];
        let t = (x - self.x[i]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        let phi0 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let phi1 = -2.0 * t3 + 3.0 * t2;
        let psi0 = h * (t3 - 2.0 * t2 + t);
        let psi1 = h * (t3 - t2);

        self.y[i] * phi0 + self.y[i + 1] * phi1 + self.slopes[i] * psi0 + self.slopes[i + 1] * psi1
    }
}

fn validate(x_data: &[f64], y_data: &[f64]) -> Result<()> {
    ensure_same_length(x_data, y_data)?;
    ensure_min_points(x_data.len())?;
    ensure_strictly_increasing(x_data)?;
    if y_data.iter().any(|y| !y.is_finite()) {
        return Err(SplineError::NonFinite);
    }
    Ok(())
}

fn ensure_same_length(x_data: &[f64], other: &[f64]) -> Result<()> {
    if x_data.len() != other.len() {
        return Err(SplineError::LengthMismatch { expected: x_data.len(), found: other.len() });
    }
    Ok(())
}
