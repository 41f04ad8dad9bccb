use std::sync::Arc;

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::{
    error::{Result, SplineError},
    linalg::{LinearSolver, LuSolver},
    sample::{preprocess, preprocess_points, unzip, DuplicatePolicy, Sample},
};

/// Basis of natural cubic splines with knots at the basis points.
///
/// Function 0 is the constant, function 1 the identity and every interior point `xi` adds
/// `d(x, xi) - d(x, xm)` where `d(x, k) = (g(x, k) - g(x, xn)) / (xn - k)`, `g(x, k) = max(0, x - k)^3`
/// and `xm`, `xn` are the last two basis points. Every combination is linear beyond `xn`.
#[derive(Debug, Clone)]
pub struct NaturalCubicBasis {
    points: Vec<f64>,
}

impl NaturalCubicBasis {
    /// Sorts and deduplicates `points`, at least 3 distinct values are required.
    pub fn new(points: &[f64]) -> Result<Self> {
        Ok(NaturalCubicBasis { points: preprocess_points(points)? })
    }

    /// Number of basis functions, equal to the number of basis points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`, [NaturalCubicBasis::new] requires at least 3 points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    fn reference_knots(&self) -> (f64, f64) {
        let n = self.points.len();
        (self.points[n - 2], self.points[n - 1])
    }

    /// Value of basis function `k` at `x`.
    pub(crate) fn value(&self, k: usize, x: f64) -> f64 {
        match k {
            0 => 1.0,
            1 => x,
            _ => self.truncated_difference(k, x, truncated_cube),
        }
    }

    /// Second derivative of basis function `k` at `x`.
    pub(crate) fn second_derivative(&self, k: usize, x: f64) -> f64 {
        match k {
            0 | 1 => 0.0,
            _ => self.truncated_difference(k, x, truncated_cube_second_derivative),
        }
    }

    fn truncated_difference(&self, k: usize, x: f64, g: fn(f64, f64) -> f64) -> f64 {
        let (xm, xn) = self.reference_knots();
        let xi = self.points[k - 2];
        (g(x, xi) - g(x, xn)) / (xn - xi) - (g(x, xm) - g(x, xn)) / (xn - xm)
    }

    /// `Bt[k, i]` is basis function `k` evaluated at `x[i]`.
    pub(crate) fn design_matrix(&self, x: &[f64]) -> DMatrix<f64> {
        DMatrix::from_fn(self.len(), x.len(), |k, i| self.value(k, x[i]))
    }

    /// Roughness penalty `Ω[r, c] = ∫ f_r''(x) f_c''(x) dx`, in closed form.
    ///
    /// Rows and columns of the constant and linear functions are zero.
    pub fn penalty_matrix(&self) -> DMatrix<f64> {
        let (xm, xn) = self.reference_knots();
        DMatrix::from_fn(self.len(), self.len(), |r, c| {
            if r < 2 || c < 2 {
                return 0.0;
            }
            let xi = self.points[r.min(c) - 2];
            let xj = self.points[r.max(c) - 2];
            -(6.0 * (xj - xm) * (xj * (xj + xm) - 2.0 * xm * xn + xi * (-3.0 * xj + xm + 2.0 * xn)))
                / ((xi - xn) * (xn - xj))
        })
    }
}

fn truncated_cube(x: f64, knot: f64) -> f64 {
    (x - knot).max(0.0).powi(3)
}

fn truncated_cube_second_derivative(x: f64, knot: f64) -> f64 {
    6.0 * (x - knot).max(0.0)
}

/// Penalized regression spline factory.
///
/// Construction evaluates the basis at the data and checks the Gram matrix once. Every call to
/// [Smoother::fit] then costs a single inversion of a matrix of the basis size, so many smoothing
/// parameters can be tried cheaply.
/// # Example
/// ```
/// use scatter_spline::{Sample, Smoother};
/// use assert_approx_eq::assert_approx_eq;
///
/// let data: Vec<Sample> = (0..20)
///     .map(|i| {
///         let x = i as f64 * 0.25;
///         Sample::new(x, x.sin() + if i % 2 == 0 { 0.05 } else { -0.05 })
///     })
///     .collect();
/// let basis_points = vec![0.0, 1.0, 2.0, 3.0, 4.0, 4.75];
/// let smoother = Smoother::new(data, &basis_points).unwrap();
///
/// let rough = smoother.fit(1e-5).unwrap();
/// let smooth = smoother.fit(1.0).unwrap();
///
/// assert!(smooth.roughness() < rough.roughness());
/// assert_approx_eq!(1.0_f64.sin(), rough.evaluate(1.0), 0.1);
/// ```
#[derive(Debug, Clone)]
pub struct Smoother<S: LinearSolver = LuSolver> {
    basis: Arc<NaturalCubicBasis>,
    design: DMatrix<f64>,
    gram: DMatrix<f64>,
    penalty: DMatrix<f64>,
    response: DVector<f64>,
    solver: S,
}

/// Shorthand for [Smoother::new].
pub fn build_smoother(data: Vec<Sample>, basis_points: &[f64]) -> Result<Smoother> {
    Smoother::new(data, basis_points)
}

impl Smoother<LuSolver> {
    /// Keeps the first sample of every duplicate `x`.
    ///
    /// With fewer samples than basis points the Gram matrix is rank deficient. Such a smoother
    /// may still be built, but only a positive `lambda` gives a meaningful fit.
    /// # Errors
    /// - [SplineError::InsufficientData] for fewer than 3 distinct samples or basis points,
    /// - [SplineError::SingularSystem] if the Gram matrix of the basis is singular for the data.
    pub fn new(data: Vec<Sample>, basis_points: &[f64]) -> Result<Self> {
        Self::with_solver(data, basis_points, DuplicatePolicy::default(), LuSolver)
    }
}

impl<S: LinearSolver> Smoother<S> {
    pub fn with_solver(
        data: Vec<Sample>,
        basis_points: &[f64],
        duplicate_policy: DuplicatePolicy,
        solver: S,
    ) -> Result<Self> {
        let samples = preprocess(data, duplicate_policy)?;
        let basis = NaturalCubicBasis::new(basis_points)?;
        let (x, y) = unzip(&samples);

        let design = basis.design_matrix(&x);
        let gram = &design * design.transpose();

        let determinant = solver.determinant(&gram);
        if determinant == 0.0 || !determinant.is_finite() {
            return Err(SplineError::SingularSystem);
        }

        let penalty = basis.penalty_matrix();
        debug!(
            "smoother with {} basis functions over {} samples",
            basis.len(),
            samples.len()
        );

        Ok(Smoother {
            basis: Arc::new(basis),
            design,
            gram,
            penalty,
            response: DVector::from_vec(y),
            solver,
        })
    }

    /// Fits the weights `(BtB + n' λ Ω)^-1 Bt y` for smoothing parameter `lambda`.
    /// # Errors
    /// - [SplineError::InvalidParameter] if `lambda` is negative or not finite,
    /// - [SplineError::SingularSystem] if the penalized system cannot be inverted.
    pub fn fit(&self, lambda: f64) -> Result<SmoothingSpline> {
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(SplineError::InvalidParameter(format!(
                "smoothing parameter must be non-negative, got {}",
                lambda
            )));
        }

        let scale = self.basis.len() as f64 * lambda;
        let system = &self.gram + &self.penalty * scale;
        let inverse = self.solver.inverse(&system).ok_or(SplineError::SingularSystem)?;
        let weights = inverse * (&self.design * &self.response);
        let roughness = weights.dot(&(&self.penalty * &weights));

        Ok(SmoothingSpline {
            basis: Arc::clone(&self.basis),
            weights,
            lambda,
            roughness,
        })
    }

    pub fn basis(&self) -> &NaturalCubicBasis {
        &self.basis
    }

    /// Number of samples left after preprocessing.
    pub fn number_of_samples(&self) -> usize {
        self.response.len()
    }
}

/// Fitted smoothing spline `x -> Σ θk fk(x)`, defined for every `x` (linear beyond the
/// outer basis points).
#[derive(Debug, Clone)]
pub struct SmoothingSpline {
    basis: Arc<NaturalCubicBasis>,
    weights: DVector<f64>,
    lambda: f64,
    roughness: f64,
}

impl SmoothingSpline {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.weights
            .iter()
            .enumerate()
            .map(|(k, w)| w * self.basis.value(k, x))
            .sum()
    }

    pub fn batch_evaluate(&self, x_vector: &[f64]) -> Vec<f64> {
        x_vector.iter().map(|x| self.evaluate(*x)).collect()
    }

    pub fn second_derivative(&self, x: f64) -> f64 {
        self.weights
            .iter()
            .enumerate()
            .map(|(k, w)| w * self.basis.second_derivative(k, x))
            .sum()
    }

    /// Integrated squared second derivative, `θ' Ω θ`.
    pub fn roughness(&self) -> f64 {
        self.roughness
    }

    pub fn weights(&self) -> &[f64] {
        self.weights.as_slice()
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}
