use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use crate::{
    error::{ensure_min_points, Result, SplineError},
    interval::{check_range, find_interval_index, find_interval_index_with_hint},
    linalg::{LinearSolver, LuSolver},
    polynomial::{derivative_row, Cubic},
};

const COEFFICIENTS_PER_INTERVAL: usize = 4;

/// Two extra equations closing the piecewise cubic system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCondition {
    /// Second derivative is zero at both ends.
    Natural,
    /// First and second derivatives at the first knot equal those at the last knot.
    Periodic,
    /// Parabolic run-out: the second derivative at each end equals the one at the adjacent knot.
    Parabolic,
    /// Third derivative is continuous across the second and the second-to-last knot.
    NotAKnot,
    /// First and last intervals are quadratics (leading coefficient is zero).
    Quadratic,
    /// Fixed end slopes. Not supported, always fails with [SplineError::NotImplemented].
    Clamped,
}

/// Solves for the coefficients of a C2 piecewise cubic through `(x_values, y_values)`.
///
/// Pairs are sorted by `x` first. Returns `4 * (n - 1)` values: `[a, b, c, d]` of
/// `a*x^3 + b*x^2 + c*x + d` for every interval in ascending order.
/// # Example
/// ```
/// use scatter_spline::{compute_coefficients, evaluate, BoundaryCondition};
/// use assert_approx_eq::assert_approx_eq;
///
/// let x = vec![0.0, 1.0, 2.0];
/// let y = vec![0.0, 1.0, 0.0];
/// let coefficients = compute_coefficients(BoundaryCondition::Natural, &x, &y).unwrap();
///
/// assert_eq!(8, coefficients.len());
/// assert_approx_eq!(1.0, evaluate(&coefficients, &x, 1.0).unwrap(), 1e-9);
/// assert_approx_eq!(0.6875, evaluate(&coefficients, &x, 0.5).unwrap(), 1e-9);
/// ```
/// # Errors
/// - [SplineError::NotImplemented] for [BoundaryCondition::Clamped],
/// - [SplineError::InsufficientData] for fewer than 3 points,
/// - [SplineError::SingularMatrix] when the system has no unique solution (e.g. repeated `x`).
pub fn compute_coefficients(
    boundary_condition: BoundaryCondition,
    x_values: &[f64],
    y_values: &[f64],
) -> Result<Vec<f64>> {
    compute_coefficients_with_solver(boundary_condition, x_values, y_values, &LuSolver)
}

/// [compute_coefficients] using the given [LinearSolver].
pub fn compute_coefficients_with_solver<S: LinearSolver>(
    boundary_condition: BoundaryCondition,
    x_values: &[f64],
    y_values: &[f64],
    solver: &S,
) -> Result<Vec<f64>> {
    if boundary_condition == BoundaryCondition::Clamped {
        return Err(SplineError::NotImplemented("clamped boundary condition"));
    }
    let (x, y) = sorted_pairs(x_values, y_values)?;

    if boundary_condition == BoundaryCondition::Periodic && y[0] != y[y.len() - 1] {
        warn!(
            "periodic boundary condition with different end values {} and {}",
            y[0],
            y[y.len() - 1]
        );
    }

    let mut system = EquationSystem::new(x.len() - 1);
    for i in 0..system.number_of_intervals {
        system.function_value_equations(i, &x, &y);
        if i + 1 < system.number_of_intervals {
            system.continuity_equations(i, x[i + 1]);
        }
    }
    system.boundary_equations(boundary_condition, &x);

    debug!(
        "solving {0}x{0} piecewise cubic system ({1:?})",
        system.rhs.len(),
        boundary_condition
    );

    let solution = solver
        .solve(&system.matrix, &system.rhs)
        .ok_or(SplineError::SingularMatrix)?;
    Ok(solution.iter().copied().collect())
}

/// Evaluates coefficients produced by [compute_coefficients] at `x`.
/// # Errors
/// - [SplineError::OutOfRange] if `x` is outside `[min(x_values), max(x_values)]`,
/// - [SplineError::LengthMismatch] if `coefficients` does not hold 4 values per interval.
pub fn evaluate(coefficients: &[f64], x_values: &[f64], x: f64) -> Result<f64> {
    ensure_min_points(x_values.len())?;
    let expected = COEFFICIENTS_PER_INTERVAL * (x_values.len() - 1);
    if coefficients.len() != expected {
        return Err(SplineError::LengthMismatch { expected, found: coefficients.len() });
    }

    let mut knots = x_values.to_vec();
    knots.sort_by(f64::total_cmp);
    check_range(&knots, x)?;

    let start = COEFFICIENTS_PER_INTERVAL * find_interval_index(&knots, x);
    Ok(Cubic::from_slice(&coefficients[start..start + COEFFICIENTS_PER_INTERVAL]).evaluate(x))
}

/// Interpolating piecewise cubic holding one [Cubic] per interval.
/// # Example
/// ```
/// use scatter_spline::{BoundaryCondition, PiecewiseCubic};
/// use assert_approx_eq::assert_approx_eq;
///
/// // points on x^3 - 2x + 1, reproduced exactly by the not-a-knot spline
/// let x = vec![0.0, 1.0, 2.0, 3.0, 4.0];
/// let y: Vec<f64> = x.iter().map(|x| x * x * x - 2.0 * x + 1.0).collect();
/// let spline = PiecewiseCubic::new(BoundaryCondition::NotAKnot, &x, &y).unwrap();
///
/// assert_approx_eq!(11.625, spline.interpolate(2.5).unwrap(), 1e-9);
/// assert!(spline.interpolate(4.5).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PiecewiseCubic {
    knots: Vec<f64>,
    cubics: Vec<Cubic>,
    boundary_condition: BoundaryCondition,
}

impl PiecewiseCubic {
    pub fn new(boundary_condition: BoundaryCondition, x_values: &[f64], y_values: &[f64]) -> Result<Self> {
        Self::with_solver(boundary_condition, x_values, y_values, &LuSolver)
    }

    pub fn with_solver<S: LinearSolver>(
        boundary_condition: BoundaryCondition,
        x_values: &[f64],
        y_values: &[f64],
        solver: &S,
    ) -> Result<Self> {
        let coefficients = compute_coefficients_with_solver(boundary_condition, x_values, y_values, solver)?;

        let mut knots = x_values.to_vec();
        knots.sort_by(f64::total_cmp);
        let cubics = coefficients
            .chunks_exact(COEFFICIENTS_PER_INTERVAL)
            .map(Cubic::from_slice)
            .collect();

        Ok(PiecewiseCubic { knots, cubics, boundary_condition })
    }

    pub fn interpolate(&self, x: f64) -> Result<f64> {
        self.derivative(x, 0)
    }

    /// Derivative of the given order at `x`; order 0 is the value itself.
    pub fn derivative(&self, x: f64, order: usize) -> Result<f64> {
        check_range(&self.knots, x)?;
        let index = find_interval_index(&self.knots, x);
        Ok(self.cubics[index].derivative(x, order))
    }

    /// Interpolates every value of `x_vector`. Fails without partial results if any of them is
    /// out of range. Ascending input is the fast path.
    pub fn batch_interpolate(&self, x_vector: &[f64]) -> Result<Vec<f64>> {
        for x in x_vector {
            check_range(&self.knots, *x)?;
        }

        let mut results = Vec::with_capacity(x_vector.len());
        let mut index = 0;
        for x in x_vector {
            index = find_interval_index_with_hint(&self.knots, index, *x);
            results.push(self.cubics[index].evaluate(*x));
        }
        Ok(results)
    }

    /// Flat `[a, b, c, d, ...]` vector, the same layout [compute_coefficients] returns.
    pub fn coefficients(&self) -> Vec<f64> {
        self.cubics.iter().flat_map(|c| *c.coefficients()).collect()
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn boundary_condition(&self) -> BoundaryCondition {
        self.boundary_condition
    }
}

fn sorted_pairs(x_values: &[f64], y_values: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    if x_values.len() != y_values.len() {
        return Err(SplineError::LengthMismatch { expected: x_values.len(), found: y_values.len() });
    }
    ensure_min_points(x_values.len())?;
    if x_values.iter().chain(y_values).any(|v| !v.is_finite()) {
        return Err(SplineError::NonFinite);
    }

    let mut pairs: Vec<(f64, f64)> = x_values.iter().copied().zip(y_values.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(pairs.into_iter().unzip())
}

struct EquationSystem {
    number_of_intervals: usize,
    matrix: DMatrix<f64>,
    rhs: DVector<f64>,
    equation_counter: usize,
}

impl EquationSystem {
    fn new(number_of_intervals: usize) -> Self {
        let size = COEFFICIENTS_PER_INTERVAL * number_of_intervals;
        EquationSystem {
            number_of_intervals,
            matrix: DMatrix::zeros(size, size),
            rhs: DVector::zeros(size),
            equation_counter: 0,
        }
    }

    /// Adds `sign * row` to the coefficients of `interval` in the current equation.
    fn add_row(&mut self, interval: usize, row: [f64; 4], sign: f64) {
        let index_start = COEFFICIENTS_PER_INTERVAL * interval;
        for (c, value) in row.iter().enumerate() {
            self.matrix[(self.equation_counter, index_start + c)] += sign * value;
        }
    }

    fn next_equation(&mut self, rhs: f64) {
        self.rhs[self.equation_counter] = rhs;
        self.equation_counter += 1;
    }

    /// The cubic of `interval` passes through both of its end points.
    fn function_value_equations(&mut self, interval: usize, x: &[f64], y: &[f64]) {
        for k in interval..=interval + 1 {
            self.add_row(interval, derivative_row(x[k], 0), 1.0);
            self.next_equation(y[k]);
        }
    }

    /// First and second derivative of `interval` and `interval + 1` agree at `knot`.
    fn continuity_equations(&mut self, interval: usize, knot: f64) {
        for order in 1..=2 {
            self.derivative_difference(interval, knot, interval + 1, knot, order);
        }
    }

    /// `f_i^(order)(x_i) - f_j^(order)(x_j) = 0`
    fn derivative_difference(&mut self, i: usize, x_i: f64, j: usize, x_j: f64, order: usize) {
        self.add_row(i, derivative_row(x_i, order), 1.0);
        self.add_row(j, derivative_row(x_j, order), -1.0);
        self.next_equation(0.0);
    }

    fn boundary_equations(&mut self, boundary_condition: BoundaryCondition, x: &[f64]) {
        let first = 0;
        let last = self.number_of_intervals - 1;
        let x_first = x[0];
        let x_last = x[x.len() - 1];

        match boundary_condition {
            BoundaryCondition::Natural => {
                self.add_row(first, derivative_row(x_first, 2), 1.0);
                self.next_equation(0.0);
                self.add_row(last, derivative_row(x_last, 2), 1.0);
                self.next_equation(0.0);
            }
            BoundaryCondition::Periodic => {
                self.derivative_difference(first, x_first, last, x_last, 1);
                self.derivative_difference(first, x_first, last, x_last, 2);
            }
            BoundaryCondition::Parabolic => {
                self.derivative_difference(first, x_first, first + 1, x[1], 2);
                self.derivative_difference(last, x_last, last - 1, x[x.len() - 2], 2);
            }
            BoundaryCondition::NotAKnot => {
                self.derivative_difference(first, x[1], first + 1, x[1], 3);
                if self.number_of_intervals > 2 {
                    let knot = x[x.len() - 2];
                    self.derivative_difference(last - 1, knot, last, knot, 3);
                } else {
                    // both conditions refer to the single interior knot
                    self.add_row(first, LEADING_COEFFICIENT, 1.0);
                    self.next_equation(0.0);
                }
            }
            BoundaryCondition::Quadratic => {
                self.add_row(first, LEADING_COEFFICIENT, 1.0);
                self.next_equation(0.0);
                self.add_row(last, LEADING_COEFFICIENT, 1.0);
                self.next_equation(0.0);
            }
            BoundaryCondition::Clamped => {}
        }
    }
}

const LEADING_COEFFICIENT: [f64; 4] = [1.0, 0.0, 0.0, 0.0];

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::linalg::tests::SingularSolver;

    const SOLVABLE: [BoundaryCondition; 5] = [
        BoundaryCondition::Natural,
        BoundaryCondition::Periodic,
        BoundaryCondition::Parabolic,
        BoundaryCondition::NotAKnot,
        BoundaryCondition::Quadratic,
    ];

    fn uneven_data() -> (Vec<f64>, Vec<f64>) {
        (
            vec![0.0, 0.7, 1.1, 2.0, 3.4, 4.0],
            vec![1.0, 2.5, 2.0, -0.5, 0.3, 1.0],
        )
    }

    #[test]
    fn natural_three_points() {
        let eps = 1e-9;
        let x = vec![0.0, 1.0, 2.0];
        let y = vec![0.0, 1.0, 0.0];

        let coefficients = compute_coefficients(BoundaryCondition::Natural, &x, &y).unwrap();

        assert_eq!(8, coefficients.len());
        let expected = [-0.5, 0.0, 1.5, 0.0, 0.5, -3.0, 4.5, -1.0];
        for (value, expected) in coefficients.iter().zip(expected) {
            assert_approx_eq!(*value, expected, eps);
        }

        let first = Cubic::from_slice(&coefficients[0..4]);
        let second = Cubic::from_slice(&coefficients[4..8]);
        assert_approx_eq!(first.evaluate(0.0), 0.0, eps);
        assert_approx_eq!(first.evaluate(1.0), 1.0, eps);
        assert_approx_eq!(second.evaluate(1.0), 1.0, eps);
        assert_approx_eq!(second.evaluate(2.0), 0.0, eps);
        assert_approx_eq!(first.derivative(0.0, 2), 0.0, eps);
        assert_approx_eq!(second.derivative(2.0, 2), 0.0, eps);
    }

    #[test]
    fn interpolates_knots_for_every_boundary_condition() {
        let eps = 1e-8;
        let (x, y) = uneven_data();

        for boundary_condition in SOLVABLE {
            let coefficients = compute_coefficients(boundary_condition, &x, &y).unwrap();
            assert_eq!(4 * (x.len() - 1), coefficients.len());

            for (xi, yi) in x.iter().zip(&y) {
                assert_approx_eq!(evaluate(&coefficients, &x, *xi).unwrap(), *yi, eps);
            }
        }
    }

    #[test]
    fn c2_continuity_at_interior_knots() {
        let eps = 1e-7;
        let (x, y) = uneven_data();

        for boundary_condition in SOLVABLE {
            let spline = PiecewiseCubic::new(boundary_condition, &x, &y).unwrap();
            for i in 1..x.len() - 1 {
                for order in 0..=2 {
                    let left = spline.cubics[i - 1].derivative(x[i], order);
                    let right = spline.cubics[i].derivative(x[i], order);
                    assert_approx_eq!(left, right, eps);
                }
            }
        }
    }

    #[test]
    fn natural_ends() {
        let eps = 1e-8;
        let (x, y) = uneven_data();
        let spline = PiecewiseCubic::new(BoundaryCondition::Natural, &x, &y).unwrap();

        assert_approx_eq!(spline.derivative(0.0, 2).unwrap(), 0.0, eps);
        assert_approx_eq!(spline.derivative(4.0, 2).unwrap(), 0.0, eps);
    }

    #[test]
    fn periodic_ends() {
        let eps = 1e-8;
        let x: Vec<f64> = (0..=8).map(|i| i as f64 * std::f64::consts::PI / 4.0).collect();
        let y: Vec<f64> = x.iter().map(|x| x.sin()).collect();
        let spline = PiecewiseCubic::new(BoundaryCondition::Periodic, &x, &y).unwrap();
        let x_last = x[x.len() - 1];

        assert_approx_eq!(
            spline.derivative(0.0, 1).unwrap(),
            spline.derivative(x_last, 1).unwrap(),
            eps
        );
        assert_approx_eq!(
            spline.derivative(0.0, 2).unwrap(),
            spline.derivative(x_last, 2).unwrap(),
            eps
        );
        assert_approx_eq!(spline.interpolate(std::f64::consts::FRAC_PI_2).unwrap(), 1.0, eps);
        assert_approx_eq!(spline.interpolate(0.3).unwrap(), 0.3_f64.sin(), 1e-2);
    }

    #[test]
    fn parabolic_ends() {
        let eps = 1e-8;
        let (x, y) = uneven_data();
        let spline = PiecewiseCubic::new(BoundaryCondition::Parabolic, &x, &y).unwrap();
        let n = x.len();

        assert_approx_eq!(
            spline.derivative(x[0], 2).unwrap(),
            spline.derivative(x[1], 2).unwrap(),
            eps
        );
        assert_approx_eq!(
            spline.derivative(x[n - 1], 2).unwrap(),
            spline.derivative(x[n - 2], 2).unwrap(),
            eps
        );
    }

    #[test]
    fn parabolic_and_quadratic_reproduce_parabola() {
        let eps = 1e-8;
        let x = vec![-1.0, 0.0, 0.5, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|x| 2.0 * x * x - x + 0.5).collect();

        for boundary_condition in [BoundaryCondition::Parabolic, BoundaryCondition::Quadratic] {
            let spline = PiecewiseCubic::new(boundary_condition, &x, &y).unwrap();

            assert_approx_eq!(spline.interpolate(1.5).unwrap(), 3.5, eps);
            assert_approx_eq!(spline.interpolate(-0.5).unwrap(), 1.5, eps);
            for cubic in &spline.cubics {
                assert_approx_eq!(cubic.coefficients()[0], 0.0, eps);
            }
        }
    }

    #[test]
    fn not_a_knot_third_derivative() {
        let eps = 1e-7;
        let (x, y) = uneven_data();
        let spline = PiecewiseCubic::new(BoundaryCondition::NotAKnot, &x, &y).unwrap();
        let n = x.len();

        assert_approx_eq!(
            spline.cubics[0].derivative(x[1], 3),
            spline.cubics[1].derivative(x[1], 3),
            eps
        );
        assert_approx_eq!(
            spline.cubics[n - 3].derivative(x[n - 2], 3),
            spline.cubics[n - 2].derivative(x[n - 2], 3),
            eps
        );
    }

    #[test]
    fn not_a_knot_three_points_is_parabola() {
        let eps = 1e-9;
        let x = vec![0.0, 1.0, 2.0];
        let y = vec![1.0, 0.0, 1.0];
        let spline = PiecewiseCubic::new(BoundaryCondition::NotAKnot, &x, &y).unwrap();

        assert_approx_eq!(spline.interpolate(0.5).unwrap(), 0.25, eps);
        assert_approx_eq!(spline.interpolate(1.5).unwrap(), 0.25, eps);
    }

    #[test]
    fn quadratic_leading_coefficients() {
        let eps = 1e-9;
        let (x, y) = uneven_data();
        let coefficients = compute_coefficients(BoundaryCondition::Quadratic, &x, &y).unwrap();
        let last = coefficients.len() - 4;

        assert_approx_eq!(coefficients[0], 0.0, eps);
        assert_approx_eq!(coefficients[last], 0.0, eps);
    }

    #[test]
    fn unsorted_input() {
        let eps = 1e-9;
        let sorted = compute_coefficients(BoundaryCondition::Natural, &[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).unwrap();
        let shuffled = compute_coefficients(BoundaryCondition::Natural, &[2.0, 0.0, 1.0], &[0.0, 0.0, 1.0]).unwrap();

        for (a, b) in sorted.iter().zip(&shuffled) {
            assert_approx_eq!(*a, *b, eps);
        }
        assert_approx_eq!(evaluate(&shuffled, &[2.0, 0.0, 1.0], 1.0).unwrap(), 1.0, eps);
    }

    #[test]
    fn clamped_is_not_implemented() {
        let result = compute_coefficients(BoundaryCondition::Clamped, &[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]);

        assert!(matches!(result, Err(SplineError::NotImplemented(_))));
    }

    #[test]
    fn insufficient_data() {
        let result = compute_coefficients(BoundaryCondition::Natural, &[0.0, 1.0], &[0.0, 1.0]);

        assert_eq!(Err(SplineError::InsufficientData { required: 3, found: 2 }), result);
    }

    #[test]
    fn length_mismatch() {
        let result = compute_coefficients(BoundaryCondition::Natural, &[0.0, 1.0, 2.0], &[0.0, 1.0]);

        assert_eq!(Err(SplineError::LengthMismatch { expected: 3, found: 2 }), result);
        assert_eq!(
            Err(SplineError::LengthMismatch { expected: 8, found: 7 }),
            evaluate(&[0.0; 7], &[0.0, 1.0, 2.0], 1.0)
        );
    }

    #[test]
    fn singular_solver() {
        let result = compute_coefficients_with_solver(
            BoundaryCondition::Natural,
            &[0.0, 1.0, 2.0],
            &[0.0, 1.0, 0.0],
            &SingularSolver,
        );

        assert_eq!(Err(SplineError::SingularMatrix), result);
    }

    #[test]
    fn out_of_range() {
        let x = vec![0.0, 1.0, 2.0];
        let coefficients = compute_coefficients(BoundaryCondition::Natural, &x, &[0.0, 1.0, 0.0]).unwrap();

        assert_eq!(
            Err(SplineError::OutOfRange { x: 2.5, min: 0.0, max: 2.0 }),
            evaluate(&coefficients, &x, 2.5)
        );
        assert!(evaluate(&coefficients, &x, -0.01).is_err());
        assert!(evaluate(&coefficients, &x, 2.0).is_ok());
    }

    #[test]
    fn batch() {
        let eps = 1e-9;
        let (x, y) = uneven_data();
        let spline = PiecewiseCubic::new(BoundaryCondition::NotAKnot, &x, &y).unwrap();

        let x_vector = vec![0.0, 0.3, 0.7, 1.0, 2.2, 3.9, 4.0, 0.1];
        let result = spline.batch_interpolate(&x_vector).unwrap();

        assert_eq!(x_vector.len(), result.len());
        for (x, value) in x_vector.iter().zip(&result) {
            assert_approx_eq!(spline.interpolate(*x).unwrap(), *value, eps);
        }

        assert!(spline.batch_interpolate(&[0.0, 1.0, 4.1]).is_err());
    }

    #[test]
    fn accessors() {
        let (x, y) = uneven_data();
        let spline = PiecewiseCubic::new(BoundaryCondition::Natural, &x, &y).unwrap();

        assert_eq!(&x[..], spline.knots());
        assert_eq!(BoundaryCondition::Natural, spline.boundary_condition());
        assert_eq!(
            compute_coefficients(BoundaryCondition::Natural, &x, &y).unwrap(),
            spline.coefficients()
        );
    }
}
