use nalgebra::{DMatrix, DVector};

/// Dense linear algebra needed by the spline builders.
///
/// Builders take the solver as a parameter, so a different decomposition (or a fake one in tests)
/// can be plugged in without touching the spline code. `None` means the matrix is singular.
pub trait LinearSolver {
    fn determinant(&self, matrix: &DMatrix<f64>) -> f64;

    fn inverse(&self, matrix: &DMatrix<f64>) -> Option<DMatrix<f64>>;

    fn solve(&self, matrix: &DMatrix<f64>, rhs: &DVector<f64>) -> Option<DVector<f64>>;
}

/// [LinearSolver] backed by LU decomposition with partial pivoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct LuSolver;

impl LinearSolver for LuSolver {
    fn determinant(&self, matrix: &DMatrix<f64>) -> f64 {
        matrix.clone().lu().determinant()
    }

    fn inverse(&self, matrix: &DMatrix<f64>) -> Option<DMatrix<f64>> {
        matrix
            .clone()
            .lu()
            .try_inverse()
            .filter(|inverse| inverse.iter().all(|v| v.is_finite()))
    }

    fn solve(&self, matrix: &DMatrix<f64>, rhs: &DVector<f64>) -> Option<DVector<f64>> {
        matrix
            .clone()
            .lu()
            .solve(rhs)
            .filter(|solution| solution.iter().all(|v| v.is_finite()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    /// Reports every matrix as singular.
    #[derive(Debug)]
    pub(crate) struct SingularSolver;

    impl LinearSolver for SingularSolver {
        fn determinant(&self, _matrix: &DMatrix<f64>) -> f64 {
            0.0
        }

        fn inverse(&self, _matrix: &DMatrix<f64>) -> Option<DMatrix<f64>> {
            None
        }

        fn solve(&self, _matrix: &DMatrix<f64>, _rhs: &DVector<f64>) -> Option<DVector<f64>> {
            None
        }
    }

    #[test]
    fn determinant() {
        let matrix = DMatrix::from_row_slice(3, 3, &[2.0, 0.0, 1.0, 1.0, 3.0, 2.0, 1.0, 1.0, 2.0]);

        assert_approx_eq!(6.0, LuSolver.determinant(&matrix), 1e-12);
    }

    #[test]
    fn inverse() {
        let matrix = DMatrix::from_row_slice(2, 2, &[4.0, 7.0, 2.0, 6.0]);
        let inverse = LuSolver.inverse(&matrix).unwrap();
        let identity = &matrix * &inverse;

        assert_approx_eq!(1.0, identity[(0, 0)], 1e-12);
        assert_approx_eq!(0.0, identity[(0, 1)], 1e-12);
        assert_approx_eq!(0.0, identity[(1, 0)], 1e-12);
        assert_approx_eq!(1.0, identity[(1, 1)], 1e-12);
    }

    #[test]
    fn solve() {
        let matrix = DMatrix::from_row_slice(2, 2, &[3.0, 2.0, 1.0, 2.0]);
        let rhs = DVector::from_vec(vec![5.0, 5.0]);
        let solution = LuSolver.solve(&matrix, &rhs).unwrap();

        assert_approx_eq!(0.0, solution[0], 1e-12);
        assert_approx_eq!(2.5, solution[1], 1e-12);
    }

    #[test]
    fn singular() {
        let matrix = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let rhs = DVector::from_vec(vec![1.0, 1.0]);

        assert_eq!(0.0, LuSolver.determinant(&matrix));
        assert!(LuSolver.inverse(&matrix).is_none());
        assert!(LuSolver.solve(&matrix, &rhs).is_none());
    }
}
