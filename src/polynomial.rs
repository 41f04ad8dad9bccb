/// Cubic `a*x^3 + b*x^2 + c*x + d` in global (not interval-local) `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cubic {
    coefficients: [f64; 4],
}

impl Cubic {
    /// Coefficients ordered `[a, b, c, d]`, highest power first.
    pub fn new(coefficients: [f64; 4]) -> Self {
        Cubic { coefficients }
    }

    pub(crate) fn from_slice(coefficients: &[f64]) -> Self {
        let mut array = [0.0; 4];
        array.copy_from_slice(&coefficients[..4]);
        Cubic::new(array)
    }

    pub fn coefficients(&self) -> &[f64; 4] {
        &self.coefficients
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let [a, b, c, d] = self.coefficients;
        ((a * x + b) * x + c) * x + d
    }

    /// Value of the derivative of the given order at `x`. Orders above 3 are zero.
    pub fn derivative(&self, x: f64, order: usize) -> f64 {
        let [a, b, c, _] = self.coefficients;
        match order {
            0 => self.evaluate(x),
            1 => (3.0 * a * x + 2.0 * b) * x + c,
            2 => 6.0 * a * x + 2.0 * b,
            3 => 6.0 * a,
            _ => 0.0,
        }
    }
}

/// Row of the linear system producing the `order` derivative of a cubic at `x`
/// when multiplied by `[a, b, c, d]`.
pub(crate) fn derivative_row(x: f64, order: usize) -> [f64; 4] {
    match order {
        0 => [x * x * x, x * x, x, 1.0],
        1 => [3.0 * x * x, 2.0 * x, 1.0, 0.0],
        2 => [6.0 * x, 2.0, 0.0, 0.0],
        3 => [6.0, 0.0, 0.0, 0.0],
        _ => [0.0; 4],
    }
}
