use log::{debug, warn};

use crate::error::{ensure_min_points, Result, SplineError};

/// Single observation `(x, y)`. Samples are ordered by `x` only.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    x: f64,
    y: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64) -> Self {
        Sample { x, y }
    }

    pub fn get_x(&self) -> f64 {
        self.x
    }

    pub fn get_y(&self) -> f64 {
        self.y
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Sample {
    fn from(value: (f64, f64)) -> Self {
        Sample::new(value.0, value.1)
    }
}

impl Ord for Sample {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.x.total_cmp(&other.x)
    }
}

impl PartialOrd for Sample {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Sample {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x
    }
}

impl Eq for Sample {}

/// What to do when several samples share the same `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep the sample that came first in the input.
    #[default]
    KeepFirst,
    /// Keep the sample that came last in the input.
    KeepLast,
    /// Replace the group by a single sample with the mean `y`.
    Mean,
    /// Fail with [SplineError::DuplicateX].
    Reject,
}

/// Sorts samples ascending by `x` and collapses duplicate `x` values according to `policy`.
///
/// The sort is stable, so "first" and "last" refer to the order of `samples`.
/// # Example
/// ```
/// use scatter_spline::{preprocess, DuplicatePolicy, Sample};
///
/// let samples: Vec<Sample> = vec![(2.0, 4.0).into(), (0.0, 0.0).into(), (2.0, 5.0).into(), (1.0, 1.0).into()];
/// let sorted = preprocess(samples, DuplicatePolicy::Mean).unwrap();
///
/// assert_eq!(vec![0.0, 1.0, 2.0], sorted.iter().map(Sample::get_x).collect::<Vec<f64>>());
/// assert_eq!(4.5, sorted[2].get_y());
/// ```
/// # Errors
/// - [SplineError::NonFinite] if any coordinate is NaN or infinite,
/// - [SplineError::DuplicateX] for repeated `x` under [DuplicatePolicy::Reject],
/// - [SplineError::InsufficientData] if fewer than 3 distinct `x` remain.
pub fn preprocess(mut samples: Vec<Sample>, policy: DuplicatePolicy) -> Result<Vec<Sample>> {
    if samples.iter().any(|s| !s.is_finite()) {
        return Err(SplineError::NonFinite);
    }
    let received = samples.len();
    samples.sort();

    let mut unique: Vec<Sample> = Vec::with_capacity(received);
    let mut group_size = 0usize;

    for sample in samples {
        match unique.last_mut() {
            Some(last) if last.x == sample.x => {
                group_size += 1;
                match policy {
                    DuplicatePolicy::KeepFirst => {}
                    DuplicatePolicy::KeepLast => last.y = sample.y,
                    DuplicatePolicy::Mean => {
                        last.y += (sample.y - last.y) / group_size as f64;
                    }
                    DuplicatePolicy::Reject => return Err(SplineError::DuplicateX(sample.x)),
                }
            }
            _ => {
                group_size = 1;
                unique.push(sample);
            }
        }
    }

    if unique.len() < received {
        warn!(
            "{} samples with duplicate x collapsed ({:?})",
            received - unique.len(),
            policy
        );
    }
    ensure_min_points(unique.len())?;
    debug!("preprocessed {} samples into {} knots", received, unique.len());
    Ok(unique)
}

/// Sorts x-only values ascending and removes duplicates.
/// # Errors
/// [SplineError::NonFinite] or [SplineError::InsufficientData] if fewer than 3 distinct values remain.
pub fn preprocess_points(points: &[f64]) -> Result<Vec<f64>> {
    if points.iter().any(|p| !p.is_finite()) {
        return Err(SplineError::NonFinite);
    }
    let mut sorted = points.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    ensure_min_points(sorted.len())?;
    Ok(sorted)
}

/// Splits samples into separate `x` and `y` vectors.
pub(crate) fn unzip(samples: &[Sample]) -> (Vec<f64>, Vec<f64>) {
    samples.iter().map(|s| (s.x, s.y)).unzip()
}
