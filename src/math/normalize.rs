//! Two-stage feature normalization.
//!
//! The models were trained on features that went through a standard scaler and
//! then a min-max scaler:
//!
//! ```text
//! normalize(x)   = ((x - mean) / sqrt(var) - min) / (max - min)
//! denormalize(y) = (y * (max - min) + min) * sqrt(var) + mean
//! ```
//!
//! `denormalize` is the exact algebraic inverse. Both are undefined for
//! `var <= 0` or `max == min`; `StatBlock::validate` rejects such statistics up
//! front so the arithmetic below never divides by zero.

use nalgebra::DVector;

use crate::error::AppError;

/// Per-dimension statistics of one side (inputs or outputs) of a scaler.
#[derive(Debug, Clone, PartialEq)]
pub struct StatBlock {
    pub mean: DVector<f64>,
    pub var: DVector<f64>,
    pub min: DVector<f64>,
    pub max: DVector<f64>,
}

impl StatBlock {
    pub fn new(mean: Vec<f64>, var: Vec<f64>, min: Vec<f64>, max: Vec<f64>) -> Self {
        Self {
            mean: DVector::from_vec(mean),
            var: DVector::from_vec(var),
            min: DVector::from_vec(min),
            max: DVector::from_vec(max),
        }
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Check the block is usable for `normalize` / `denormalize`.
    ///
    /// `label` names the block in error messages (e.g. "strength input").
    pub fn validate(&self, label: &str) -> Result<(), AppError> {
        let n = self.len();
        if n == 0 {
            return Err(AppError::new(3, format!("Scaler {label} statistics are empty.")));
        }
        if self.var.len() != n || self.min.len() != n || self.max.len() != n {
            return Err(AppError::new(
                3,
                format!(
                    "Scaler {label} statistics have mismatched lengths (mean={}, var={}, min={}, max={}).",
                    n,
                    self.var.len(),
                    self.min.len(),
                    self.max.len()
                ),
            ));
        }

        for i in 0..n {
            let (mean, var, min, max) = (self.mean[i], self.var[i], self.min[i], self.max[i]);
            if !(mean.is_finite() && var.is_finite() && min.is_finite() && max.is_finite()) {
                return Err(AppError::new(4, format!("Scaler {label} statistics are not finite at index {i}.")));
            }
            if var <= 0.0 {
                return Err(AppError::new(
                    4,
                    format!("Scaler {label} variance must be positive at index {i}, got {var}."),
                ));
            }
            if max == min {
                return Err(AppError::new(
                    4,
                    format!("Scaler {label} min-max range is zero at index {i} (min = max = {min})."),
                ));
            }
        }

        Ok(())
    }

    /// Every statistic vector must match `len` before any component-wise op.
    fn ensure_len(&self, len: usize) -> Result<(), AppError> {
        let lengths = [self.mean.len(), self.var.len(), self.min.len(), self.max.len()];
        if lengths.iter().any(|&l| l != len) {
            return Err(AppError::new(
                4,
                format!(
                    "Vector of length {len} does not match scaler statistics (mean={}, var={}, min={}, max={}).",
                    lengths[0], lengths[1], lengths[2], lengths[3]
                ),
            ));
        }
        Ok(())
    }
}

/// Standardize then min-max scale `x` element-wise.
pub fn normalize(x: &DVector<f64>, stats: &StatBlock) -> Result<DVector<f64>, AppError> {
    stats.ensure_len(x.len())?;
    let std = stats.var.map(f64::sqrt);
    let standard = (x - &stats.mean).component_div(&std);
    let range = &stats.max - &stats.min;
    let scaled = (standard - &stats.min).component_div(&range);
    ensure_finite(&scaled, "normalized features")?;
    Ok(scaled)
}

/// Undo min-max scaling then standardization element-wise.
pub fn denormalize(y: &DVector<f64>, stats: &StatBlock) -> Result<DVector<f64>, AppError> {
    stats.ensure_len(y.len())?;
    let std = stats.var.map(f64::sqrt);
    let range = &stats.max - &stats.min;
    let unscaled = y.component_mul(&range) + &stats.min;
    let original = unscaled.component_mul(&std) + &stats.mean;
    ensure_finite(&original, "denormalized output")?;
    Ok(original)
}

/// `denormalize` for a single-output regressor.
pub fn denormalize_scalar(y: f64, stats: &StatBlock) -> Result<f64, AppError> {
    let out = denormalize(&DVector::from_element(1, y), stats)?;
    Ok(out[0])
}

fn ensure_finite(v: &DVector<f64>, what: &str) -> Result<(), AppError> {
    if let Some(i) = v.iter().position(|x| !x.is_finite()) {
        return Err(AppError::new(4, format!("Non-finite {what} at index {i}.")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn block() -> StatBlock {
        StatBlock::new(vec![1.0, -2.0], vec![4.0, 0.25], vec![-1.5, -3.0], vec![2.5, 1.0])
    }

    #[test]
    fn normalize_matches_formula() {
        let x = DVector::from_vec(vec![3.0, -1.0]);
        let out = normalize(&x, &block()).unwrap();
        // (3-1)/2 = 1 -> (1+1.5)/4 = 0.625
        assert!((out[0] - 0.625).abs() < 1e-12);
        // (-1+2)/0.5 = 2 -> (2+3)/4 = 1.25
        assert!((out[1] - 1.25).abs() < 1e-12);
    }

    #[test]
    fn round_trip_random_vectors() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let n = rng.gen_range(1..16);
            let mean: Vec<f64> = (0..n).map(|_| rng.gen_range(-50.0..50.0)).collect();
            let var: Vec<f64> = (0..n).map(|_| rng.gen_range(0.01..100.0)).collect();
            let min: Vec<f64> = (0..n).map(|_| rng.gen_range(-5.0..0.0)).collect();
            let max: Vec<f64> = (0..n).map(|_| rng.gen_range(0.1..5.0)).collect();
            let stats = StatBlock::new(mean, var, min, max);
            stats.validate("test").unwrap();

            let x = DVector::from_fn(n, |_, _| rng.gen_range(-100.0..100.0));
            let back = denormalize(&normalize(&x, &stats).unwrap(), &stats).unwrap();
            for i in 0..n {
                assert!((back[i] - x[i]).abs() < 1e-9 * (1.0 + x[i].abs()), "{} vs {}", back[i], x[i]);
            }
        }
    }

    #[test]
    fn zero_variance_is_rejected() {
        let stats = StatBlock::new(vec![0.0], vec![0.0], vec![0.0], vec![1.0]);
        let err = stats.validate("input").unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.message().contains("variance"));
    }

    #[test]
    fn zero_range_is_rejected() {
        let stats = StatBlock::new(vec![0.0], vec![1.0], vec![0.5], vec![0.5]);
        let err = stats.validate("output").unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.message().contains("range"));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let stats = StatBlock::new(vec![0.0, 1.0], vec![1.0], vec![0.0, 0.0], vec![1.0, 1.0]);
        assert_eq!(stats.validate("input").unwrap_err().exit_code(), 3);

        let x = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert!(normalize(&x, &block()).is_err());
    }

    #[test]
    fn ragged_statistics_are_an_error_not_a_panic() {
        let stats = StatBlock::new(vec![0.0, 0.0], vec![1.0], vec![0.0, 0.0], vec![1.0, 1.0]);
        let x = DVector::from_vec(vec![1.0, 2.0]);
        let err = normalize(&x, &stats).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.message().contains("var=1"));
        assert_eq!(denormalize(&x, &stats).unwrap_err().exit_code(), 4);

        let short_max = StatBlock::new(vec![0.0], vec![1.0], vec![0.0], vec![]);
        assert!(denormalize_scalar(0.5, &short_max).is_err());
    }

    #[test]
    fn unguarded_zero_range_surfaces_as_error_not_nan() {
        let stats = StatBlock::new(vec![0.0], vec![1.0], vec![0.5], vec![0.5]);
        let x = DVector::from_vec(vec![1.0]);
        assert_eq!(normalize(&x, &stats).unwrap_err().exit_code(), 4);
    }

    #[test]
    fn denormalize_scalar_inverts_output_scaling() {
        let stats = StatBlock::new(vec![0.3], vec![0.01], vec![-2.0], vec![3.0]);
        let y = 0.4;
        let v = denormalize_scalar(y, &stats).unwrap();
        assert!((v - ((0.4 * 5.0 - 2.0) * 0.1 + 0.3)).abs() < 1e-12);
    }
}
