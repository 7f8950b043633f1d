//! Linear regression estimator: `y = w · x + b`.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::estimator::{Estimator, RawOutput, check_row_width};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub weights: Vec<f64>,
    #[serde(default)]
    pub bias: f64,
}

impl Estimator for LinearModel {
    fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<RawOutput>, AppError> {
        batch
            .iter()
            .map(|row| {
                check_row_width(row, self.weights.len())?;
                let y = self.weights.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + self.bias;
                Ok(RawOutput::Number(y))
            })
            .collect()
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.weights.len())
    }
}
