//! Estimator abstraction and artifact loading.
//!
//! The pipeline only needs one capability from a pretrained model: map a batch
//! of normalized feature rows to one output per row. Artifacts are JSON files
//! tagged by `kind`; see `tree` and `linear` for the supported estimators.

use std::fmt;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::linear::LinearModel;
use crate::models::tree::TreeEnsemble;

/// One raw estimator output, before decoding.
///
/// Classifiers may emit their class labels as numbers or as strings, depending
/// on how the training labels were stored.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutput {
    Number(f64),
    Label(String),
}

impl fmt::Display for RawOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawOutput::Number(v) => write!(f, "{v}"),
            RawOutput::Label(s) => write!(f, "{s}"),
        }
    }
}

/// A pretrained model exposing batch prediction.
pub trait Estimator: Send + Sync {
    /// Predict one output per row of `batch`.
    fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<RawOutput>, AppError>;

    /// Number of input features, when the artifact records it.
    fn n_features(&self) -> Option<usize>;
}

/// On-disk estimator artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorFile {
    TreeEnsemble(TreeEnsemble),
    Linear(LinearModel),
}

impl EstimatorFile {
    pub fn into_estimator(self) -> Result<Box<dyn Estimator>, AppError> {
        match self {
            EstimatorFile::TreeEnsemble(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
            EstimatorFile::Linear(model) => Ok(Box::new(model)),
        }
    }
}

/// Open and parse an estimator artifact.
///
/// Nothing is cached: every call re-reads the file.
pub fn load_estimator(path: &Path) -> Result<Box<dyn Estimator>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(3, format!("Failed to open model '{}': {e}", path.display())))?;
    let artifact: EstimatorFile = serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| AppError::new(3, format!("Invalid model artifact '{}': {e}", path.display())))?;
    let estimator = artifact
        .into_estimator()
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), n_features = ?estimator.n_features(), "loaded estimator");
    Ok(estimator)
}

/// Reject rows whose width differs from what the estimator was trained on.
pub(crate) fn check_row_width(row: &[f64], expected: usize) -> Result<(), AppError> {
    if row.len() != expected {
        return Err(AppError::new(
            5,
            format!("Estimator expects {expected} features, got a row of {}.", row.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_linear_artifact_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut file = File::create(&path).unwrap();
        write!(file, r#"{{"kind": "linear", "weights": [1.0, 2.0], "bias": 0.5}}"#).unwrap();

        let model = load_estimator(&path).unwrap();
        assert_eq!(model.n_features(), Some(2));
        let out = model.predict(&[vec![1.0, 1.0]]).unwrap();
        assert_eq!(out, vec![RawOutput::Number(3.5)]);
    }

    #[test]
    fn unknown_kind_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, r#"{"kind": "svm", "weights": []}"#).unwrap();
        assert_eq!(load_estimator(&path).err().unwrap().exit_code(), 3);
    }

    #[test]
    fn missing_artifact_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_estimator(&dir.path().join("nope.json")).err().unwrap().exit_code(), 3);
    }
}
