//! Turn raw estimator outputs into domain predictions.

use crate::domain::{FailureMode, Prediction};
use crate::error::AppError;
use crate::math::{StatBlock, denormalize_scalar};
use crate::models::estimator::RawOutput;

/// How a model's raw output becomes a `Prediction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDecoder {
    /// Classifier code `1..=4` to a named failure mode.
    FailureModeCode,
    /// Regressor output in normalized space, inverted with the output statistics.
    Denormalized,
}

impl OutputDecoder {
    pub fn needs_output_stats(self) -> bool {
        matches!(self, OutputDecoder::Denormalized)
    }

    pub fn decode(self, raw: &RawOutput, output_stats: Option<&StatBlock>) -> Result<Prediction, AppError> {
        match self {
            OutputDecoder::FailureModeCode => decode_failure_mode(raw).map(Prediction::FailureMode),
            OutputDecoder::Denormalized => {
                let RawOutput::Number(y) = raw else {
                    return Err(AppError::new(5, format!("Regressor returned a non-numeric output '{raw}'.")));
                };
                let stats =
                    output_stats.ok_or_else(|| AppError::new(3, "Missing output statistics for a regressor."))?;
                denormalize_scalar(*y, stats).map(Prediction::Scalar)
            }
        }
    }
}

/// Map a classifier code to a failure mode.
///
/// Numeric and string codes are equivalent: `1`, `1.0`, and `"1"` all decode to
/// `Flexure`. Anything outside `1..=4` is rejected.
pub fn decode_failure_mode(raw: &RawOutput) -> Result<FailureMode, AppError> {
    let code = match raw {
        RawOutput::Number(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
        RawOutput::Number(_) => None,
        RawOutput::Label(s) => s.trim().parse::<i64>().ok(),
    };
    code.and_then(FailureMode::from_code)
        .ok_or_else(|| AppError::new(5, format!("Unknown failure mode code '{raw}'.")))
}
