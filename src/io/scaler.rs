//! Read scaler statistics files.
//!
//! Two layouts are supported:
//!
//! - **JSON** (`*.json`): self-describing, statistics addressed by name.
//! - **Legacy text** (anything else): whitespace-separated floats on hard-coded
//!   line indices, as written by the training scripts. There is no header to
//!   check against, so a reordered file decodes silently into wrong statistics;
//!   prefer the JSON layout for new artifacts.

use std::fs::{self, File};
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::StatBlock;

/// Input-side (and, for regressors, output-side) normalization statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalerStats {
    pub input: StatBlock,
    pub output: Option<StatBlock>,
}

impl ScalerStats {
    /// Check invariants against the feature vector this scaler will normalize.
    pub fn validate(&self, expected_len: usize, needs_output: bool) -> Result<(), AppError> {
        self.input.validate("input")?;
        if self.input.len() != expected_len {
            return Err(AppError::new(
                3,
                format!(
                    "Scaler input statistics have length {}, but the model expects {expected_len} features.",
                    self.input.len()
                ),
            ));
        }

        match (&self.output, needs_output) {
            (Some(output), true) => {
                output.validate("output")?;
                if output.len() != 1 {
                    return Err(AppError::new(
                        3,
                        format!("Scaler output statistics have length {}, expected 1.", output.len()),
                    ));
                }
            }
            (None, true) => {
                return Err(AppError::new(3, "Scaler file has no output statistics for a regression model."));
            }
            _ => {}
        }

        Ok(())
    }

    /// Output block, or a configuration error if absent.
    pub fn output(&self) -> Result<&StatBlock, AppError> {
        self.output
            .as_ref()
            .ok_or_else(|| AppError::new(3, "Scaler file has no output statistics."))
    }
}

/// Fixed line offsets (0-based) of the legacy text layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LegacyLayout {
    /// Input mean/var/min/max only.
    Classifier,
    /// Input and output mean/var/min/max.
    Regressor,
}

#[derive(Debug, Clone, Copy)]
struct BlockLines {
    mean: usize,
    var: usize,
    min: usize,
    max: usize,
}

impl LegacyLayout {
    fn input_lines(self) -> BlockLines {
        match self {
            LegacyLayout::Classifier => BlockLines {
                mean: 3,
                var: 5,
                min: 8,
                max: 10,
            },
            LegacyLayout::Regressor => BlockLines {
                mean: 4,
                var: 6,
                min: 15,
                max: 17,
            },
        }
    }

    fn output_lines(self) -> Option<BlockLines> {
        match self {
            LegacyLayout::Classifier => None,
            LegacyLayout::Regressor => Some(BlockLines {
                mean: 9,
                var: 11,
                min: 20,
                max: 22,
            }),
        }
    }
}

/// Serialized form of a `StatBlock` in the JSON layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatBlockFile {
    pub mean: Vec<f64>,
    pub var: Vec<f64>,
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

/// JSON layout of a scaler file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerFile {
    pub input: StatBlockFile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<StatBlockFile>,
}

impl From<StatBlockFile> for StatBlock {
    fn from(value: StatBlockFile) -> Self {
        StatBlock::new(value.mean, value.var, value.min, value.max)
    }
}

impl From<&StatBlock> for StatBlockFile {
    fn from(value: &StatBlock) -> Self {
        Self {
            mean: value.mean.iter().copied().collect(),
            var: value.var.iter().copied().collect(),
            min: value.min.iter().copied().collect(),
            max: value.max.iter().copied().collect(),
        }
    }
}

/// Load scaler statistics, choosing the layout from the file extension.
///
/// `layout` only applies to legacy text files.
pub fn load_scaler(path: &Path, layout: LegacyLayout) -> Result<ScalerStats, AppError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let stats = if is_json {
        read_scaler_json(path)?
    } else {
        let text = fs::read_to_string(path)
            .map_err(|e| AppError::new(3, format!("Failed to read scaler file '{}': {e}", path.display())))?;
        parse_legacy_scaler(&text, layout)
            .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?
    };

    tracing::debug!(path = %path.display(), features = stats.input.len(), "loaded scaler statistics");
    Ok(stats)
}

/// Read the JSON layout.
pub fn read_scaler_json(path: &Path) -> Result<ScalerStats, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(3, format!("Failed to open scaler JSON '{}': {e}", path.display())))?;
    let raw: ScalerFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(3, format!("Invalid scaler JSON '{}': {e}", path.display())))?;
    Ok(ScalerStats {
        input: raw.input.into(),
        output: raw.output.map(Into::into),
    })
}

/// Write the JSON layout (used to migrate legacy text files).
pub fn write_scaler_json(path: &Path, stats: &ScalerStats) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create scaler JSON '{}': {e}", path.display())))?;
    let raw = ScalerFile {
        input: (&stats.input).into(),
        output: stats.output.as_ref().map(Into::into),
    };
    serde_json::to_writer_pretty(file, &raw)
        .map_err(|e| AppError::new(2, format!("Failed to write scaler JSON: {e}")))?;
    Ok(())
}

/// Decode the legacy text layout.
pub fn parse_legacy_scaler(text: &str, layout: LegacyLayout) -> Result<ScalerStats, AppError> {
    let lines: Vec<&str> = text.lines().collect();
    let input = read_block(&lines, layout.input_lines(), "input")?;
    let output = layout
        .output_lines()
        .map(|block| read_block(&lines, block, "output"))
        .transpose()?;
    Ok(ScalerStats { input, output })
}

fn read_block(lines: &[&str], block: BlockLines, side: &str) -> Result<StatBlock, AppError> {
    Ok(StatBlock::new(
        read_floats(lines, block.mean, side, "mean")?,
        read_floats(lines, block.var, side, "var")?,
        read_floats(lines, block.min, side, "min")?,
        read_floats(lines, block.max, side, "max")?,
    ))
}

fn read_floats(lines: &[&str], idx: usize, side: &str, what: &str) -> Result<Vec<f64>, AppError> {
    let line = lines.get(idx).ok_or_else(|| {
        AppError::new(
            3,
            format!(
                "scaler file has {} lines; {side} {what} expected on line {}",
                lines.len(),
                idx + 1
            ),
        )
    })?;

    let values = line
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                AppError::new(
                    3,
                    format!("non-numeric token '{token}' in {side} {what} on line {}", idx + 1),
                )
            })
        })
        .collect::<Result<Vec<f64>, AppError>>()?;

    if values.is_empty() {
        return Err(AppError::new(3, format!("{side} {what} on line {} is empty", idx + 1)));
    }
    Ok(values)
}
