//! Export predictions to CSV (batch) and JSON (single wall).
//!
//! Both formats are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{PARAMETER_NAMES, WallParameters, WallPrediction};
use crate::error::AppError;
use crate::io::ingest::{BatchRow, ID_COLUMN, SECTION_COLUMN};

/// Self-describing record of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub tool: String,
    pub version: String,
    /// RFC 3339 UTC timestamp.
    pub generated_at: String,
    pub inputs: WallParameters,
    pub outputs: WallPrediction,
}

impl PredictionReport {
    pub fn new(inputs: WallParameters, outputs: WallPrediction) -> Self {
        Self {
            tool: "rcwall".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            inputs,
            outputs,
        }
    }
}

/// Write a prediction report as pretty JSON.
pub fn write_prediction_json(path: &Path, report: &PredictionReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;
    Ok(())
}

/// Write batch results (inputs echoed, then the three outputs) to a CSV file.
pub fn write_results_csv(path: &Path, rows: &[BatchRow], predictions: &[WallPrediction]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, rows, predictions)?;
    tracing::info!("Wrote {} predictions to '{}'", predictions.len(), path.display());
    Ok(())
}

/// Write batch results to any writer.
pub fn write_results<W: Write>(sink: W, rows: &[BatchRow], predictions: &[WallPrediction]) -> Result<(), AppError> {
    if rows.len() != predictions.len() {
        return Err(AppError::new(
            5,
            format!("{} rows but {} predictions.", rows.len(), predictions.len()),
        ));
    }

    let mut writer = csv::Writer::from_writer(sink);
    let header = std::iter::once(ID_COLUMN)
        .chain(PARAMETER_NAMES)
        .chain([SECTION_COLUMN, "failure_mode", "strength", "deformation"]);
    writer
        .write_record(header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (row, p) in rows.iter().zip(predictions) {
        let mut record = Vec::with_capacity(14);
        record.push(row.id.clone());
        record.extend(row.params.scalars().iter().map(|v| v.to_string()));
        record.push(row.params.section_type.to_string());
        record.push(p.failure_mode.to_string());
        record.push(format!("{:.6}", p.strength));
        record.push(format!("{:.6}", p.deformation));
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FailureMode, SectionType};

    fn prediction() -> WallPrediction {
        WallPrediction {
            failure_mode: FailureMode::FlexureShear,
            strength: 0.123456789,
            deformation: 1.5,
        }
    }

    #[test]
    fn results_csv_echoes_inputs_and_outputs() {
        let rows = vec![BatchRow {
            line: 2,
            id: "W,1".to_string(),
            params: WallParameters {
                section_type: SectionType::Flange,
                ..WallParameters::default()
            },
        }];
        let mut buf = Vec::new();
        write_results(&mut buf, &rows, &[prediction()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("id,capacity_ratio,shear_span"));
        assert!(header.ends_with("section_type,failure_mode,strength,deformation"));

        let row = lines.next().unwrap();
        assert!(row.starts_with("\"W,1\",1.45,1.47,"));
        assert!(row.ends_with(",Flange,Flexure-Shear,0.123457,1.500000"));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = write_results(Vec::new(), &[], &[prediction()]).unwrap_err();
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn report_json_is_self_describing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = PredictionReport::new(WallParameters::default(), prediction());
        write_prediction_json(&path, &report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["tool"], "rcwall");
        assert_eq!(value["inputs"]["section_type"], "Rectangular");
        assert_eq!(value["outputs"]["failure_mode"], "Flexure-Shear");
        assert!(value["generated_at"].as_str().unwrap().ends_with('Z'));

        let back: PredictionReport = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.outputs.failure_mode, FailureMode::FlexureShear);
        assert_eq!(back.inputs.section_type, SectionType::Rectangular);
    }
}
