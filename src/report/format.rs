//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized (the tests below pin the layout)

use crate::domain::{PARAMETER_NAMES, WallParameters, WallPrediction};
use crate::io::ingest::{BatchInput, RowError};
use crate::report::ModeCounts;

/// Form labels, aligned with `PARAMETER_NAMES`.
pub const PARAMETER_LABELS: [&str; 9] = [
    "Vn/Vs",
    "M/(V lw)",
    "P/(fc Ag)",
    "rho_vb fy_vb/fc",
    "rho_hb fy_hb/fc",
    "lw/tw",
    "rho_hw fy_hw/fc",
    "rho_vw fy_vw/fc",
    "Ab/Ag",
];

/// Format the inputs and the three predicted outputs of one wall.
pub fn format_prediction_summary(params: &WallParameters, prediction: &WallPrediction) -> String {
    let mut out = String::new();

    out.push_str("=== rcwall - RC Shear Wall Predictor ===\n");
    out.push_str("Inputs:\n");
    for ((name, label), value) in PARAMETER_NAMES.iter().zip(PARAMETER_LABELS).zip(params.scalars()) {
        out.push_str(&format!("  {name:<16} {label:<16} {value:>10.4}\n"));
    }
    out.push_str(&format!("  {:<16} {:<16} {:>10}\n", "section_type", "", params.section_type));

    out.push_str("\nPredictions:\n");
    out.push_str(&format!("  Failure mode          : {}\n", prediction.failure_mode));
    out.push_str(&format!("  Strength  V/(Ag fc)   : {:.4}\n", prediction.strength));
    out.push_str(&format!("  Deformation theta_u % : {:.4}\n", prediction.deformation));

    out
}

/// Format a batch run: counts per failure mode, then skipped rows.
pub fn format_batch_summary(input: &BatchInput, predictions: &[WallPrediction]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Rows: read={} | predicted={} | skipped={}\n",
        input.rows_read,
        predictions.len(),
        input.row_errors.len()
    ));

    let counts = ModeCounts::tally(predictions);
    out.push_str("\nFailure modes:\n");
    for (mode, n) in counts.iter() {
        out.push_str(&format!("  {:<14} {n:>6}\n", mode.display_name()));
    }

    if !input.row_errors.is_empty() {
        out.push_str("\nSkipped rows:\n");
        out.push_str(&format_row_errors(&input.row_errors));
    }

    out
}

/// Table of row-level ingest errors.
pub fn format_row_errors(errors: &[RowError]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>6} {:<16} {}", "line", "id", "error").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<6} {:-<16} {:-<5}", "", "", "").trim_end());
    out.push('\n');

    for e in errors {
        out.push_str(
            format!(
                "{:>6} {:<16} {}",
                e.line,
                truncate(e.id.as_deref().unwrap_or(""), 16),
                e.message
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
