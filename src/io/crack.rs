//! Read digitized crack polylines.
//!
//! A crack data file is a sequence of blocks:
//!
//! ```text
//! Line #1
//! 0.10 0.95
//! 0.22 0.80
//!
//! Line #2
//! ...
//! ```
//!
//! Coordinates are fractions of the wall width (x) and height (y). Blank lines
//! are ignored; a block ends at the next marker or at end of file. Every block
//! needs at least two points to draw a segment.

use std::fs;
use std::path::Path;

use crate::error::AppError;

/// One polyline in normalized wall coordinates.
pub type Polyline = Vec<(f64, f64)>;

/// All polylines of one crack data file, in marker order.
#[derive(Debug, Clone, PartialEq)]
pub struct CrackPattern {
    pub lines: Vec<Polyline>,
}

/// Read `line_count` polylines (`Line #1` .. `Line #line_count`) from `path`.
pub fn read_crack_data(path: &Path, line_count: usize) -> Result<CrackPattern, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(3, format!("Failed to read crack data '{}': {e}", path.display())))?;
    parse_crack_data(&text, line_count)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))
}

/// Parse crack data text.
pub fn parse_crack_data(text: &str, line_count: usize) -> Result<CrackPattern, AppError> {
    let mut blocks: Vec<(usize, Polyline)> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(k) = marker_number(line) {
            blocks.push((k, Vec::new()));
            continue;
        }

        let Some((_, points)) = blocks.last_mut() else {
            return Err(AppError::new(
                3,
                format!("coordinates on line {} appear before the first `Line #` marker", idx + 1),
            ));
        };
        points.push(parse_pair(line, idx + 1)?);
    }

    let mut lines = Vec::with_capacity(line_count);
    for k in 1..=line_count {
        let (_, points) = blocks
            .iter()
            .find(|(n, _)| *n == k)
            .ok_or_else(|| AppError::new(3, format!("missing `Line #{k}` block")))?;
        if points.len() < 2 {
            return Err(AppError::new(
                3,
                format!("`Line #{k}` has {} coordinate(s); a crack needs at least 2", points.len()),
            ));
        }
        lines.push(points.clone());
    }

    Ok(CrackPattern { lines })
}

fn marker_number(line: &str) -> Option<usize> {
    line.strip_prefix("Line #")?.trim().parse().ok()
}

fn parse_pair(line: &str, line_no: usize) -> Result<(f64, f64), AppError> {
    let mut tokens = line.split_whitespace();
    let mut next = |axis: &str| -> Result<f64, AppError> {
        let token = tokens
            .next()
            .ok_or_else(|| AppError::new(3, format!("missing {axis} coordinate on line {line_no}")))?;
        token
            .parse::<f64>()
            .map_err(|_| AppError::new(3, format!("non-numeric {axis} coordinate '{token}' on line {line_no}")))
    };
    let x = next("x")?;
    let y = next("y")?;
    Ok((x, y))
}
