//! Illustrative crack patterns drawn over the wall elevation.
//!
//! Each failure mode has exactly one routine. Crack coordinates are read from the
//! digitized data files as fractions of wall width/height and scaled to the
//! current geometry.

use crate::config::AssetPaths;
use crate::domain::{FailureMode, WallGeometry};
use crate::error::AppError;
use crate::io::crack::{CrackPattern, read_crack_data};
use crate::plot::drawing::{Drawing, Ink};

pub const ILLUSTRATION_NOTE: &str = "Note: Pictures shown are for illustration purpose only.";

/// Line weight of the sliding-plane stroke.
const SLIDING_WEIGHT: u32 = 8;

/// Crack rendering routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrackRoutine {
    /// Diagonal tension crack, mirrored top/bottom.
    DiagonalTension,
    /// Horizontal flexural cracks, mirrored left/right.
    Flexural,
    /// Flexural cracks turning diagonal, mirrored left/right.
    FlexuralShear,
    /// Single thick sliding plane.
    SlidingPlane,
}

impl CrackRoutine {
    pub fn for_mode(mode: FailureMode) -> Self {
        match mode {
            FailureMode::Flexure => CrackRoutine::Flexural,
            FailureMode::FlexureShear => CrackRoutine::FlexuralShear,
            FailureMode::Shear => CrackRoutine::DiagonalTension,
            FailureMode::Sliding => CrackRoutine::SlidingPlane,
        }
    }

    /// Number of `Line #k` blocks in the routine's data file.
    pub fn line_count(self) -> usize {
        match self {
            CrackRoutine::DiagonalTension | CrackRoutine::SlidingPlane => 1,
            CrackRoutine::Flexural | CrackRoutine::FlexuralShear => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CrackRoutine::DiagonalTension => "Shear Failure",
            CrackRoutine::Flexural => "Flexural Failure",
            CrackRoutine::FlexuralShear => "Flexure-Shear Failure",
            CrackRoutine::SlidingPlane => "Sliding Failure",
        }
    }

    /// Draw `pattern` scaled to `geometry`.
    pub fn draw(self, drawing: &mut Drawing, geometry: &WallGeometry, pattern: &CrackPattern) {
        let (w, h) = (geometry.width, geometry.height);
        let scale = |pts: &[(f64, f64)], map: &dyn Fn(f64, f64) -> (f64, f64)| -> Vec<(f64, f64)> {
            pts.iter().map(|&(x, y)| map(x, y)).collect()
        };

        match self {
            CrackRoutine::DiagonalTension => {
                for line in &pattern.lines {
                    drawing.polyline(scale(line, &|x, y| (x * w, y * h)), Ink::Crack, 1);
                    drawing.polyline(scale(line, &|x, y| (x * w, (1.0 - y) * h)), Ink::Crack, 1);
                }
            }
            CrackRoutine::Flexural | CrackRoutine::FlexuralShear => {
                for line in &pattern.lines {
                    drawing.polyline(scale(line, &|x, y| (x * w, y * h)), Ink::Crack, 1);
                    drawing.polyline(scale(line, &|x, y| ((1.0 - x) * w, y * h)), Ink::Crack, 1);
                }
            }
            CrackRoutine::SlidingPlane => {
                for line in &pattern.lines {
                    drawing.polyline(scale(line, &|x, y| (x * w, y * h)), Ink::Crack, SLIDING_WEIGHT);
                }
            }
        }

        drawing.title = Some(self.title().to_string());
        drawing.caption = Some(ILLUSTRATION_NOTE.to_string());
    }
}

/// Load the crack data for `mode` and overlay it.
pub fn draw_crack(
    drawing: &mut Drawing,
    geometry: &WallGeometry,
    mode: FailureMode,
    assets: &AssetPaths,
) -> Result<(), AppError> {
    let routine = CrackRoutine::for_mode(mode);
    let pattern = read_crack_data(&assets.crack(mode), routine.line_count())?;
    routine.draw(drawing, geometry, &pattern);
    Ok(())
}
