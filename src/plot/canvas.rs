//! Plotters rendering of a `Drawing`.
//!
//! `draw_on` is backend-agnostic: the SVG writer and the TUI widget both call it
//! with their own drawing area and palette.

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::plot::drawing::{Bounds, Drawing, Ink};

/// Horizontal view range (wall width is normalized to 1).
pub const X_VIEW: (f64, f64) = (-0.2, 1.2);

/// Vertical padding around the drawing.
const Y_PAD: f64 = 0.1;

/// Colors for one backend.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Option<RGBColor>,
    pub outline: RGBColor,
    pub crack: RGBColor,
    pub text: RGBColor,
}

impl Palette {
    /// Black outlines on white, for files.
    pub const PAPER: Palette = Palette {
        background: Some(WHITE),
        outline: BLACK,
        crack: RED,
        text: BLACK,
    };

    /// Light outlines on the terminal background.
    pub const TERMINAL: Palette = Palette {
        background: None,
        outline: WHITE,
        crack: RGBColor(255, 64, 64),
        text: WHITE,
    };

    fn ink(&self, ink: Ink) -> RGBColor {
        match ink {
            Ink::Outline => self.outline,
            Ink::Crack => self.crack,
        }
    }
}

/// Data-space view of `drawing`: fixed x range, y fitted to the strokes.
pub fn view_bounds(drawing: &Drawing) -> Bounds {
    let Some(b) = drawing.bounds() else {
        return Bounds {
            x_min: X_VIEW.0,
            x_max: X_VIEW.1,
            y_min: 0.0,
            y_max: 1.0,
        };
    };
    Bounds {
        x_min: X_VIEW.0.min(b.x_min - Y_PAD),
        x_max: X_VIEW.1.max(b.x_max + Y_PAD),
        y_min: b.y_min - Y_PAD,
        y_max: b.y_max + Y_PAD,
    }
}

/// Draw every stroke of `drawing` (plus title) onto `root`.
///
/// No axes or mesh: the diagram is a schematic, not a chart.
pub fn draw_on<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    drawing: &Drawing,
    palette: Palette,
    title_size: u32,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    if let Some(bg) = palette.background {
        root.fill(&bg)?;
    }

    let view = view_bounds(drawing);
    let mut builder = ChartBuilder::on(root);
    builder.margin(2);
    if let Some(title) = &drawing.title {
        builder.caption(title, ("sans-serif", title_size).into_font().color(&palette.text));
    }
    let mut chart = builder.build_cartesian_2d(view.x_min..view.x_max, view.y_min..view.y_max)?;

    for stroke in &drawing.strokes {
        let style = palette.ink(stroke.ink).stroke_width(stroke.weight.max(1));
        chart.draw_series(std::iter::once(PathElement::new(stroke.points.clone(), style)))?;
    }

    Ok(())
}
