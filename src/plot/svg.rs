//! SVG export of the wall diagram.

use std::path::Path;

use plotters::prelude::*;

use crate::error::AppError;
use crate::plot::canvas::{Palette, draw_on, view_bounds};
use crate::plot::drawing::Drawing;

/// Extra pixels reserved for the title and caption.
const LABEL_BAND: u32 = 70;

/// Pixel size that keeps the data aspect ratio at `width_px` wide.
pub fn svg_size(drawing: &Drawing, width_px: u32) -> (u32, u32) {
    let view = view_bounds(drawing);
    let aspect = view.height() / view.width();
    let plot_height = (width_px as f64 * aspect).round().clamp(50.0, 20_000.0) as u32;
    (width_px, plot_height + LABEL_BAND)
}

/// Write `drawing` to an SVG file at `path`.
pub fn write_svg(drawing: &Drawing, path: &Path, width_px: u32) -> Result<(), AppError> {
    let (w, h) = svg_size(drawing, width_px.max(100));
    let map = |e: &dyn std::fmt::Display| AppError::new(2, format!("Failed to render SVG '{}': {e}", path.display()));

    let root = SVGBackend::new(path, (w, h)).into_drawing_area();
    let (plot_area, caption_area) = root.split_vertically(h - LABEL_BAND / 2);
    root.fill(&WHITE).map_err(|e| map(&e))?;
    draw_on(&plot_area, drawing, Palette::PAPER, 20).map_err(|e| map(&e))?;

    if let Some(caption) = &drawing.caption {
        caption_area
            .draw(&Text::new(caption.clone(), (10, 5), ("sans-serif", 14).into_font().color(&BLACK)))
            .map_err(|e| map(&e))?;
    }

    root.present().map_err(|e| map(&e))?;
    tracing::info!(path = %path.display(), width = w, height = h, "wrote wall diagram");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::drawing::Ink;

    #[test]
    fn size_tracks_aspect_ratio() {
        let mut tall = Drawing::new();
        tall.rect((0.0, 0.0), 1.0, 4.0, Ink::Outline);
        let mut short = Drawing::new();
        short.rect((0.0, 0.0), 1.0, 0.5, Ink::Outline);
        let (_, h_tall) = svg_size(&tall, 400);
        let (_, h_short) = svg_size(&short, 400);
        assert!(h_tall > h_short);
    }

    #[test]
    fn writes_svg_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wall.svg");
        let mut d = Drawing::new();
        d.rect((0.0, 0.0), 1.0, 1.5, Ink::Outline);
        d.segment((0.2, 0.1), (0.4, 0.3), Ink::Crack);
        d.title = Some("Shear Failure".to_string());
        d.caption = Some("note".to_string());
        write_svg(&d, &path, 300).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<svg"));
        assert!(text.contains("Shear Failure"));
    }
}
