//! Plotters-powered wall diagram widget for Ratatui.
//!
//! The same `plot::draw_on` routine that writes SVG files renders here, so the
//! terminal view and exported files never disagree. Output goes into the
//! Ratatui buffer through `plotters-ratatui-backend`.

use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::plot::{Drawing, Palette, draw_on};

/// Title font size in terminal "pixels".
const TITLE_SIZE: u32 = 10;

/// Render-only view of a `Drawing`.
pub struct WallDiagram<'a> {
    pub drawing: &'a Drawing,
}

impl<'a> Widget for WallDiagram<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area; show a hint instead of panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Diagram area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let drawing = self.drawing;
        let widget = widget_fn(move |root| {
            draw_on(&root, drawing, Palette::TERMINAL, TITLE_SIZE)?;
            Ok(())
        });

        widget.render(area, buf);
    }
}
