//! ASCII rendering of the wall diagram for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - wall outline: `#`
//! - crack overlay: `*` (drawn last so it stays visible over the outline)

use crate::plot::canvas::view_bounds;
use crate::plot::drawing::{Bounds, Drawing, Ink};

/// Render `drawing` onto a `width` x `height` character grid.
pub fn render_ascii_diagram(drawing: &Drawing, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let view = view_bounds(drawing);

    let mut grid = vec![vec![' '; width]; height];

    for (ink, ch) in [(Ink::Outline, '#'), (Ink::Crack, '*')] {
        for stroke in drawing.strokes_with(ink) {
            let mut prev = None;
            for &(x, y) in &stroke.points {
                let cell = (map_x(x, &view, width), map_y(y, &view, height));
                if let Some((x0, y0)) = prev {
                    draw_line(&mut grid, x0, y0, cell.0, cell.1, ch);
                } else {
                    grid[cell.1][cell.0] = ch;
                }
                prev = Some(cell);
            }
        }
    }

    let mut out = String::new();
    if let Some(title) = &drawing.title {
        out.push_str(title);
        out.push('\n');
    }
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    if let Some(caption) = &drawing.caption {
        out.push_str(caption);
        out.push('\n');
    }
    out
}

fn map_x(x: f64, view: &Bounds, width: usize) -> usize {
    let u = ((x - view.x_min) / view.width()).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, view: &Bounds, height: usize) -> usize {
    let u = ((y - view.y_min) / view.height()).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Later strokes overwrite earlier ones.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagram_golden_snapshot_small() {
        let mut d = Drawing::new();
        // View becomes x in [-0.3, 1.3], y in [0, 1].
        d.rect((-0.2, 0.1), 1.4, 0.8, Ink::Outline);
        d.segment((0.5, 0.3), (0.5, 0.7), Ink::Crack);

        let txt = render_ascii_diagram(&d, 15, 5);
        let expected = concat!(
            "\n",
            " #############\n",
            " #     *     #\n",
            " #     *     #\n",
            " #     *     #\n",
            " #############\n",
        );
        assert_eq!(format!("\n{txt}"), expected);
    }

    #[test]
    fn title_and_caption_frame_the_grid() {
        let mut d = Drawing::new();
        d.rect((0.0, 0.0), 1.0, 1.0, Ink::Outline);
        d.title = Some("Flexural Failure".to_string());
        d.caption = Some("note".to_string());
        let txt = render_ascii_diagram(&d, 20, 8);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.first(), Some(&"Flexural Failure"));
        assert_eq!(lines.last(), Some(&"note"));
        assert_eq!(lines.len(), 10);
    }
}
