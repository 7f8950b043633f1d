//! Owned drawing surface.
//!
//! Renderers append strokes to a `Drawing`; backends (SVG, ASCII, TUI) read it.
//! A redraw always starts from an empty surface, so there is no hidden figure
//! state shared between requests.

/// Stroke color role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ink {
    /// Wall outline (black).
    Outline,
    /// Crack overlay (red).
    Crack,
}

/// One polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub points: Vec<(f64, f64)>,
    pub ink: Ink,
    /// Line width in backend units (1 = hairline).
    pub weight: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    pub strokes: Vec<Stroke>,
    pub title: Option<String>,
    pub caption: Option<String>,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Grow every side by `pad`.
    pub fn padded(&self, pad: f64) -> Self {
        Self {
            x_min: self.x_min - pad,
            x_max: self.x_max + pad,
            y_min: self.y_min - pad,
            y_max: self.y_max + pad,
        }
    }
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all strokes and labels.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.title = None;
        self.caption = None;
    }

    pub fn polyline(&mut self, points: Vec<(f64, f64)>, ink: Ink, weight: u32) {
        if points.len() >= 2 {
            self.strokes.push(Stroke { points, ink, weight });
        }
    }

    pub fn segment(&mut self, from: (f64, f64), to: (f64, f64), ink: Ink) {
        self.polyline(vec![from, to], ink, 1);
    }

    /// Closed rectangle with lower-left corner `origin`.
    ///
    /// Traced left edge, top, right edge, bottom.
    pub fn rect(&mut self, origin: (f64, f64), width: f64, height: f64, ink: Ink) {
        let (x, y) = origin;
        self.polyline(
            vec![(x, y), (x, y + height), (x + width, y + height), (x + width, y), (x, y)],
            ink,
            1,
        );
    }

    pub fn strokes_with(&self, ink: Ink) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter().filter(move |s| s.ink == ink)
    }

    /// Bounding box of every stroke, or `None` for an empty drawing.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut b = Bounds {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
        };
        for &(x, y) in self.strokes.iter().flat_map(|s| s.points.iter()) {
            b.x_min = b.x_min.min(x);
            b.x_max = b.x_max.max(x);
            b.y_min = b.y_min.min(y);
            b.y_max = b.y_max.max(y);
        }
        if b.x_min.is_finite() && b.y_min.is_finite() {
            Some(b)
        } else {
            None
        }
    }
}
