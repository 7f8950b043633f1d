//! Wall elevation and plan outlines.
//!
//! The elevation sits at the origin; the plan (top view) is drawn above it,
//! separated by half the wall width.

use crate::domain::{SectionType, WallGeometry};
use crate::plot::drawing::{Drawing, Ink};

/// Shape constants of a boundary-element (barbell or flange) section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryElement {
    /// End-block width as a fraction of the wall width.
    pub ratio_width: f64,
    /// End-block thickness as a multiple of the web thickness.
    pub ratio_thickness: f64,
}

impl BoundaryElement {
    pub fn for_section(section: SectionType) -> Option<Self> {
        match section {
            SectionType::Rectangular => None,
            SectionType::Barbell => Some(Self {
                ratio_width: 0.2,
                ratio_thickness: 3.0,
            }),
            SectionType::Flange => Some(Self {
                ratio_width: 0.07,
                ratio_thickness: 8.0,
            }),
        }
    }
}

/// Vertical gap between elevation and plan.
pub fn view_spacing(geometry: &WallGeometry) -> f64 {
    0.5 * geometry.width
}

/// Draw the outline for `geometry` onto `drawing`.
pub fn draw_wall(drawing: &mut Drawing, geometry: &WallGeometry) {
    match BoundaryElement::for_section(geometry.section_type) {
        None => draw_rectangular(drawing, geometry),
        Some(element) => draw_boundary_element(drawing, geometry, element),
    }
}

fn draw_rectangular(drawing: &mut Drawing, g: &WallGeometry) {
    drawing.rect((0.0, 0.0), g.width, g.height, Ink::Outline);
    let plan_y = g.height + view_spacing(g);
    drawing.rect((0.0, plan_y), g.width, g.thickness, Ink::Outline);
}

fn draw_boundary_element(drawing: &mut Drawing, g: &WallGeometry, element: BoundaryElement) {
    let (w, h, t) = (g.width, g.height, g.thickness);
    let bw = w * element.ratio_width;

    // Elevation: outline plus the two boundary-element edges.
    drawing.rect((0.0, 0.0), w, h, Ink::Outline);
    drawing.segment((bw, 0.0), (bw, h), Ink::Outline);
    drawing.segment((w - bw, 0.0), (w - bw, h), Ink::Outline);

    // Plan: end blocks `bt` thick joined by a centred web `t` thick.
    let y0 = h + view_spacing(g);
    let bt = t * element.ratio_thickness;
    let d = (bt - t) / 2.0;
    drawing.polyline(
        vec![
            (0.0, y0),
            (0.0, y0 + bt),
            (bw, y0 + bt),
            (bw, y0 + bt - d),
            (w - bw, y0 + bt - d),
            (w - bw, y0 + bt),
            (w, y0 + bt),
            (w, y0),
            (w - bw, y0),
            (w - bw, y0 + d),
            (bw, y0 + d),
            (bw, y0),
            (0.0, y0),
        ],
        Ink::Outline,
        1,
    );
}
