//! Wall diagrams: geometry outlines, crack overlays and their renderers.

pub mod ascii;
pub mod canvas;
pub mod crack;
pub mod drawing;
pub mod svg;
pub mod wall;

pub use ascii::render_ascii_diagram;
pub use canvas::{Palette, draw_on};
pub use crack::{CrackRoutine, ILLUSTRATION_NOTE, draw_crack};
pub use drawing::{Drawing, Ink, Stroke};
pub use svg::write_svg;
pub use wall::draw_wall;
