//! Plotting: ASCII charts for the terminal and SVG files via Plotters.

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;
