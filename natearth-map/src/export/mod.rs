//! Modules d'export (SVG, GeoJSON)

pub mod geojson;
pub mod svg;

pub use geojson::{export_to_geojson, AxisOrder};
pub use svg::{emit, emit_path, emit_stdout};
