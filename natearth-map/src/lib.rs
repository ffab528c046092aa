//! # natearth-map
//!
//! Projection planaire et export des jeux de données Natural Earth décodés
//! par le crate `natearth`.
//!
//! ## Features
//!
//! - Projection `none` ou Mercator, miroir, arrondi au centième, échelle
//! - Émission SVG (un `<path>` par feature) vers tout `std::io::Write`
//! - Export GeoJSON avec geozero
//! - Presets de projection embarqués
//!
//! ## Usage CLI
//!
//! ```bash
//! # SVG sur la sortie standard
//! natearth-map svg --path ./_db --db ne_110m_admin_0_countries --preset mercator
//!
//! # GeoJSON brut (longitude/latitude)
//! natearth-map geojson --db ne_110m_coastline --output coast.geojson --raw
//!
//! # Résumé des en-têtes
//! natearth-map info --db ne_110m_land
//! ```

pub mod bounds;
pub mod config;
pub mod error;
pub mod export;
pub mod object;
pub mod projection;
pub mod report;

pub use bounds::Boundaries;
pub use config::Config;
pub use error::MapError;
pub use object::geo_object_from_json;
pub use projection::{project, transform, Mirror, Projection, TransformOptions};
pub use report::DatasetReport;
