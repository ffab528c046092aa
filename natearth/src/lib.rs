//! # natearth
//!
//! Décodeur pour les jeux de données Natural Earth : une table attributaire
//! dBase III (`.dbf`) et un fichier de formes ESRI (`.shp`), appariés par
//! position pour produire des features géographiques.
//!
//! ## Features
//!
//! - Vues typées sur les en-têtes binaires, offsets nommés
//! - Décodage parallèle des enregistrements avec `rayon`
//! - Textes UTF-8 validés avec `simdutf8`, repli sur la page de code (`encoding_rs`)
//! - Erreurs explicites pour les types de champs et de formes non gérés
//!
//! ## Usage
//!
//! ```rust,ignore
//! use natearth::load;
//! use std::path::Path;
//!
//! let collection = load(Path::new("./_db"), "ne_110m_admin_0_countries")?;
//! println!("{} features, bbox {:?}", collection.features.len(), collection.bbox);
//! ```

pub mod assemble;
pub mod bytes;
pub mod dataset;
pub mod dbf;
pub mod error;
pub mod shp;
pub mod types;

pub use assemble::{assemble_collection, assemble_feature};
pub use dataset::Dataset;
pub use error::NatearthError;
pub use types::{Feature, FeatureCollection, FieldValue, GeoObject, Geometry, Position, Properties, Ring};

use std::path::Path;

/// Charge un jeu de données et retourne la collection complète
///
/// # Errors
///
/// Retourne `NatearthError` si les fichiers sont absents ou si l'un des
/// décodeurs rencontre une structure invalide.
pub fn load(root: &Path, name: &str) -> Result<FeatureCollection, NatearthError> {
    Dataset::open(root, name)?.collection()
}
