//! Projection planaire des features décodées
//!
//! Pour chaque position : projection, miroir, arrondi au centième (les demis
//! vont vers +∞), puis mise à l'échelle. Les objets d'entrée ne sont jamais
//! modifiés ; chaque transformation retourne un nouvel objet.

pub mod mercator;
pub mod options;

pub use options::{Mirror, Projection, TransformOptions};

use natearth::{Feature, FeatureCollection, GeoObject, Geometry, Position, Ring};
use rayon::prelude::*;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::object::geo_object_from_json;

/// Arrondi au centième, demis vers +∞
pub fn round_hundredth(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Projette une position décodée `[lat, lon]` vers `[x, y]`
pub fn project_position([lat, lon]: Position, options: &TransformOptions) -> Position {
    let (x, y) = match options.projection() {
        Projection::None => (lon, lat),
        Projection::Mercator => mercator::geographic_to_mercator(lat, lon),
    };
    let (x, y) = options.mirror().apply(x, y);
    [
        round_hundredth(x) * options.scale(),
        round_hundredth(y) * options.scale(),
    ]
}

/// Projette une liste d'anneaux
pub fn project(rings: &[Ring], options: &TransformOptions) -> Vec<Ring> {
    rings
        .iter()
        .map(|ring| ring.iter().map(|&p| project_position(p, options)).collect())
        .collect()
}

pub fn project_geometry(geometry: &Geometry, options: &TransformOptions) -> Geometry {
    geometry.map_positions(|p| project_position(p, options))
}

pub fn transform_feature(feature: &Feature, options: &TransformOptions) -> Feature {
    Feature {
        properties: feature.properties.clone(),
        geometry: project_geometry(&feature.geometry, options),
    }
}

/// Transforme toutes les features ; l'emprise reste en unités source
pub fn transform_collection(
    collection: &FeatureCollection,
    options: &TransformOptions,
) -> FeatureCollection {
    debug!(
        features = collection.features.len(),
        scale = options.scale(),
        projection = %options.projection(),
        mirror = %options.mirror(),
        "Projecting collection"
    );

    FeatureCollection {
        bbox: collection.bbox,
        features: collection
            .features
            .par_iter()
            .map(|feature| transform_feature(feature, options))
            .collect(),
    }
}

pub fn transform(object: &GeoObject, options: &TransformOptions) -> GeoObject {
    match object {
        GeoObject::Feature(feature) => transform_feature(feature, options).into(),
        GeoObject::FeatureCollection(collection) => {
            transform_collection(collection, options).into()
        }
    }
}

/// Variante non typée : options et objet sont validés avant toute projection
///
/// # Errors
///
/// `MapError::Validation` pour des options invalides ou un objet dont le
/// `type` n'est ni `Feature` ni `FeatureCollection`.
pub fn transform_json(object: Value, options: &Value) -> Result<GeoObject> {
    let options = TransformOptions::from_json(options)?;
    let object = geo_object_from_json(object)?;
    Ok(transform(&object, &options))
}
