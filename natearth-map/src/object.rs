//! Lecture d'objets géographiques non typés (JSON)
//!
//! Les entrées produites par `natearth` sont déjà typées ; ce module sert aux
//! objets relus depuis un fichier ou fournis par un appelant externe.

use natearth::{Feature, FeatureCollection, GeoObject};
use serde_json::Value;

use crate::error::{MapError, Result};

/// Convertit une valeur JSON en `GeoObject` après contrôle du `type`
///
/// # Errors
///
/// `MapError::Validation` si le `type` de premier niveau n'est ni `Feature`
/// ni `FeatureCollection`, ou si la structure ne correspond pas au type.
pub fn geo_object_from_json(value: Value) -> Result<GeoObject> {
    let kind = match value.get("type") {
        Some(Value::String(kind)) => kind.clone(),
        Some(other) => {
            return Err(MapError::validation(format!(
                "object type must be a string, got {}",
                other
            )))
        }
        None => {
            return Err(MapError::validation(
                "object has no type, expected Feature or FeatureCollection",
            ))
        }
    };

    match kind.as_str() {
        "Feature" => serde_json::from_value::<Feature>(value)
            .map(GeoObject::from)
            .map_err(|e| MapError::validation(format!("invalid Feature: {}", e))),
        "FeatureCollection" => serde_json::from_value::<FeatureCollection>(value)
            .map(GeoObject::from)
            .map_err(|e| MapError::validation(format!("invalid FeatureCollection: {}", e))),
        other => Err(MapError::validation(format!(
            "unsupported object type '{}', expected Feature or FeatureCollection",
            other
        ))),
    }
}

/// Lit un objet géographique depuis un texte JSON
pub fn geo_object_from_str(json: &str) -> Result<GeoObject> {
    geo_object_from_json(serde_json::from_str(json)?)
}
