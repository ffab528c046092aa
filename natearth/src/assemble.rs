//! Assemblage des features : attributs + géométries, appariés par position
//!
//! Le N-ième enregistrement de la table attributaire et le N-ième
//! enregistrement du fichier de formes décrivent la même entité. Aucune clé ne
//! les relie ; l'égalité des effectifs est une propriété du jeu de données.

use crate::dbf::DbfRecord;
use crate::shp::{ShapeRecord, ShpHeader};
use crate::types::{Feature, FeatureCollection};

/// Associe un enregistrement attributaire et une géométrie
pub fn assemble_feature(record: DbfRecord, shape: ShapeRecord) -> Feature {
    Feature {
        properties: record.properties,
        geometry: shape.geometry,
    }
}

/// Construit la collection complète avec l'emprise de l'en-tête
pub fn assemble_collection(
    header: &ShpHeader,
    records: Vec<DbfRecord>,
    shapes: Vec<ShapeRecord>,
) -> FeatureCollection {
    let features = records
        .into_iter()
        .zip(shapes)
        .map(|(record, shape)| assemble_feature(record, shape))
        .collect();

    FeatureCollection {
        bbox: header.bbox.xy(),
        features,
    }
}
