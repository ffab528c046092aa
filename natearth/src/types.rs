//! Types de données pour le crate natearth
//!
//! Les coordonnées décodées sont des paires `[lat, lon]` (ordre conservé pour
//! compatibilité avec les objets produits par les versions précédentes). Après
//! projection, les mêmes types portent des paires planes `[x, y]`.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Paire de coordonnées
pub type Position = [f64; 2];

/// Suite ordonnée de positions (une "part" du fichier de formes)
pub type Ring = Vec<Position>;

/// Géométrie d'une feature
///
/// PolyLine et Polygon partagent la même structure multi-part ; seule
/// l'interprétation diffère.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    PolyLine(Vec<Ring>),
    Polygon(Vec<Ring>),
}

impl Geometry {
    /// Nom du type tel qu'il apparaît dans l'objet sérialisé
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::PolyLine(_) => "PolyLine",
            Self::Polygon(_) => "Polygon",
        }
    }

    /// Anneaux de la géométrie ; un Point forme un anneau d'une seule position
    pub fn rings(&self) -> Vec<&[Position]> {
        match self {
            Self::Point(p) => vec![std::slice::from_ref(p)],
            Self::PolyLine(rings) | Self::Polygon(rings) => {
                rings.iter().map(Vec::as_slice).collect()
            }
        }
    }

    /// Itère sur toutes les positions, anneau par anneau
    pub fn positions(&self) -> impl Iterator<Item = &Position> + '_ {
        let rings: &[Ring] = match self {
            Self::Point(_) => &[],
            Self::PolyLine(rings) | Self::Polygon(rings) => rings,
        };
        let point = match self {
            Self::Point(p) => Some(p),
            _ => None,
        };
        point.into_iter().chain(rings.iter().flatten())
    }

    /// Nouvelle géométrie de même forme, chaque position passée par `f`
    pub fn map_positions<F>(&self, mut f: F) -> Geometry
    where
        F: FnMut(Position) -> Position,
    {
        match self {
            Self::Point(p) => Self::Point(f(*p)),
            Self::PolyLine(rings) => Self::PolyLine(map_rings(rings, &mut f)),
            Self::Polygon(rings) => Self::Polygon(map_rings(rings, &mut f)),
        }
    }
}

fn map_rings<F: FnMut(Position) -> Position>(rings: &[Ring], f: &mut F) -> Vec<Ring> {
    rings
        .iter()
        .map(|ring| ring.iter().map(|&p| f(p)).collect())
        .collect()
}

/// Valeur scalaire décodée d'un champ attributaire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
    /// Champ numérique vide (NULL dBase)
    Null,
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }
}

/// Attributs d'une feature, dans l'ordre des descripteurs de champs
///
/// Les clés sont uniques : réinsérer une clé existante remplace la valeur
/// sans changer sa position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<(String, FieldValue)>);

impl Properties {
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

impl FromIterator<(String, FieldValue)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut props = Properties::default();
        for (k, v) in iter {
            props.insert(k, v);
        }
        props
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropertiesVisitor;

        impl<'de> Visitor<'de> for PropertiesVisitor {
            type Value = Properties;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of attribute values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Properties, A::Error> {
                let mut props = Properties::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, FieldValue>()? {
                    props.insert(k, v);
                }
                Ok(props)
            }
        }

        deserializer.deserialize_map(PropertiesVisitor)
    }
}

/// Une entité géographique : attributs + géométrie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub properties: Properties,
    pub geometry: Geometry,
}

/// Ensemble ordonné de features avec l'emprise du jeu de données
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    /// `[Xmin, Ymin, Xmax, Ymax]` tel que lu dans l'en-tête du fichier de formes
    pub bbox: [f64; 4],
    pub features: Vec<Feature>,
}

/// Objet de premier niveau accepté par les étapes de transformation et d'export
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeoObject {
    Feature(Feature),
    FeatureCollection(FeatureCollection),
}

impl GeoObject {
    /// Features de l'objet, dans l'ordre
    pub fn features(&self) -> &[Feature] {
        match self {
            Self::Feature(f) => std::slice::from_ref(f),
            Self::FeatureCollection(c) => &c.features,
        }
    }
}

impl From<Feature> for GeoObject {
    fn from(feature: Feature) -> Self {
        Self::Feature(feature)
    }
}

impl From<FeatureCollection> for GeoObject {
    fn from(collection: FeatureCollection) -> Self {
        Self::FeatureCollection(collection)
    }
}
