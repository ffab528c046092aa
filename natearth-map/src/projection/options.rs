//! Options de transformation : échelle, projection, miroir

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MapError, Result};

/// Projection appliquée à chaque position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// `(lat, lon) → (x = lon, y = lat)`
    #[default]
    None,
    Mercator,
}

impl Projection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Mercator => "mercator",
        }
    }
}

impl FromStr for Projection {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Self::None),
            "mercator" => Ok(Self::Mercator),
            other => Err(MapError::validation(format!(
                "unknown projection '{}', expected none or mercator",
                other
            ))),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axe(s) inversé(s) après projection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mirror {
    #[default]
    None,
    /// Inverse `y` (symétrie par rapport à l'axe des x)
    X,
    /// Inverse `x`
    Y,
    Xy,
}

impl Mirror {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::X => "x",
            Self::Y => "y",
            Self::Xy => "xy",
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Self::None => (x, y),
            Self::X => (x, -y),
            Self::Y => (-x, y),
            Self::Xy => (-x, -y),
        }
    }
}

impl FromStr for Mirror {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Self::None),
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "xy" => Ok(Self::Xy),
            other => Err(MapError::validation(format!(
                "unknown mirror '{}', expected none, x, y or xy",
                other
            ))),
        }
    }
}

impl fmt::Display for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options validées ; une instance existante est toujours utilisable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct TransformOptions {
    scale: f64,
    projection: Projection,
    mirror: Mirror,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            projection: Projection::None,
            mirror: Mirror::None,
        }
    }
}

impl TransformOptions {
    /// # Errors
    ///
    /// `MapError::Validation` si `scale` est inférieure à 1 ou non finie.
    pub fn new(scale: f64, projection: Projection, mirror: Mirror) -> Result<Self> {
        if !scale.is_finite() || scale < 1.0 {
            return Err(MapError::validation(format!(
                "scale must be a number >= 1, got {}",
                scale
            )));
        }
        Ok(Self {
            scale,
            projection,
            mirror,
        })
    }

    /// Options depuis un objet JSON `{scale, projection, mirror}`, champs facultatifs
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(MapError::validation(format!(
                "transform options must be an object, got {}",
                value
            )));
        };

        let scale = match map.get("scale") {
            None | Some(Value::Null) => 1.0,
            Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            Some(other) => {
                return Err(MapError::validation(format!(
                    "scale must be a number, got {}",
                    other
                )))
            }
        };
        let projection = string_option(map, "projection")?
            .map(str::parse::<Projection>)
            .transpose()?
            .unwrap_or_default();
        let mirror = string_option(map, "mirror")?
            .map(str::parse::<Mirror>)
            .transpose()?
            .unwrap_or_default();

        Self::new(scale, projection, mirror)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn mirror(&self) -> Mirror {
        self.mirror
    }

    pub fn with_scale(self, scale: f64) -> Result<Self> {
        Self::new(scale, self.projection, self.mirror)
    }

    pub fn with_projection(self, projection: Projection) -> Self {
        Self { projection, ..self }
    }

    pub fn with_mirror(self, mirror: Mirror) -> Self {
        Self { mirror, ..self }
    }
}

fn string_option<'a>(map: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(MapError::validation(format!(
            "{} must be a string, got {}",
            key, other
        ))),
    }
}

impl TryFrom<Value> for TransformOptions {
    type Error = MapError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_json(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = TransformOptions::from_json(&json!({})).unwrap();
        assert_eq!(options, TransformOptions::default());
        assert_eq!(options.scale(), 1.0);
        assert_eq!(options.projection(), Projection::None);
        assert_eq!(options.mirror(), Mirror::None);
    }

    #[test]
    fn test_scale_bounds() {
        assert!(TransformOptions::from_json(&json!({"scale": 1})).is_ok());
        assert!(TransformOptions::from_json(&json!({"scale": 0.5}))
            .unwrap_err()
            .is_validation());
        assert!(TransformOptions::from_json(&json!({"scale": "2"}))
            .unwrap_err()
            .is_validation());
        assert!(TransformOptions::new(f64::NAN, Projection::None, Mirror::None).is_err());
        assert!(TransformOptions::new(f64::INFINITY, Projection::None, Mirror::None).is_err());
    }

    #[test]
    fn test_unknown_names() {
        let err = TransformOptions::from_json(&json!({"projection": "azimuthal"})).unwrap_err();
        assert!(err.to_string().contains("azimuthal"));
        let err = TransformOptions::from_json(&json!({"mirror": "z"})).unwrap_err();
        assert!(err.to_string().contains("'z'"));
        assert!(TransformOptions::from_json(&json!({"mirror": 1})).is_err());
    }

    #[test]
    fn test_non_object_options() {
        for value in [json!(null), json!(2), json!("mercator"), json!([1])] {
            assert!(TransformOptions::from_json(&value).unwrap_err().is_validation());
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let options = TransformOptions::new(4.0, Projection::Mercator, Mirror::Xy).unwrap();
        let json = serde_json::to_value(options).unwrap();
        assert_eq!(json, json!({"scale": 4.0, "projection": "mercator", "mirror": "xy"}));

        let back: TransformOptions = serde_json::from_value(json).unwrap();
        assert_eq!(back, options);

        let err = serde_json::from_value::<TransformOptions>(json!({"scale": 0})).unwrap_err();
        assert!(err.to_string().contains("scale"));
    }

    #[test]
    fn test_mirror_apply() {
        assert_eq!(Mirror::None.apply(1.0, 2.0), (1.0, 2.0));
        assert_eq!(Mirror::X.apply(1.0, 2.0), (1.0, -2.0));
        assert_eq!(Mirror::Y.apply(1.0, 2.0), (-1.0, 2.0));
        assert_eq!(Mirror::Xy.apply(1.0, 2.0), (-1.0, -2.0));
    }
}
