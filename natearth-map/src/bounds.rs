//! Emprise réelle des coordonnées décodées

use natearth::Feature;
use serde::Serialize;

/// Longitudes et latitudes extrêmes d'un ensemble de features
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Boundaries {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
}

impl Boundaries {
    /// `None` si aucune feature ne porte de coordonnée
    ///
    /// Tous les anneaux comptent, y compris les îles d'un même Polygon.
    pub fn of(features: &[Feature]) -> Option<Self> {
        features
            .iter()
            .flat_map(|f| f.geometry.positions())
            .map(|&[lat, lon]| Self {
                lon_min: lon,
                lat_min: lat,
                lon_max: lon,
                lat_max: lat,
            })
            .reduce(|a, b| Self {
                lon_min: a.lon_min.min(b.lon_min),
                lat_min: a.lat_min.min(b.lat_min),
                lon_max: a.lon_max.max(b.lon_max),
                lat_max: a.lat_max.max(b.lat_max),
            })
    }

    pub fn width(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }
}
