//! Projection de Mercator sphérique, exprimée en degrés
//!
//! `x` reste la longitude ; `y = ln(tan(π/4 + φ/2))` ramené en degrés. Au-delà
//! de ±85.05° la valeur est bornée à ±180 pour éviter l'infini aux pôles.

use std::f64::consts::FRAC_PI_4;

/// Latitude au-delà de laquelle `y` est borné
pub const MERCATOR_LIMIT: f64 = 85.05;

/// Valeur de `y` aux latitudes bornées
pub const MERCATOR_CLAMP: f64 = 180.0;

/// Ordonnée Mercator (degrés) pour une latitude en degrés
pub fn mercator_y(lat: f64) -> f64 {
    if lat > MERCATOR_LIMIT {
        MERCATOR_CLAMP
    } else if lat < -MERCATOR_LIMIT {
        -MERCATOR_CLAMP
    } else {
        (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln().to_degrees()
    }
}

/// Projette `(lat, lon)` vers `(x, y)`
pub fn geographic_to_mercator(lat: f64, lon: f64) -> (f64, f64) {
    (lon, mercator_y(lat))
}
