//! Configuration des exports
//!
//! Un fichier de configuration porte les options de transformation :
//!
//! ```json
//! { "transform": { "scale": 2, "projection": "mercator", "mirror": "x" } }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use anyhow::{Context, Result};

use crate::projection::TransformOptions;

/// Configuration principale
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Options appliquées avant l'export
    #[serde(default)]
    pub transform: TransformOptions,
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "flat" => Self::load_embedded(include_str!("presets/flat.json")),
            "mercator" => Self::load_embedded(include_str!("presets/mercator.json")),
            "atlas" => Self::load_embedded(include_str!("presets/atlas.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: flat, mercator, atlas", preset),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }
}
