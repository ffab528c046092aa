//! Erreurs de la couche carte (projection, export)

use natearth::NatearthError;
use thiserror::Error;

/// Erreurs de projection et d'export
#[derive(Debug, Error)]
pub enum MapError {
    /// Options de transformation ou objet d'entrée invalides
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Decode(#[from] NatearthError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Geometry serialization failed: {0}")]
    Geometry(#[from] geozero::error::GeozeroError),
}

impl MapError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
