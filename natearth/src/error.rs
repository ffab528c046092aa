//! Types d'erreurs pour le crate natearth

use thiserror::Error;

/// Erreurs pouvant survenir lors du décodage d'un jeu de données
#[derive(Debug, Error)]
pub enum NatearthError {
    /// Erreur d'I/O lors de la lecture des fichiers
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Chemin ou fichier manquant
    #[error("Missing required file: {0}")]
    MissingFile(String),

    /// Structure binaire invalide ou inattendue
    #[error("Format error in {file}: {reason}")]
    Format { file: &'static str, reason: String },

    /// Type de champ ou de forme reconnu mais non géré
    #[error("Unsupported {kind} in {file}: {code}")]
    Unsupported {
        file: &'static str,
        kind: &'static str,
        code: String,
    },

    /// Numéro d'enregistrement hors bornes (les numéros commencent à 1)
    #[error("Record number {requested} out of range (1..={count})")]
    Range { requested: usize, count: usize },
}

impl NatearthError {
    /// Crée une erreur de format avec contexte
    pub fn format(file: &'static str, reason: impl Into<String>) -> Self {
        Self::Format {
            file,
            reason: reason.into(),
        }
    }

    /// Crée une erreur de type non supporté
    pub fn unsupported(file: &'static str, kind: &'static str, code: impl Into<String>) -> Self {
        Self::Unsupported {
            file,
            kind,
            code: code.into(),
        }
    }

    /// Vérifie un numéro d'enregistrement 1-based
    pub fn check_range(requested: usize, count: usize) -> Result<usize> {
        if requested == 0 || requested > count {
            return Err(Self::Range { requested, count });
        }
        Ok(requested - 1)
    }

    /// Vrai pour toutes les erreurs de structure binaire
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::Unsupported { .. })
    }
}

/// Alias de résultat du crate
pub type Result<T> = std::result::Result<T, NatearthError>;
