//! Types d'erreurs pour le crate choropleth

use thiserror::Error;

/// Erreurs de configuration : le rendu n'est pas lancé
#[derive(Debug, Error)]
pub enum ChoroplethError {
    /// Palette inconnue
    #[error("Unknown palette '{name}'. Available: {available}")]
    UnknownPalette { name: String, available: String },

    /// Nombre de classes invalide (minimum 2)
    #[error("Invalid class count: {0} (minimum is 2)")]
    InvalidClassCount(usize),

    /// Colonne requise absente de la table de valeurs
    #[error("Missing required column: '{column}'")]
    MissingColumn { column: String },

    /// Politique d'agrégation inconnue
    #[error("Unknown aggregation policy '{0}'. Use: max, sum, first, mean")]
    UnknownPolicy(String),

    /// Transformation inconnue
    #[error("Unknown transform '{0}'. Use: identity, log1p")]
    UnknownTransform(String),

    /// Champ de jointure inconnu
    #[error("Unknown match field '{0}'. Use: name, code")]
    UnknownMatchField(String),
}

impl ChoroplethError {
    /// Crée une erreur de palette inconnue avec la liste des palettes disponibles
    pub fn unknown_palette(name: impl Into<String>) -> Self {
        Self::UnknownPalette {
            name: name.into(),
            available: crate::palette::names().join(", "),
        }
    }

    /// Crée une erreur de colonne manquante
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }
}
