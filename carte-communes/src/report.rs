//! Rapport de passe de rendu avec graceful degradation
//!
//! Collecte les compteurs et les problèmes de qualité d'une passe pour les
//! afficher et, au besoin, les écrire en JSON.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use choropleth::{DataWarning, GeometryFeature, RenderPass};

/// Rapport complet d'une passe de rendu
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    /// Nombre de features en entrée
    pub features: usize,
    /// Features matchées par la table
    pub matched: usize,
    /// Features sans donnée
    pub unmatched: usize,
    /// Lignes de la table en entrée
    pub rows: usize,
    /// Lignes écartées (niveau non numérique)
    pub rows_dropped: usize,
    /// Durée de la passe
    pub duration_secs: f64,
    /// Noms des communes sans donnée
    pub unmatched_names: Vec<String>,
    /// Problèmes de qualité, mis en forme
    pub warnings: Vec<String>,
}

impl RenderReport {
    /// Construit le rapport depuis une passe et d'éventuels warnings
    /// supplémentaires (validation de codes côté application)
    pub fn build(
        features: &[GeometryFeature],
        pass: &RenderPass,
        extra_warnings: &[DataWarning],
        duration: Duration,
    ) -> Self {
        let unmatched_names: Vec<String> = pass
            .joined
            .iter()
            .filter(|j| !j.has_value)
            .map(|j| features[j.index].name.clone())
            .collect();

        let warnings = pass
            .warnings
            .iter()
            .chain(extra_warnings)
            .map(ToString::to_string)
            .collect();

        Self {
            features: pass.stats.features,
            matched: pass.stats.matched,
            unmatched: unmatched_names.len(),
            rows: pass.stats.rows,
            rows_dropped: pass.stats.rows_dropped,
            duration_secs: duration.as_secs_f64(),
            unmatched_names,
            warnings,
        }
    }

    /// Affiche le résumé via tracing
    pub fn print_summary(&self) {
        info!(
            features = self.features,
            matched = self.matched,
            unmatched = self.unmatched,
            rows = self.rows,
            duration_secs = format!("{:.2}", self.duration_secs),
            "passe de rendu terminée"
        );
        if self.rows_dropped > 0 {
            warn!(
                rows_dropped = self.rows_dropped,
                "lignes écartées (niveau non numérique)"
            );
        }
        for warning in &self.warnings {
            warn!("{warning}");
        }
    }

    /// Écrit le rapport en JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }
}
