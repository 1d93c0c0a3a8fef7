//! Orchestration d'une passe de rendu complète
//!
//! Agrégation → jointure → transformation → classification → style, en une
//! passe synchrone pure. Pas de recalcul incrémental : tout changement de
//! paramètre (palette, nombre de classes, sélection) relance la passe.

use crate::aggregate::{aggregate, AggregatePolicy};
use crate::error::ChoroplethError;
use crate::join::{join, MatchField};
use crate::scale::build_scale;
use crate::style::style;
use crate::transform::Transform;
use crate::types::{DataWarning, GeometryFeature, MatchStats, RenderPass, ValueRecord};

/// Paramètres d'une passe de rendu, fournis par les contrôles de l'UI
#[derive(Debug, Clone)]
pub struct PipelineParams {
    /// Champ de jointure (nom ou code)
    pub match_field: MatchField,

    /// Politique de réduction des clés dupliquées
    pub policy: AggregatePolicy,

    /// Transformation appliquée avant classification
    pub transform: Transform,

    /// Nom de la palette
    pub palette_name: String,

    /// Nombre de classes (≥ 2)
    pub n_classes: usize,

    /// Libellé de la légende
    pub caption: String,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            match_field: MatchField::Name,
            policy: AggregatePolicy::Max,
            transform: Transform::Identity,
            palette_name: "YlOrRd".to_string(),
            n_classes: 10,
            caption: "Niveau".to_string(),
        }
    }
}

/// Exécute la passe de rendu complète
///
/// Les erreurs de configuration (palette inconnue, `n_classes < 2`) sont
/// fatales et arrêtent la passe avant tout calcul de style ; les problèmes
/// de qualité de données (cellules non numériques, codes absents) sont
/// récupérés ligne par ligne et remontés dans `RenderPass::warnings`.
///
/// Invariant : `styles.len() == features.len()`, quel que soit le taux de
/// correspondance.
pub fn run(
    features: &[GeometryFeature],
    records: &[ValueRecord],
    params: &PipelineParams,
) -> Result<RenderPass, ChoroplethError> {
    // Valider la configuration avant de toucher aux données
    if params.n_classes < 2 {
        return Err(ChoroplethError::InvalidClassCount(params.n_classes));
    }
    crate::palette::palette(&params.palette_name)?;

    let (aggregated, mut warnings) = aggregate(records, params.policy);
    let (joined, join_warnings) = join(features, &aggregated, params.match_field);
    warnings.extend(join_warnings);

    let transformed: Vec<f64> = joined
        .iter()
        .map(|j| params.transform.apply(j.value))
        .collect();
    let scale = build_scale(&transformed, params.n_classes, &params.palette_name)?;

    let styles = features
        .iter()
        .zip(&joined)
        .map(|(feature, j)| style(feature, j, &scale, params.transform))
        .collect();

    let stats = MatchStats {
        features: features.len(),
        matched: joined.iter().filter(|j| j.has_value).count(),
        rows: records.len(),
        rows_dropped: warnings
            .iter()
            .filter(|w| matches!(w, DataWarning::UnparsableLevel { .. }))
            .count(),
    };

    let legend = scale.legend(&params.caption);

    Ok(RenderPass {
        styles,
        legend,
        scale,
        joined,
        warnings,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Geometry};

    fn feature(name: &str) -> GeometryFeature {
        GeometryFeature {
            id: name.to_string(),
            name: name.to_string(),
            code: None,
            boundary: Geometry::Polygon(polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 0.0, y: 1.0),
            ]),
        }
    }

    #[test]
    fn test_configuration_errors_abort_before_running() {
        let features = vec![feature("A")];
        let records = vec![ValueRecord::new("A", 1.0)];

        let params = PipelineParams {
            n_classes: 1,
            ..PipelineParams::default()
        };
        assert!(matches!(
            run(&features, &records, &params),
            Err(ChoroplethError::InvalidClassCount(1))
        ));

        let params = PipelineParams {
            palette_name: "Inferno".to_string(),
            ..PipelineParams::default()
        };
        assert!(matches!(
            run(&features, &records, &params),
            Err(ChoroplethError::UnknownPalette { .. })
        ));
    }

    #[test]
    fn test_one_style_per_feature() {
        let features = vec![feature("A"), feature("B"), feature("C")];
        let records = vec![ValueRecord::new("b", 4.0)];
        let pass = run(&features, &records, &PipelineParams::default()).unwrap();
        assert_eq!(pass.styles.len(), 3);
        assert_eq!(pass.joined.len(), 3);
        assert_eq!(pass.stats.matched, 1);
    }

    #[test]
    fn test_stats_count_dropped_rows() {
        let features = vec![feature("A")];
        let records = vec![
            ValueRecord::parse("A", "5"),
            ValueRecord::parse("A", "pas un nombre"),
        ];
        let pass = run(&features, &records, &PipelineParams::default()).unwrap();
        assert_eq!(pass.stats.rows, 2);
        assert_eq!(pass.stats.rows_dropped, 1);
        assert_eq!(pass.warnings.len(), 1);
        assert_eq!(pass.joined[0].value, 5.0);
    }
}
