//! Réduction des clés dupliquées de la table de valeurs

use std::collections::HashMap;
use std::str::FromStr;

use tracing::warn;

use crate::error::ChoroplethError;
use crate::normalize::{normalize, NormalizedKey};
use crate::types::{DataWarning, ValueRecord};

/// Politique de réduction d'un groupe de lignes partageant la même clé
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregatePolicy {
    /// Maximum du groupe (défaut : une source peut répéter une entité avec
    /// un niveau pire cas par mention)
    #[default]
    Max,
    /// Somme du groupe
    Sum,
    /// Première ligne dans l'ordre d'entrée
    First,
    /// Moyenne arithmétique du groupe
    Mean,
}

impl FromStr for AggregatePolicy {
    type Err = ChoroplethError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" => Ok(Self::Max),
            "sum" => Ok(Self::Sum),
            "first" => Ok(Self::First),
            "mean" => Ok(Self::Mean),
            _ => Err(ChoroplethError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Agrège la table de valeurs : une valeur par clé normalisée
///
/// Les cellules non numériques (ou non finies) sont écartées ligne par ligne
/// avec un [`DataWarning`] : les lignes valides sont quand même rendues.
/// Une entrée vide produit une table vide, pas une erreur.
pub fn aggregate(
    records: &[ValueRecord],
    policy: AggregatePolicy,
) -> (HashMap<NormalizedKey, f64>, Vec<DataWarning>) {
    let mut warnings = Vec::new();
    let mut groups: HashMap<NormalizedKey, Vec<f64>> = HashMap::new();

    for record in records {
        match record.level.as_number() {
            Some(v) if v.is_finite() => {
                groups.entry(normalize(&record.key)).or_default().push(v);
            }
            _ => {
                let raw = match &record.level {
                    crate::types::CellValue::Raw(s) => s.clone(),
                    crate::types::CellValue::Number(n) => n.to_string(),
                };
                warn!(key = %record.key, raw = %raw, "niveau non numérique, ligne écartée");
                warnings.push(DataWarning::UnparsableLevel {
                    key: record.key.clone(),
                    raw,
                });
            }
        }
    }

    let mut aggregated = HashMap::with_capacity(groups.len());
    for (key, values) in groups {
        // Les groupes ne sont jamais vides : une clé n'entre qu'avec une valeur
        let reduced = match policy {
            AggregatePolicy::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggregatePolicy::Sum => values.iter().sum(),
            AggregatePolicy::First => values[0],
            AggregatePolicy::Mean => values.iter().sum::<f64>() / values.len() as f64,
        };
        aggregated.insert(key, reduced);
    }

    (aggregated, warnings)
}
