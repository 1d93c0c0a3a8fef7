//! Jointure gauche géométries ↔ table agrégée

use std::collections::HashMap;
use std::str::FromStr;

use tracing::warn;

use crate::error::ChoroplethError;
use crate::normalize::{normalize, NormalizedKey};
use crate::types::{DataWarning, GeometryFeature, JoinedFeature};

/// Valeur attribuée aux features absentes de la table
///
/// Défaut explicite (pas de null) : la classification n'a jamais à traiter
/// de donnée manquante, c'est le styleur qui distingue l'absence via
/// `has_value`.
pub const UNMATCHED_VALUE: f64 = 0.0;

/// Champ de la feature utilisé comme clé de jointure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchField {
    /// Jointure sur le nom (normalisé)
    #[default]
    Name,
    /// Jointure sur le code INSEE
    Code,
}

impl FromStr for MatchField {
    type Err = ChoroplethError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" | "nom" => Ok(Self::Name),
            "code" => Ok(Self::Code),
            _ => Err(ChoroplethError::UnknownMatchField(s.to_string())),
        }
    }
}

/// Jointure gauche totale : une sortie par feature d'entrée, dans l'ordre
///
/// Les features sans correspondance reçoivent [`UNMATCHED_VALUE`] et
/// `has_value = false` ; aucune géométrie n'est perdue faute de match.
/// La correspondance est insensible à la casse et aux espaces, mais jamais
/// floue (pas de distance d'édition ni de pliage d'accents).
pub fn join(
    features: &[GeometryFeature],
    aggregated: &HashMap<NormalizedKey, f64>,
    match_field: MatchField,
) -> (Vec<JoinedFeature>, Vec<DataWarning>) {
    let mut warnings = Vec::new();
    let joined = features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            let key = match match_field {
                MatchField::Name => Some(normalize(&feature.name)),
                MatchField::Code => match &feature.code {
                    Some(code) => Some(normalize(code)),
                    None => {
                        warn!(name = %feature.name, "jointure sur code mais feature sans code");
                        warnings.push(DataWarning::MissingCode {
                            name: feature.name.clone(),
                        });
                        None
                    }
                },
            };

            match key.and_then(|k| aggregated.get(&k)) {
                Some(value) => JoinedFeature {
                    index,
                    value: *value,
                    has_value: true,
                },
                None => JoinedFeature {
                    index,
                    value: UNMATCHED_VALUE,
                    has_value: false,
                },
            }
        })
        .collect();

    (joined, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueRecord;
    use crate::aggregate::{aggregate, AggregatePolicy};
    use geo::{polygon, Geometry};

    fn feature(name: &str, code: Option<&str>) -> GeometryFeature {
        GeometryFeature {
            id: code.unwrap_or(name).to_string(),
            name: name.to_string(),
            code: code.map(str::to_string),
            boundary: Geometry::Polygon(polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0),
                (x: 0.0, y: 1.0),
            ]),
        }
    }

    fn table(rows: &[(&str, f64)]) -> HashMap<NormalizedKey, f64> {
        let records: Vec<ValueRecord> =
            rows.iter().map(|(k, v)| ValueRecord::new(*k, *v)).collect();
        aggregate(&records, AggregatePolicy::Max).0
    }

    #[test]
    fn test_left_join_is_total() {
        let features = vec![
            feature("Strasbourg", Some("67482")),
            feature("Colmar", Some("68066")),
            feature("Obernai", Some("67348")),
        ];
        let (joined, _) = join(&features, &table(&[("strasbourg", 10.0)]), MatchField::Name);
        assert_eq!(joined.len(), features.len());

        let (joined, _) = join(&features, &HashMap::new(), MatchField::Name);
        assert_eq!(joined.len(), features.len());
        assert!(joined.iter().all(|j| !j.has_value && j.value == 0.0));
    }

    #[test]
    fn test_match_on_name_is_case_and_whitespace_insensitive() {
        let features = vec![feature("Strasbourg", None)];
        let (joined, _) = join(&features, &table(&[("  STRASBOURG ", 42.0)]), MatchField::Name);
        assert!(joined[0].has_value);
        assert_eq!(joined[0].value, 42.0);
    }

    #[test]
    fn test_match_on_code_preserves_leading_zeros() {
        let features = vec![feature("Ambérieu", Some("01004"))];
        // "1004" ne doit pas matcher "01004" : comparaison de chaînes
        let (joined, _) = join(&features, &table(&[("1004", 5.0)]), MatchField::Code);
        assert!(!joined[0].has_value);

        let (joined, _) = join(&features, &table(&[("01004", 5.0)]), MatchField::Code);
        assert!(joined[0].has_value);
    }

    #[test]
    fn test_code_match_without_code_warns() {
        let features = vec![feature("SansCode", None)];
        let (joined, warnings) = join(&features, &table(&[("67001", 1.0)]), MatchField::Code);
        assert!(!joined[0].has_value);
        assert_eq!(
            warnings,
            vec![DataWarning::MissingCode {
                name: "SansCode".to_string()
            }]
        );
    }

    #[test]
    fn test_duplicate_codes_stay_separate_features() {
        // Codes dupliqués entre sources fusionnées : gardés tels quels
        let features = vec![
            feature("DoublonNord", Some("67001")),
            feature("DoublonSud", Some("67001")),
        ];
        let (joined, _) = join(&features, &table(&[("67001", 9.0)]), MatchField::Code);
        assert_eq!(joined.len(), 2);
        assert!(joined.iter().all(|j| j.has_value && j.value == 9.0));
    }

    #[test]
    fn test_input_order_preserved() {
        let features = vec![feature("B", None), feature("A", None)];
        let (joined, _) = join(&features, &table(&[("a", 1.0), ("b", 2.0)]), MatchField::Name);
        assert_eq!(joined[0].index, 0);
        assert_eq!(joined[0].value, 2.0);
        assert_eq!(joined[1].index, 1);
        assert_eq!(joined[1].value, 1.0);
    }
}
