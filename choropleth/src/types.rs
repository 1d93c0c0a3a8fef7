//! Types de données pour le crate choropleth

use geo::Geometry;
use serde::Serialize;
use std::fmt;

use crate::palette::Color;
use crate::scale::ClassificationScale;

/// Une entité administrative avec sa géométrie
///
/// Chargée une fois par source puis partagée en lecture seule par toutes les
/// passes de rendu. L'unicité de `id`/`code` est supposée mais pas requise :
/// des codes dupliqués entre sources fusionnées restent des features
/// distinctes.
#[derive(Debug, Clone)]
pub struct GeometryFeature {
    /// Identifiant opaque de la feature
    pub id: String,

    /// Nom de l'entité (ex : nom de commune)
    pub name: String,

    /// Code INSEE, si présent dans la source
    pub code: Option<String>,

    /// Géométrie (Polygon ou MultiPolygon en pratique)
    pub boundary: Geometry,
}

/// Valeur brute d'une cellule de niveau
///
/// Les cellules non numériques sont conservées telles quelles et écartées à
/// l'agrégation (ligne ignorée, les lignes valides sont quand même rendues).
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Valeur numérique exploitable
    Number(f64),
    /// Contenu non numérique, gardé pour le diagnostic
    Raw(String),
}

impl CellValue {
    /// Parse une cellule brute avec fast-float, garde le texte en cas d'échec
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Raw(raw.to_string());
        }
        match fast_float::parse::<f64, _>(trimmed) {
            Ok(v) => Self::Number(v),
            Err(_) => Self::Raw(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Raw(_) => None,
        }
    }
}

/// Une ligne de la table de valeurs (clé brute → niveau)
///
/// Plusieurs lignes peuvent partager la même clé : c'est l'agrégateur qui
/// les réduit à une valeur par clé normalisée.
#[derive(Debug, Clone)]
pub struct ValueRecord {
    /// Clé telle que fournie (nom ou code, non normalisé)
    pub key: String,

    /// Niveau brut
    pub level: CellValue,
}

impl ValueRecord {
    /// Crée un enregistrement déjà numérique (variante saisie manuelle)
    pub fn new(key: impl Into<String>, level: f64) -> Self {
        Self {
            key: key.into(),
            level: CellValue::Number(level),
        }
    }

    /// Crée un enregistrement depuis une cellule brute (variante tableur)
    pub fn parse(key: impl Into<String>, raw_level: &str) -> Self {
        Self {
            key: key.into(),
            level: CellValue::parse(raw_level),
        }
    }
}

/// Résultat de la jointure pour une feature, dans l'ordre d'entrée
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedFeature {
    /// Index de la feature dans la collection d'entrée
    pub index: usize,

    /// Valeur résolue (0.0 si non matchée)
    pub value: f64,

    /// La feature est-elle présente dans la table ?
    ///
    /// Porté explicitement pour distinguer « pas de donnée » d'un vrai zéro :
    /// la variante saisie manuelle produit des zéros légitimes.
    pub has_value: bool,
}

/// Descripteur de style d'une feature, recalculé à chaque passe de rendu
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleDescriptor {
    /// Couleur de remplissage issue de la classification
    pub fill_color: Color,

    /// Couleur du contour
    pub stroke_color: Color,

    /// Épaisseur du contour
    pub stroke_weight: f64,

    /// Opacité du remplissage, dans [0, 1]
    pub fill_opacity: f64,

    /// Paires (libellé, valeur) pour l'infobulle, dans l'ordre d'affichage
    pub tooltip_fields: Vec<(String, String)>,
}

/// Descripteur de légende exposé au collaborateur de rendu
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    /// Nom de la palette utilisée
    pub palette_name: String,

    /// Bornes des classes (n_classes + 1 valeurs croissantes)
    pub thresholds: Vec<f64>,

    /// Libellé de la légende
    pub caption: String,
}

/// Problème de qualité de données, récupéré localement (jamais fatal)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DataWarning {
    /// Niveau non numérique : ligne écartée de l'agrégation
    UnparsableLevel { key: String, raw: String },

    /// Jointure sur code demandée mais la feature n'a pas de code
    MissingCode { name: String },

    /// Code ne ressemblant pas à un code INSEE
    MalformedCode { name: String, code: String },
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnparsableLevel { key, raw } => {
                write!(f, "non-numeric level for '{key}': '{raw}' (row skipped)")
            }
            Self::MissingCode { name } => {
                write!(f, "feature '{name}' has no code (left unmatched)")
            }
            Self::MalformedCode { name, code } => {
                write!(f, "feature '{name}' has a malformed code '{code}'")
            }
        }
    }
}

/// Compteurs d'une passe de rendu
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    /// Nombre de features en entrée
    pub features: usize,

    /// Features matchées par la table
    pub matched: usize,

    /// Lignes de la table en entrée
    pub rows: usize,

    /// Lignes écartées (niveau non numérique)
    pub rows_dropped: usize,
}

/// Sortie complète d'une passe de rendu
///
/// Invariant : `styles.len() == joined.len() ==` nombre de features en
/// entrée (jointure gauche totale).
#[derive(Debug, Clone)]
pub struct RenderPass {
    /// Un descripteur de style par feature d'entrée, dans l'ordre
    pub styles: Vec<StyleDescriptor>,

    /// Légende à afficher
    pub legend: Legend,

    /// Échelle de classification construite pour cette passe
    pub scale: ClassificationScale,

    /// Valeurs jointes, dans l'ordre des features d'entrée
    pub joined: Vec<JoinedFeature>,

    /// Problèmes de qualité rencontrés (lignes écartées, codes absents…)
    pub warnings: Vec<DataWarning>,

    /// Compteurs de la passe
    pub stats: MatchStats,
}
