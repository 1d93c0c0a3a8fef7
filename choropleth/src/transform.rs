//! Transformation monotone des valeurs avant classification

use std::str::FromStr;

use crate::error::ChoroplethError;

/// Transformation appliquée aux valeurs résolues avant le calcul d'échelle
///
/// `Log1p` compresse les distributions à queue lourde (quelques communes à
/// très grande valeur) pour que l'échelle reste discriminante sur la masse
/// des petites valeurs. La transformation est monotone : elle ne change pas
/// l'ordre des classes, seulement l'espacement visuel des seuils.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transform {
    /// Valeur inchangée
    #[default]
    Identity,
    /// `ln(1 + x)`, définie pour `x ≥ -1`
    Log1p,
}

impl Transform {
    /// Applique la transformation
    ///
    /// Pour `Log1p`, les entrées sous -1 sont ramenées juste au-dessus de la
    /// borne pour que le résultat reste fini.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Identity => value,
            Self::Log1p => value.max(-1.0 + f64::EPSILON).ln_1p(),
        }
    }
}

impl FromStr for Transform {
    type Err = ChoroplethError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "none" => Ok(Self::Identity),
            "log1p" | "log" => Ok(Self::Log1p),
            _ => Err(ChoroplethError::UnknownTransform(s.to_string())),
        }
    }
}
