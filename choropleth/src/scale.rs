//! Classification : domaine, seuils à largeur égale, couleurs par classe

use serde::Serialize;

use crate::error::ChoroplethError;
use crate::palette::{palette, Color};
use crate::types::Legend;

/// Échelle de classification par paliers (pas de dégradé continu)
///
/// Invariants : `thresholds` contient `n_classes + 1` bornes croissantes
/// couvrant `[domain_min, domain_max]` ; `colors` contient une couleur par
/// classe. Un domaine dégénéré (min == max) donne une échelle mono-couleur,
/// jamais une division par zéro.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationScale {
    pub domain_min: f64,
    pub domain_max: f64,
    pub n_classes: usize,
    pub palette_name: String,
    pub thresholds: Vec<f64>,
    colors: Vec<Color>,
}

/// Construit une échelle à `n_classes` paliers de largeur égale
///
/// Le domaine est le (min, max) des valeurs finies — déjà transformées par
/// l'appelant — ou (0, 0) si la séquence est vide. Les couleurs de classe
/// échantillonnent la rampe en `i / (n_classes - 1)`, comme le `to_step`
/// de branca.
///
/// # Errors
///
/// `InvalidClassCount` si `n_classes < 2`, `UnknownPalette` si le nom ne
/// figure pas dans la table des palettes.
pub fn build_scale(
    values: &[f64],
    n_classes: usize,
    palette_name: &str,
) -> Result<ClassificationScale, ChoroplethError> {
    if n_classes < 2 {
        return Err(ChoroplethError::InvalidClassCount(n_classes));
    }
    let ramp = palette(palette_name)?;

    let mut domain_min = f64::INFINITY;
    let mut domain_max = f64::NEG_INFINITY;
    for v in values.iter().copied().filter(|v| v.is_finite()) {
        domain_min = domain_min.min(v);
        domain_max = domain_max.max(v);
    }
    if domain_min > domain_max {
        // Séquence vide : domaine (0, 0), traité comme dégénéré
        domain_min = 0.0;
        domain_max = 0.0;
    }

    let width = (domain_max - domain_min) / n_classes as f64;
    let thresholds: Vec<f64> = (0..=n_classes)
        .map(|i| {
            if i == n_classes {
                domain_max // borne haute exacte, sans erreur d'arrondi
            } else {
                domain_min + width * i as f64
            }
        })
        .collect();

    let colors: Vec<Color> = (0..n_classes)
        .map(|i| ramp.sample(i as f64 / (n_classes - 1) as f64))
        .collect();

    Ok(ClassificationScale {
        domain_min,
        domain_max,
        n_classes,
        palette_name: palette_name.to_string(),
        thresholds,
        colors,
    })
}

impl ClassificationScale {
    /// Couleur de la classe dans laquelle tombe `value`
    ///
    /// `value ≤ domain_min` → première classe, `value ≥ domain_max` →
    /// dernière classe. Sur un domaine dégénéré, toutes les valeurs
    /// reçoivent la même couleur représentative (première classe).
    pub fn classify(&self, value: f64) -> Color {
        let span = self.domain_max - self.domain_min;
        if !(span > 0.0) {
            return self.colors[0];
        }
        if value <= self.domain_min {
            return self.colors[0];
        }
        if value >= self.domain_max {
            return self.colors[self.n_classes - 1];
        }
        let idx = ((value - self.domain_min) / span * self.n_classes as f64) as usize;
        self.colors[idx.min(self.n_classes - 1)]
    }

    /// Couleurs des classes, de la plus basse à la plus haute
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Descripteur de légende pour l'affichage
    pub fn legend(&self, caption: &str) -> Legend {
        Legend {
            palette_name: self.palette_name.clone(),
            thresholds: self.thresholds.clone(),
            caption: caption.to_string(),
        }
    }
}
