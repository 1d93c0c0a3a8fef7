//! Normalisation des clés de jointure
//!
//! La comparaison nom de commune ↔ clé de la table passe obligatoirement par
//! [`NormalizedKey`] : le joiner et l'agrégateur n'acceptent que cette forme,
//! ce qui empêche structurellement de normaliser un seul côté.

use std::fmt;

/// Forme canonique d'une clé de jointure (trim + casse pliée)
///
/// Deux clés brutes désignent la même entité si et seulement si leurs
/// `NormalizedKey` sont égales. Pas de suppression d'accents ni de
/// correspondance floue : un nom accentué différemment ne matche pas,
/// c'est une limite assumée.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// Normalise une clé brute : trim des espaces, minuscules Unicode
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalise une clé brute (nom de commune, clé de table)
pub fn normalize(raw: &str) -> NormalizedKey {
    NormalizedKey::new(raw)
}

/// Canonicalise un code INSEE pour l'affichage et la validation
///
/// Trim + majuscules ASCII ("2a004" → "2A004"). Les zéros de tête sont
/// préservés : les codes se comparent comme des chaînes, jamais comme des
/// nombres. Pour la jointure, les codes passent par [`normalize`] comme les
/// noms (le pliage de casse est sans effet sur les chiffres et fait
/// coïncider 2A/2a des deux côtés).
pub fn canonicalize_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trim_and_casefold() {
        assert_eq!(normalize("  Strasbourg "), normalize("strasbourg"));
        assert_eq!(normalize("COLMAR"), normalize("Colmar"));
        assert_ne!(normalize("Sélestat"), normalize("Selestat")); // pas de pliage d'accents
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize("  Haut-Rhin  ");
        let twice = normalize(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_canonicalize_code_preserves_leading_zeros() {
        assert_eq!(canonicalize_code(" 67482 "), "67482");
        assert_eq!(canonicalize_code("01004"), "01004");
        assert_eq!(canonicalize_code("2a004"), "2A004");
    }

    #[test]
    fn test_codes_agree_under_normalize() {
        // La jointure sur code utilise normalize des deux côtés
        assert_eq!(normalize("2A004"), normalize(" 2a004 "));
    }
}
