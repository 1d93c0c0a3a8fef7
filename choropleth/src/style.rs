//! Style par feature : couleur de remplissage, contour, infobulle

use crate::palette::Color;
use crate::scale::ClassificationScale;
use crate::transform::Transform;
use crate::types::{GeometryFeature, JoinedFeature, StyleDescriptor};

/// Contour d'une feature présente dans la table
const STROKE_PRESENT: Color = Color { r: 0x00, g: 0x00, b: 0x00 };
const WEIGHT_PRESENT: f64 = 1.0;
const OPACITY_PRESENT: f64 = 0.8;

/// Contour atténué d'une feature absente de la table (≠ valeur 0 présente)
const STROKE_MUTED: Color = Color { r: 0xcc, g: 0xcc, b: 0xcc };
const WEIGHT_MUTED: f64 = 0.3;
const OPACITY_MUTED: f64 = 0.3;

/// Construit le descripteur de style d'une feature jointe
///
/// Le remplissage vient de la classification de la valeur transformée.
/// L'absence de donnée (`has_value == false`) se voit au contour pâle et à
/// l'opacité réduite : elle est portée par le drapeau de présence, jamais
/// déduite de `value == 0` (la saisie manuelle produit de vrais zéros).
pub fn style(
    feature: &GeometryFeature,
    joined: &JoinedFeature,
    scale: &ClassificationScale,
    transform: Transform,
) -> StyleDescriptor {
    let fill_color = scale.classify(transform.apply(joined.value));
    let (stroke_color, stroke_weight, fill_opacity) = if joined.has_value {
        (STROKE_PRESENT, WEIGHT_PRESENT, OPACITY_PRESENT)
    } else {
        (STROKE_MUTED, WEIGHT_MUTED, OPACITY_MUTED)
    };

    let level_display = if joined.has_value {
        format_level(joined.value)
    } else {
        "—".to_string()
    };

    StyleDescriptor {
        fill_color,
        stroke_color,
        stroke_weight,
        fill_opacity,
        tooltip_fields: vec![
            ("Commune".to_string(), feature.name.clone()),
            ("Niveau".to_string(), level_display),
        ],
    }
}

/// Formate un niveau pour l'infobulle (entier sans décimales inutiles)
fn format_level(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::build_scale;
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
    fn test_present_feature_full_stroke() {
        let scale = build_scale(&[0.0, 100.0], 5, "YlOrRd").unwrap();
        let joined = JoinedFeature { index: 0, value: 100.0, has_value: true };
        let s = style(&feature("Strasbourg"), &joined, &scale, Transform::Identity);

        assert_eq!(s.stroke_color, STROKE_PRESENT);
        assert_eq!(s.stroke_weight, WEIGHT_PRESENT);
        assert_eq!(s.fill_opacity, OPACITY_PRESENT);
        assert_eq!(s.fill_color, scale.colors()[4]);
        assert_eq!(s.tooltip_fields[0], ("Commune".to_string(), "Strasbourg".to_string()));
        assert_eq!(s.tooltip_fields[1].1, "100");
    }

    #[test]
    fn test_absent_feature_muted() {
        let scale = build_scale(&[0.0, 100.0], 5, "YlOrRd").unwrap();
        let joined = JoinedFeature { index: 0, value: 0.0, has_value: false };
        let s = style(&feature("Obernai"), &joined, &scale, Transform::Identity);

        assert_eq!(s.stroke_color, STROKE_MUTED);
        assert_eq!(s.stroke_weight, WEIGHT_MUTED);
        assert_eq!(s.fill_opacity, OPACITY_MUTED);
        // remplissage correspondant à la valeur 0, pas de couleur spéciale
        assert_eq!(s.fill_color, scale.classify(0.0));
        assert_eq!(s.tooltip_fields[1].1, "—");
    }

    #[test]
    fn test_genuine_zero_differs_from_absence_by_stroke_only() {
        let scale = build_scale(&[0.0, 100.0], 5, "YlOrRd").unwrap();
        let zero = JoinedFeature { index: 0, value: 0.0, has_value: true };
        let absent = JoinedFeature { index: 0, value: 0.0, has_value: false };
        let s_zero = style(&feature("A"), &zero, &scale, Transform::Identity);
        let s_absent = style(&feature("A"), &absent, &scale, Transform::Identity);

        assert_eq!(s_zero.fill_color, s_absent.fill_color);
        assert_ne!(s_zero.stroke_color, s_absent.stroke_color);
        assert_ne!(s_zero.fill_opacity, s_absent.fill_opacity);
    }

    #[test]
    fn test_fill_uses_transformed_value() {
        // domaine transformé log1p de [0, 1000]
        let transformed: Vec<f64> = [0.0, 1000.0]
            .iter()
            .map(|v| Transform::Log1p.apply(*v))
            .collect();
        let scale = build_scale(&transformed, 2, "Blues").unwrap();
        let joined = JoinedFeature { index: 0, value: 1000.0, has_value: true };
        let s = style(&feature("A"), &joined, &scale, Transform::Log1p);
        assert_eq!(s.fill_color, scale.colors()[1]);
    }

    #[test]
    fn test_format_level() {
        assert_eq!(format_level(42.0), "42");
        assert_eq!(format_level(3.5), "3.5");
        assert_eq!(format_level(0.0), "0");
    }
}
