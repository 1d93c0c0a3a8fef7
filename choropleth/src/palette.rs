//! Palettes de couleurs (rampes ColorBrewer séquentielles, 9 paliers)
//!
//! Table statique immuable construite une fois pour toutes : la résolution
//! d'une palette par nom passe par une recherche explicite qui retourne une
//! erreur typée, jamais par un accès dynamique qui échouerait en silence.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::ChoroplethError;

/// Couleur RGB 8 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Parse une couleur `#rrggbb` (le `#` est optionnel)
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        let bytes = hex::decode(digits).ok()?;
        match bytes.as_slice() {
            [r, g, b] => Some(Self {
                r: *r,
                g: *g,
                b: *b,
            }),
            _ => None,
        }
    }

    /// Forme `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{}", hex::encode([self.r, self.g, self.b]))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

const fn c(r: u8, g: u8, b: u8) -> Color {
    Color { r, g, b }
}

/// Rampe séquentielle de 9 paliers
#[derive(Debug, Clone, Copy)]
pub struct ColorRamp {
    /// Nom exposé aux appelants (ex : "YlOrRd")
    pub name: &'static str,
    stops: [Color; 9],
}

impl ColorRamp {
    /// Échantillonne la rampe en `t ∈ [0, 1]` (interpolation linéaire RGB
    /// entre paliers, équivalent des rampes `linear.<P>_09` de branca)
    pub fn sample(&self, t: f64) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let pos = t * (self.stops.len() - 1) as f64;
        let i = (pos.floor() as usize).min(self.stops.len() - 2);
        let frac = pos - i as f64;
        let a = self.stops[i];
        let b = self.stops[i + 1];
        Color {
            r: lerp(a.r, b.r, frac),
            g: lerp(a.g, b.g, frac),
            b: lerp(a.b, b.b, frac),
        }
    }

    pub fn stops(&self) -> &[Color] {
        &self.stops
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
}

/// Les neuf palettes disponibles (ColorBrewer, 9 classes)
pub static PALETTES: [ColorRamp; 9] = [
    ColorRamp {
        name: "YlOrRd",
        stops: [
            c(0xff, 0xff, 0xcc),
            c(0xff, 0xed, 0xa0),
            c(0xfe, 0xd9, 0x76),
            c(0xfe, 0xb2, 0x4c),
            c(0xfd, 0x8d, 0x3c),
            c(0xfc, 0x4e, 0x2a),
            c(0xe3, 0x1a, 0x1c),
            c(0xbd, 0x00, 0x26),
            c(0x80, 0x00, 0x26),
        ],
    },
    ColorRamp {
        name: "YlGnBu",
        stops: [
            c(0xff, 0xff, 0xd9),
            c(0xed, 0xf8, 0xb1),
            c(0xc7, 0xe9, 0xb4),
            c(0x7f, 0xcd, 0xbb),
            c(0x41, 0xb6, 0xc4),
            c(0x1d, 0x91, 0xc0),
            c(0x22, 0x5e, 0xa8),
            c(0x25, 0x34, 0x94),
            c(0x08, 0x1d, 0x58),
        ],
    },
    ColorRamp {
        name: "OrRd",
        stops: [
            c(0xff, 0xf7, 0xec),
            c(0xfe, 0xe8, 0xc8),
            c(0xfd, 0xd4, 0x9e),
            c(0xfd, 0xbb, 0x84),
            c(0xfc, 0x8d, 0x59),
            c(0xef, 0x65, 0x48),
            c(0xd7, 0x30, 0x1f),
            c(0xb3, 0x00, 0x00),
            c(0x7f, 0x00, 0x00),
        ],
    },
    ColorRamp {
        name: "PuBuGn",
        stops: [
            c(0xff, 0xf7, 0xfb),
            c(0xec, 0xe2, 0xf0),
            c(0xd0, 0xd1, 0xe6),
            c(0xa6, 0xbd, 0xdb),
            c(0x67, 0xa9, 0xcf),
            c(0x36, 0x90, 0xc0),
            c(0x02, 0x81, 0x8a),
            c(0x01, 0x6c, 0x59),
            c(0x01, 0x46, 0x36),
        ],
    },
    ColorRamp {
        name: "BuPu",
        stops: [
            c(0xf7, 0xfc, 0xfd),
            c(0xe0, 0xec, 0xf4),
            c(0xbf, 0xd3, 0xe6),
            c(0x9e, 0xbc, 0xda),
            c(0x8c, 0x96, 0xc6),
            c(0x8c, 0x6b, 0xb1),
            c(0x88, 0x41, 0x9d),
            c(0x81, 0x0f, 0x7c),
            c(0x4d, 0x00, 0x4b),
        ],
    },
    ColorRamp {
        name: "Greens",
        stops: [
            c(0xf7, 0xfc, 0xf5),
            c(0xe5, 0xf5, 0xe0),
            c(0xc7, 0xe9, 0xc0),
            c(0xa1, 0xd9, 0x9b),
            c(0x74, 0xc4, 0x76),
            c(0x41, 0xab, 0x5d),
            c(0x23, 0x8b, 0x45),
            c(0x00, 0x6d, 0x2c),
            c(0x00, 0x44, 0x1b),
        ],
    },
    ColorRamp {
        name: "Blues",
        stops: [
            c(0xf7, 0xfb, 0xff),
            c(0xde, 0xeb, 0xf7),
            c(0xc6, 0xdb, 0xef),
            c(0x9e, 0xca, 0xe1),
            c(0x6b, 0xae, 0xd6),
            c(0x42, 0x92, 0xc6),
            c(0x21, 0x71, 0xb5),
            c(0x08, 0x51, 0x9c),
            c(0x08, 0x30, 0x6b),
        ],
    },
    ColorRamp {
        name: "Reds",
        stops: [
            c(0xff, 0xf5, 0xf0),
            c(0xfe, 0xe0, 0xd2),
            c(0xfc, 0xbb, 0xa1),
            c(0xfc, 0x92, 0x72),
            c(0xfb, 0x6a, 0x4a),
            c(0xef, 0x3b, 0x2c),
            c(0xcb, 0x18, 0x1d),
            c(0xa5, 0x0f, 0x15),
            c(0x67, 0x00, 0x0d),
        ],
    },
    ColorRamp {
        name: "Purples",
        stops: [
            c(0xfc, 0xfb, 0xfd),
            c(0xef, 0xed, 0xf5),
            c(0xda, 0xda, 0xeb),
            c(0xbc, 0xbd, 0xdc),
            c(0x9e, 0x9a, 0xc8),
            c(0x80, 0x7d, 0xba),
            c(0x6a, 0x51, 0xa3),
            c(0x54, 0x27, 0x8f),
            c(0x3f, 0x00, 0x7d),
        ],
    },
];

/// Résout une palette par son nom
///
/// Un nom inconnu est une erreur de configuration ([`ChoroplethError::UnknownPalette`]),
/// pas un repli silencieux : une palette hors liste signale une mauvaise
/// utilisation par l'appelant.
pub fn palette(name: &str) -> Result<&'static ColorRamp, ChoroplethError> {
    PALETTES
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| ChoroplethError::unknown_palette(name))
}

/// Noms des palettes disponibles, dans l'ordre de la table
pub fn names() -> Vec<&'static str> {
    PALETTES.iter().map(|p| p.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_round_trip() {
        let c = Color::from_hex("#08306b").unwrap();
        assert_eq!(c, Color { r: 8, g: 48, b: 107 });
        assert_eq!(c.to_hex(), "#08306b");
        assert_eq!(Color::from_hex("ffffff").unwrap().to_hex(), "#ffffff");
        assert!(Color::from_hex("#xyz").is_none());
        assert!(Color::from_hex("#ffff").is_none());
    }

    #[test]
    fn test_palette_lookup() {
        assert!(palette("Blues").is_ok());
        let err = palette("Viridis").unwrap_err();
        match err {
            ChoroplethError::UnknownPalette { name, available } => {
                assert_eq!(name, "Viridis");
                assert!(available.contains("Blues"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sample_endpoints() {
        let ramp = palette("Blues").unwrap();
        assert_eq!(ramp.sample(0.0), ramp.stops()[0]);
        assert_eq!(ramp.sample(1.0), ramp.stops()[8]);
        // hors bornes : clampé
        assert_eq!(ramp.sample(-3.0), ramp.stops()[0]);
        assert_eq!(ramp.sample(7.0), ramp.stops()[8]);
    }

    #[test]
    fn test_sample_interpolates() {
        let ramp = palette("Blues").unwrap();
        let mid = ramp.sample(0.5);
        assert_eq!(mid, ramp.stops()[4]); // t = 0.5 tombe pile sur le palier central
    }

    #[test]
    fn test_all_palettes_have_distinct_names() {
        let names = names();
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(names.len(), 9);
    }
}
