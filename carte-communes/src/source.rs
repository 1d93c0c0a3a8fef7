//! Chargement des sources de géométries (GeoJSON de communes)
//!
//! Une source est chargée une seule fois par identifiant puis partagée en
//! lecture seule : le cache mémoïsé est la seule étape qui peut bloquer,
//! tout le reste du pipeline est pur.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use anyhow::{anyhow, Context, Result};
use geojson::GeoJson;
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, info, warn};

use choropleth::{canonicalize_code, DataWarning, GeometryFeature};

/// Cache mémoïsé des sources de géométries, indexé par chemin canonique
///
/// La collection chargée est immuable ; des appelants concurrents partagent
/// le même `Arc` sans copie.
#[derive(Default)]
pub struct SourceCache {
    inner: Mutex<HashMap<PathBuf, Arc<Vec<GeometryFeature>>>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retourne la source, depuis le cache si elle a déjà été chargée
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Vec<GeometryFeature>>> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if let Some(found) = self.inner.lock().unwrap().get(&key) {
            debug!(path = %key.display(), "source géométrique en cache");
            return Ok(Arc::clone(found));
        }

        // Chargement hors verrou : la lecture disque peut bloquer
        let features = Arc::new(load_file(path)?);
        let mut guard = self.inner.lock().unwrap();
        let entry = guard.entry(key).or_insert_with(|| Arc::clone(&features));
        Ok(Arc::clone(entry))
    }

    /// Charge plusieurs sources en parallèle et les fusionne dans l'ordre donné
    ///
    /// Les codes dupliqués entre sources restent des features distinctes :
    /// la déduplication n'est pas automatique, c'est une limite connue.
    pub fn load_merged(&self, paths: &[PathBuf]) -> Result<Vec<GeometryFeature>> {
        let sources: Vec<Arc<Vec<GeometryFeature>>> = paths
            .par_iter()
            .map(|path| self.get_or_load(path))
            .collect::<Result<_>>()?;

        let merged: Vec<GeometryFeature> = sources
            .iter()
            .flat_map(|source| source.iter().cloned())
            .collect();
        info!(
            sources = paths.len(),
            features = merged.len(),
            "géométries chargées"
        );
        Ok(merged)
    }
}

/// Parse un fichier GeoJSON en features nommées/codées
fn load_file(path: &Path) -> Result<Vec<GeometryFeature>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Lecture impossible : {}", path.display()))?;
    let geojson: GeoJson = text
        .parse()
        .with_context(|| format!("GeoJSON invalide : {}", path.display()))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(anyhow!(
                "{} : FeatureCollection attendue",
                path.display()
            ))
        }
    };

    let mut features = Vec::with_capacity(collection.features.len());
    for (i, mut feature) in collection.features.into_iter().enumerate() {
        let name = property_string(&feature, "nom")
            .or_else(|| property_string(&feature, "name"))
            .unwrap_or_else(|| format!("feature-{i}"));
        let code = property_string(&feature, "code").map(|c| canonicalize_code(&c));

        let geometry = feature
            .geometry
            .take()
            .ok_or_else(|| anyhow!("feature '{name}' sans géométrie dans {}", path.display()))?;
        let boundary = geo::Geometry::try_from(geometry)
            .with_context(|| format!("géométrie invalide pour '{name}'"))?;

        let id = match feature.id {
            Some(geojson::feature::Id::String(s)) => s,
            Some(geojson::feature::Id::Number(n)) => n.to_string(),
            None => code.clone().unwrap_or_else(|| name.clone()),
        };

        features.push(GeometryFeature {
            id,
            name,
            code,
            boundary,
        });
    }

    debug!(path = %path.display(), features = features.len(), "source parsée");
    Ok(features)
}

/// Lit une propriété comme chaîne (les codes arrivent parfois en nombre)
fn property_string(feature: &geojson::Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Codes communaux INSEE : 5 chiffres, ou 2A/2B + 3 chiffres pour la Corse
fn insee_code() -> &'static Regex {
    static INSEE_CODE: OnceLock<Regex> = OnceLock::new();
    INSEE_CODE.get_or_init(|| Regex::new(r"^(?:\d{5}|2[AB]\d{3})$").unwrap())
}

/// Vérifie la forme des codes avant une jointure sur code
///
/// Un code mal formé n'empêche pas le rendu (la feature restera simplement
/// non matchée), mais il est signalé pour que l'entrée soit corrigeable.
pub fn check_codes(features: &[GeometryFeature]) -> Vec<DataWarning> {
    let re = insee_code();
    let mut warnings = Vec::new();
    for feature in features {
        if let Some(code) = &feature.code {
            if !re.is_match(code) {
                warn!(name = %feature.name, code = %code, "code INSEE mal formé");
                warnings.push(DataWarning::MalformedCode {
                    name: feature.name.clone(),
                    code: code.clone(),
                });
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Geometry};
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"nom": "Strasbourg", "code": "67482"},
                "geometry": {"type": "Polygon", "coordinates": [[[7.68, 48.53], [7.84, 48.53], [7.84, 48.65], [7.68, 48.53]]]}
            },
            {
                "type": "Feature",
                "properties": {"nom": "Colmar", "code": 68066},
                "geometry": {"type": "Polygon", "coordinates": [[[7.3, 48.0], [7.4, 48.0], [7.4, 48.1], [7.3, 48.0]]]}
            }
        ]
    }"#;

    fn write_temp(tag: &str, content: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "carte-communes-test-{}-{tag}.geojson",
            std::process::id()
        ));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_file_reads_names_and_codes() {
        let path = write_temp("load", SAMPLE);
        let features = load_file(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(features.len(), 2);
        assert_eq!(features[0].name, "Strasbourg");
        assert_eq!(features[0].code.as_deref(), Some("67482"));
        // code numérique dans le JSON : converti en chaîne
        assert_eq!(features[1].code.as_deref(), Some("68066"));
        assert!(matches!(features[0].boundary, Geometry::Polygon(_)));
    }

    #[test]
    fn test_cache_returns_same_collection() {
        let path = write_temp("cache", SAMPLE);
        let cache = SourceCache::new();
        let a = cache.get_or_load(&path).unwrap();
        let b = cache.get_or_load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_check_codes_flags_malformed() {
        let square = Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 0.0, y: 1.0),
        ]);
        let features = vec![
            GeometryFeature {
                id: "1".into(),
                name: "Bonne".into(),
                code: Some("67482".into()),
                boundary: square.clone(),
            },
            GeometryFeature {
                id: "2".into(),
                name: "Corse".into(),
                code: Some("2A004".into()),
                boundary: square.clone(),
            },
            GeometryFeature {
                id: "3".into(),
                name: "Louche".into(),
                code: Some("674".into()),
                boundary: square,
            },
        ];
        let warnings = check_codes(&features);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            DataWarning::MalformedCode { name, .. } if name == "Louche"
        ));
    }
}
