//! Export du rendu en GeoJSON stylé (streaming avec geozero)
//!
//! Les propriétés de style par feature (`fillColor`, `color`, `weight`,
//! `fillOpacity`) suivent les clés attendues par les bibliothèques de rendu
//! cartographique côté client.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

use choropleth::{GeometryFeature, Legend, RenderPass};

/// Exporte une passe de rendu en FeatureCollection stylée
///
/// Une feature de sortie par feature d'entrée, dans l'ordre (la passe
/// garantit `styles.len() == features.len()`).
pub fn export_styled(
    features: &[GeometryFeature],
    pass: &RenderPass,
    output_path: &Path,
) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write!(writer, r#"{{"type":"FeatureCollection","features":["#)?;

    for (i, feature) in features.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(&mut writer, feature, pass, i)?;
    }

    write!(writer, "]}}")?;
    writer.flush()?;

    Ok(())
}

/// Écrit la légende en JSON
pub fn export_legend(legend: &Legend, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create file: {}", output_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), legend)
        .with_context(|| format!("Failed to write legend: {}", output_path.display()))?;
    Ok(())
}

/// Écrit une feature stylée
fn write_feature<W: Write>(
    writer: &mut W,
    feature: &GeometryFeature,
    pass: &RenderPass,
    index: usize,
) -> Result<()> {
    let joined = &pass.joined[index];
    let style = &pass.styles[index];

    write!(
        writer,
        r#"{{"type":"Feature","id":"{}","#,
        escape_json(&feature.id)
    )?;

    // Géométrie via geozero (streaming, sans arbre intermédiaire)
    write!(writer, r#""geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    feature.boundary.process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    // Propriétés : données puis style
    write!(
        writer,
        r#","properties":{{"nom":"{}""#,
        escape_json(&feature.name)
    )?;
    if let Some(code) = &feature.code {
        write!(writer, r#","code":"{}""#, escape_json(code))?;
    }
    write!(
        writer,
        r#","valeur":{},"donnee":{}"#,
        joined.value, joined.has_value
    )?;
    write!(
        writer,
        r#","fillColor":"{}","color":"{}","weight":{},"fillOpacity":{}}}}}"#,
        style.fill_color, style.stroke_color, style.stroke_weight, style.fill_opacity
    )?;

    Ok(())
}

/// Échappe une chaîne pour JSON
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}
