//! Lecture de la table de valeurs (CSV type tableur)
//!
//! Politique tolérante : délimiteur `;` ou `,` détecté sur l'en-tête,
//! cellules entre guillemets, encodage UTF-8 (validation SIMD) avec repli
//! Windows-1252 pour les exports Excel français. Les cellules de niveau non
//! numériques ne sont pas filtrées ici : elles passent telles quelles et
//! c'est l'agrégateur qui les écarte ligne par ligne.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use memchr::{memchr, memchr_iter};
use tracing::debug;

use choropleth::{normalize, ChoroplethError, ValueRecord};

/// Lit une table CSV et produit les enregistrements bruts
///
/// # Errors
///
/// [`ChoroplethError::MissingColumn`] si une des colonnes requises est
/// absente de l'en-tête : erreur de configuration, fatale, avec le nom de
/// la colonne attendue.
pub fn read_table(path: &Path, key_column: &str, level_column: &str) -> Result<Vec<ValueRecord>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Lecture impossible : {}", path.display()))?;
    let text = decode(&bytes);
    parse_table(&text, key_column, level_column)
}

/// Décode UTF-8 (simdutf8) avec repli Windows-1252
fn decode(bytes: &[u8]) -> String {
    match simdutf8::basic::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Parse le texte CSV décodé
fn parse_table(text: &str, key_column: &str, level_column: &str) -> Result<Vec<ValueRecord>> {
    let mut lines = text.lines();

    let header = loop {
        match lines.next() {
            Some(line) if line.trim().is_empty() => continue,
            Some(line) => break line.trim_start_matches('\u{feff}'),
            None => return Err(ChoroplethError::missing_column(key_column).into()),
        }
    };

    let delim = detect_delimiter(header);
    let columns = split_fields(header, delim);
    let key_idx = find_column(&columns, key_column)
        .ok_or_else(|| ChoroplethError::missing_column(key_column))?;
    let level_idx = find_column(&columns, level_column)
        .ok_or_else(|| ChoroplethError::missing_column(level_column))?;

    let mut records = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_fields(line, delim);
        let key = fields.get(key_idx).map(String::as_str).unwrap_or("");
        if key.trim().is_empty() {
            continue;
        }
        let level = fields.get(level_idx).map(String::as_str).unwrap_or("");
        records.push(ValueRecord::parse(key, level));
    }

    debug!(rows = records.len(), "table de valeurs lue");
    Ok(records)
}

/// Délimiteur le plus fréquent dans l'en-tête (`;` des exports français, sinon `,`)
fn detect_delimiter(header: &str) -> u8 {
    let semicolons = memchr_iter(b';', header.as_bytes()).count();
    let commas = memchr_iter(b',', header.as_bytes()).count();
    if semicolons >= commas && semicolons > 0 {
        b';'
    } else {
        b','
    }
}

/// Découpe une ligne en cellules
fn split_fields(line: &str, delim: u8) -> Vec<String> {
    let bytes = line.as_bytes();

    // Cas rapide sans guillemets : découpe directe par memchr
    if memchr(b'"', bytes).is_none() {
        let mut fields = Vec::new();
        let mut start = 0;
        for pos in memchr_iter(delim, bytes) {
            fields.push(clean_field(&line[start..pos]));
            start = pos + 1;
        }
        fields.push(clean_field(&line[start..]));
        return fields;
    }

    // Sinon, balayage avec état guillemets
    let mut fields = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b if *b == delim && !in_quotes => {
                fields.push(clean_field(&line[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(clean_field(&line[start..]));
    fields
}

/// Trim + déquote une cellule (`"aa ""bb"""` → `aa "bb"`)
fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].replace("\"\"", "\"")
    } else {
        trimmed.to_string()
    }
}

/// Localise une colonne par nom, insensible à la casse et aux espaces
fn find_column(columns: &[String], wanted: &str) -> Option<usize> {
    let wanted = normalize(wanted);
    columns.iter().position(|c| normalize(c) == wanted)
}
