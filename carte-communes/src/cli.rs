//! Définition et implémentation des commandes CLI
//!
//! CLI simplifiée :
//! - `render` : table de valeurs + GeoJSON communes → GeoJSON stylé + légende
//! - `check` : contrôle à blanc des correspondances, aucun fichier écrit

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use tracing::{info, warn};

use choropleth::{
    normalize, AggregatePolicy, MatchField, NormalizedKey, PipelineParams, Transform, ValueRecord,
};

use crate::export;
use crate::report::RenderReport;
use crate::source::{self, SourceCache};
use crate::table;

#[derive(Subcommand)]
pub enum Commands {
    /// Rendu choroplèthe : écrit un GeoJSON stylé (et une légende)
    Render(RenderArgs),

    /// Contrôle des correspondances table ↔ communes, sans rien écrire
    Check(CheckArgs),
}

#[derive(Args)]
pub struct RenderArgs {
    /// Fichiers GeoJSON des communes (fusionnés dans l'ordre donné)
    #[arg(short, long = "geojson", required = true, num_args = 1..)]
    pub geojson: Vec<PathBuf>,

    /// Table de valeurs CSV (colonnes Ville/Niveau par défaut)
    #[arg(short, long)]
    pub table: Option<PathBuf>,

    /// Valeur manuelle NOM=NIVEAU (répétable, cumulable avec --table)
    #[arg(long = "set", value_name = "NOM=NIVEAU")]
    pub set: Vec<String>,

    /// Colonne des clés dans la table
    #[arg(long, default_value = "Ville")]
    pub key_column: String,

    /// Colonne des niveaux dans la table
    #[arg(long, default_value = "Niveau")]
    pub level_column: String,

    /// Palette de couleurs
    #[arg(short, long, default_value = "YlOrRd")]
    pub palette: String,

    /// Nombre de classes (minimum 2)
    #[arg(short = 'n', long, default_value_t = 10)]
    pub classes: usize,

    /// Politique d'agrégation des clés dupliquées (max, sum, first, mean)
    #[arg(long, default_value = "max")]
    pub policy: AggregatePolicy,

    /// Transformation avant classification (identity, log1p)
    #[arg(long, default_value = "identity")]
    pub transform: Transform,

    /// Champ de jointure (name, code)
    #[arg(long = "match", default_value = "name")]
    pub match_field: MatchField,

    /// Libellé de la légende
    #[arg(long, default_value = "Niveau")]
    pub caption: String,

    /// Fichier GeoJSON stylé en sortie
    #[arg(short, long, default_value = "styled.geojson")]
    pub output: PathBuf,

    /// Écrire la légende JSON ici
    #[arg(long)]
    pub legend: Option<PathBuf>,

    /// Écrire le rapport JSON ici
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Fichiers GeoJSON des communes
    #[arg(short, long = "geojson", required = true, num_args = 1..)]
    pub geojson: Vec<PathBuf>,

    /// Table de valeurs CSV
    #[arg(short, long)]
    pub table: PathBuf,

    /// Colonne des clés dans la table
    #[arg(long, default_value = "Ville")]
    pub key_column: String,

    /// Colonne des niveaux dans la table
    #[arg(long, default_value = "Niveau")]
    pub level_column: String,

    /// Politique d'agrégation des clés dupliquées
    #[arg(long, default_value = "max")]
    pub policy: AggregatePolicy,

    /// Champ de jointure (name, code)
    #[arg(long = "match", default_value = "name")]
    pub match_field: MatchField,

    /// Écrire le rapport JSON ici
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Rendu complet : pipeline + exports + rapport
pub fn cmd_render(args: RenderArgs) -> Result<()> {
    let start = Instant::now();

    let cache = SourceCache::new();
    let features = cache.load_merged(&args.geojson)?;
    let records = collect_records(args.table.as_deref(), &args.set, &args.key_column, &args.level_column)?;

    let code_warnings = if args.match_field == MatchField::Code {
        source::check_codes(&features)
    } else {
        Vec::new()
    };

    let params = PipelineParams {
        match_field: args.match_field,
        policy: args.policy,
        transform: args.transform,
        palette_name: args.palette.clone(),
        n_classes: args.classes,
        caption: args.caption.clone(),
    };
    let pass = choropleth::run(&features, &records, &params)?;

    export::geojson::export_styled(&features, &pass, &args.output)
        .with_context(|| format!("Échec de l'export vers {}", args.output.display()))?;
    info!(output = %args.output.display(), "GeoJSON stylé écrit");

    if let Some(legend_path) = &args.legend {
        export::geojson::export_legend(&pass.legend, legend_path)?;
        info!(legend = %legend_path.display(), "légende écrite");
    }

    let report = RenderReport::build(&features, &pass, &code_warnings, start.elapsed());
    report.print_summary();
    if let Some(report_path) = &args.report {
        report.write_json(report_path)?;
        info!(report = %report_path.display(), "rapport écrit");
    }

    Ok(())
}

/// Contrôle à blanc : mêmes étapes, statistiques seulement
pub fn cmd_check(args: CheckArgs) -> Result<()> {
    let start = Instant::now();

    let cache = SourceCache::new();
    let features = cache.load_merged(&args.geojson)?;
    let records = table::read_table(&args.table, &args.key_column, &args.level_column)?;

    let code_warnings = if args.match_field == MatchField::Code {
        source::check_codes(&features)
    } else {
        Vec::new()
    };

    let params = PipelineParams {
        match_field: args.match_field,
        policy: args.policy,
        ..PipelineParams::default()
    };
    let pass = choropleth::run(&features, &records, &params)?;

    // Clés de la table sans commune correspondante (l'inverse des communes
    // sans donnée, que le rapport couvre déjà)
    let (aggregated, _) = choropleth::aggregate(&records, args.policy);
    let feature_keys: HashSet<NormalizedKey> = features
        .iter()
        .filter_map(|f| match args.match_field {
            MatchField::Name => Some(normalize(&f.name)),
            MatchField::Code => f.code.as_deref().map(normalize),
        })
        .collect();
    let mut orphan_keys: Vec<String> = aggregated
        .keys()
        .filter(|k| !feature_keys.contains(*k))
        .map(ToString::to_string)
        .collect();
    orphan_keys.sort();

    let report = RenderReport::build(&features, &pass, &code_warnings, start.elapsed());
    report.print_summary();

    if !orphan_keys.is_empty() {
        warn!(
            count = orphan_keys.len(),
            "clés de la table sans commune correspondante"
        );
        for key in &orphan_keys {
            info!(key = %key, "clé orpheline");
        }
    }
    for name in &report.unmatched_names {
        info!(commune = %name, "commune sans donnée");
    }

    if let Some(report_path) = &args.report {
        report.write_json(report_path)?;
        info!(report = %report_path.display(), "rapport écrit");
    }

    Ok(())
}

/// Assemble la table de valeurs depuis le CSV et/ou les valeurs manuelles
fn collect_records(
    table_path: Option<&std::path::Path>,
    manual: &[String],
    key_column: &str,
    level_column: &str,
) -> Result<Vec<ValueRecord>> {
    let mut records = Vec::new();

    if let Some(path) = table_path {
        records.extend(table::read_table(path, key_column, level_column)?);
    }
    for pair in manual {
        records.push(parse_manual(pair)?);
    }

    if records.is_empty() {
        bail!("Aucune source de valeurs : fournir --table et/ou --set NOM=NIVEAU");
    }
    Ok(records)
}

/// Parse une valeur manuelle `NOM=NIVEAU` (état des curseurs de l'UI)
fn parse_manual(pair: &str) -> Result<ValueRecord> {
    let Some((name, level)) = pair.split_once('=') else {
        bail!("Valeur manuelle invalide '{pair}' : format attendu NOM=NIVEAU");
    };
    let level: f64 = level
        .trim()
        .parse()
        .with_context(|| format!("Niveau non numérique dans '{pair}'"))?;
    Ok(ValueRecord::new(name.trim(), level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use choropleth::CellValue;

    #[test]
    fn test_parse_manual() {
        let record = parse_manual("Strasbourg=50").unwrap();
        assert_eq!(record.key, "Strasbourg");
        assert_eq!(record.level, CellValue::Number(50.0));

        let record = parse_manual(" Colmar = 12.5 ").unwrap();
        assert_eq!(record.key, "Colmar");
        assert_eq!(record.level, CellValue::Number(12.5));

        assert!(parse_manual("PasDeSigne").is_err());
        assert!(parse_manual("Ville=beaucoup").is_err());
    }

    #[test]
    fn test_collect_records_requires_a_source() {
        assert!(collect_records(None, &[], "Ville", "Niveau").is_err());
        let records =
            collect_records(None, &["A=1".to_string()], "Ville", "Niveau").unwrap();
        assert_eq!(records.len(), 1);
    }
}
