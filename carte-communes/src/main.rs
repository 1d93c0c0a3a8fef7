//! Point d'entrée CLI pour carte-communes

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod export;
mod report;
mod source;
mod table;

use cli::Commands;

/// Colorer les communes d'une région depuis une table de valeurs
#[derive(Parser)]
#[command(name = "carte-communes")]
#[command(author, version)]
#[command(about = "Colorer des communes (choroplèthe) depuis une table de valeurs")]
#[command(
    long_about = "Joint une table de valeurs (CSV Ville/Niveau ou valeurs manuelles) aux \
géométries GeoJSON des communes, classe les valeurs en paliers de couleurs et écrit un \
GeoJSON stylé consommable par un rendu cartographique."
)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Render(args) => {
            info!("Rendu choroplèthe");
            cli::cmd_render(args)
        }
        Commands::Check(args) => {
            info!("Contrôle de correspondance");
            cli::cmd_check(args)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
