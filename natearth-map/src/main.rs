//! Point d'entrée CLI pour natearth-map

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Projeter les jeux de données Natural Earth vers SVG ou GeoJSON
#[derive(Parser)]
#[command(name = "natearth-map")]
#[command(author, version)]
#[command(about = "Project Natural Earth datasets (.dbf + .shp) and export them to SVG or GeoJSON")]
#[command(long_about = "Decode a Natural Earth dataset, project it onto a plane (none or mercator, mirrored and scaled) and write SVG paths or GeoJSON.\n\nThe dataset root defaults to $NATEARTH_DATA, then ./_db.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Svg {
            dataset,
            transform,
            output,
        } => {
            info!(path = %dataset.path.display(), db = %dataset.db, "Export vers SVG");
            cli::cmd_svg(&dataset, &transform, output.as_deref())?;
        }
        Commands::Geojson {
            dataset,
            transform,
            output,
            raw,
        } => {
            info!(path = %dataset.path.display(), db = %dataset.db, output = %output.display(), raw, "Export vers GeoJSON");
            cli::cmd_geojson(&dataset, &transform, &output, raw)?;
        }
        Commands::Info { dataset, json } => {
            cli::cmd_info(&dataset, json.as_deref())?;
        }
    }

    Ok(())
}

// Les logs partent sur stderr : stdout peut porter le document SVG
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
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
