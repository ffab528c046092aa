//! Définition et implémentation des commandes CLI
//!
//! - `svg` : jeu de données → document SVG (fichier ou sortie standard)
//! - `geojson` : jeu de données → GeoJSON, projeté ou brut
//! - `info` : résumé des en-têtes et de l'emprise

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use natearth::{Dataset, GeoObject};
use tracing::info;

use natearth_map::config::Config;
use natearth_map::export::{export_to_geojson, svg, AxisOrder};
use natearth_map::projection::{self, Mirror, Projection, TransformOptions};
use natearth_map::report::DatasetReport;

#[derive(Subcommand)]
pub enum Commands {
    /// Render a dataset as SVG paths
    Svg {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        transform: TransformArgs,

        /// Output SVG file (default: standard output)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a dataset to GeoJSON
    Geojson {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        transform: TransformArgs,

        /// Output GeoJSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Keep decoded longitude/latitude, skip projection
        #[arg(long)]
        raw: bool,
    },

    /// Print header summary and coordinate boundaries
    Info {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Also save the summary as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

/// Emplacement du jeu de données
#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// Root directory holding one sub-directory per dataset
    #[arg(short, long, env = "NATEARTH_DATA", default_value = "./_db")]
    pub path: PathBuf,

    /// Dataset name (e.g. ne_110m_admin_0_countries)
    #[arg(long)]
    pub db: String,
}

impl DatasetArgs {
    fn open(&self) -> Result<Dataset> {
        Dataset::open(&self.path, &self.db).with_context(|| {
            format!(
                "Failed to open dataset {} in {}",
                self.db,
                self.path.display()
            )
        })
    }
}

/// Options de projection ; les valeurs explicites priment sur le preset ou le fichier
#[derive(Args, Debug, Default)]
pub struct TransformArgs {
    /// Scale factor applied after rounding (>= 1)
    #[arg(long)]
    pub scale: Option<f64>,

    /// Projection: none, mercator
    #[arg(long)]
    pub projection: Option<String>,

    /// Mirror: none, x, y, xy
    #[arg(long)]
    pub mirror: Option<String>,

    /// Embedded preset (flat/mercator/atlas)
    #[arg(long, conflicts_with = "config")]
    pub preset: Option<String>,

    /// Path to a JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl TransformArgs {
    pub fn resolve(&self) -> Result<TransformOptions> {
        let base = match (&self.preset, &self.config) {
            (Some(preset), _) => Config::from_preset(preset)?,
            (None, Some(path)) => Config::load(path)?,
            (None, None) => Config::default(),
        };

        let mut options = base.transform;
        if let Some(scale) = self.scale {
            options = options.with_scale(scale)?;
        }
        if let Some(name) = &self.projection {
            options = options.with_projection(name.parse::<Projection>()?);
        }
        if let Some(name) = &self.mirror {
            options = options.with_mirror(name.parse::<Mirror>()?);
        }
        Ok(options)
    }
}

/// Exécute la commande svg
pub fn cmd_svg(dataset: &DatasetArgs, transform: &TransformArgs, output: Option<&Path>) -> Result<()> {
    let options = transform.resolve()?;
    let collection = dataset.open()?.collection()?;
    let projected = projection::transform(&GeoObject::from(collection), &options);

    match output {
        Some(path) => {
            let file = File::create(path)
                .context(format!("Failed to create file: {}", path.display()))?;
            svg::emit(&projected, BufWriter::new(file))?;
            info!(
                output = %path.display(),
                features = projected.features().len(),
                "SVG written"
            );
        }
        None => svg::emit_stdout(&projected)?,
    }

    Ok(())
}

/// Exécute la commande geojson
pub fn cmd_geojson(
    dataset: &DatasetArgs,
    transform: &TransformArgs,
    output: &Path,
    raw: bool,
) -> Result<()> {
    let collection = GeoObject::from(dataset.open()?.collection()?);

    if raw {
        export_to_geojson(&collection, AxisOrder::LatLon, output)?;
    } else {
        let options = transform.resolve()?;
        let projected = projection::transform(&collection, &options);
        export_to_geojson(&projected, AxisOrder::Xy, output)?;
    }

    Ok(())
}

/// Exécute la commande info
pub fn cmd_info(dataset: &DatasetArgs, json: Option<&Path>) -> Result<()> {
    let report = DatasetReport::from_dataset(&dataset.open()?)?;
    report.display();

    if let Some(path) = json {
        report
            .save_to_file(path)
            .context(format!("Failed to write report: {}", path.display()))?;
    }
    info!("{}", report.summary());

    Ok(())
}
