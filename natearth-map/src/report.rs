//! Résumé d'un jeu de données (commande `info`)

use std::path::Path;

use natearth::Dataset;
use serde::Serialize;

use crate::bounds::Boundaries;
use crate::error::Result;

/// Description d'un champ attributaire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub name: String,
    /// Code dBase (`C`, `N`, `F`…)
    pub field_type: char,
    pub length: u8,
    pub decimal_count: u8,
}

/// Résumé des en-têtes et de l'emprise d'un jeu de données
#[derive(Debug, Clone, Serialize)]
pub struct DatasetReport {
    pub name: String,
    pub record_count: usize,
    pub shape_type: String,
    pub encoding: String,
    /// `YYYY-MM-DD` tel que stocké dans l'en-tête dBase
    pub last_update: String,
    /// Emprise annoncée par l'en-tête du fichier de formes
    pub bbox: [f64; 4],
    /// Emprise calculée sur les coordonnées
    pub boundaries: Option<Boundaries>,
    pub fields: Vec<FieldSummary>,
}

impl DatasetReport {
    /// Décode le jeu complet pour calculer l'emprise réelle
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        let table = dataset.attribute_table()?;
        let shapes = dataset.shapes()?;
        let collection = dataset.collection()?;
        let (year, month, day) = table.header().last_update;

        Ok(Self {
            name: dataset.name().to_string(),
            record_count: dataset.record_count(),
            shape_type: format!("{:?}", shapes.header().shape_type),
            encoding: dataset.encoding().name().to_string(),
            last_update: format!("{:04}-{:02}-{:02}", year, month, day),
            bbox: collection.bbox,
            boundaries: Boundaries::of(&collection.features),
            fields: table
                .fields()
                .iter()
                .map(|f| FieldSummary {
                    name: f.name.clone(),
                    field_type: f.field_type.code(),
                    length: f.length,
                    decimal_count: f.decimal_count,
                })
                .collect(),
        })
    }

    /// Affiche le résumé sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("DATASET {}", self.name);
        println!("{}", "=".repeat(60));

        println!("\nShape type: {}", self.shape_type);
        println!("Records: {}", self.record_count);
        println!("Encoding: {}", self.encoding);
        println!("Last update: {}", self.last_update);

        println!("\n--- EXTENT ---");
        println!(
            "Header bbox: [{}, {}, {}, {}]",
            self.bbox[0], self.bbox[1], self.bbox[2], self.bbox[3]
        );
        match &self.boundaries {
            Some(b) => println!(
                "Coordinates: lon {} .. {}, lat {} .. {}",
                b.lon_min, b.lon_max, b.lat_min, b.lat_max
            ),
            None => println!("Coordinates: none"),
        }

        println!("\n--- FIELDS ({}) ---", self.fields.len());
        for f in &self.fields {
            println!(
                "  {:<12} {} {:>3}.{}",
                f.name, f.field_type, f.length, f.decimal_count
            );
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le résumé en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact sur une ligne
    pub fn summary(&self) -> String {
        format!(
            "{}: {} {} records, {} fields",
            self.name,
            self.record_count,
            self.shape_type,
            self.fields.len()
        )
    }
}
