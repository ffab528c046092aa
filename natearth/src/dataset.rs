//! Chargement d'un jeu de données Natural Earth depuis le disque
//!
//! Disposition attendue : `<racine>/<nom>/<nom>.dbf` et `<racine>/<nom>/<nom>.shp`,
//! avec éventuellement `<nom>.cpg` pour la page de code de la table.

use std::path::Path;

use encoding_rs::Encoding;
use tracing::{debug, info, warn};

use crate::assemble::{assemble_collection, assemble_feature};
use crate::dbf::DbfTable;
use crate::error::{NatearthError, Result};
use crate::shp::ShpFile;
use crate::types::{Feature, FeatureCollection};

/// Buffers d'un jeu de données, validés au chargement
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    dbf: Vec<u8>,
    shp: Vec<u8>,
    encoding: &'static Encoding,
    record_count: usize,
}

impl Dataset {
    /// Ouvre le jeu de données `name` sous `root`
    ///
    /// # Errors
    ///
    /// `NatearthError::MissingFile` si la racine, le répertoire du jeu ou l'un
    /// des deux fichiers est absent ; erreurs de format si les en-têtes sont
    /// invalides ou si les effectifs diffèrent.
    pub fn open(root: &Path, name: &str) -> Result<Self> {
        if !root.is_dir() {
            return Err(NatearthError::MissingFile(format!(
                "path {} does not exist",
                root.display()
            )));
        }
        let dir = root.join(name);
        if !dir.is_dir() {
            return Err(NatearthError::MissingFile(format!(
                "dataset {} does not exist in {}",
                name,
                root.display()
            )));
        }

        let dbf_path = dir.join(format!("{}.dbf", name));
        let shp_path = dir.join(format!("{}.shp", name));
        for path in [&dbf_path, &shp_path] {
            if !path.is_file() {
                return Err(NatearthError::MissingFile(path.display().to_string()));
            }
        }

        let dbf = std::fs::read(&dbf_path)?;
        let shp = std::fs::read(&shp_path)?;
        let encoding = read_code_page(&dir.join(format!("{}.cpg", name)));

        info!(
            dataset = name,
            dbf_bytes = dbf.len(),
            shp_bytes = shp.len(),
            encoding = encoding.name(),
            "Dataset loaded"
        );

        Self::build(name.to_string(), dbf, shp, encoding)
    }

    /// Construit un jeu de données depuis des buffers déjà lus
    pub fn from_bytes(dbf: Vec<u8>, shp: Vec<u8>) -> Result<Self> {
        Self::build(String::new(), dbf, shp, encoding_rs::WINDOWS_1252)
    }

    /// Remplace la page de code utilisée pour les textes non UTF-8
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    fn build(
        name: String,
        dbf: Vec<u8>,
        shp: Vec<u8>,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let record_count = DbfTable::parse(&dbf)?.record_count();
        let shape_count = ShpFile::parse(&shp)?.record_count()?;

        if record_count != shape_count {
            return Err(NatearthError::format(
                "dataset",
                format!(
                    "attribute table holds {} records but shapefile holds {}",
                    record_count, shape_count
                ),
            ));
        }

        debug!(dataset = %name, records = record_count, "Dataset validated");

        Ok(Self {
            name,
            dbf,
            shp,
            encoding,
            record_count,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Table attributaire décodée à la demande
    pub fn attribute_table(&self) -> Result<DbfTable<'_>> {
        Ok(DbfTable::parse(&self.dbf)?.with_encoding(self.encoding))
    }

    /// Fichier de formes décodé à la demande
    pub fn shapes(&self) -> Result<ShpFile<'_>> {
        ShpFile::parse(&self.shp)
    }

    /// Feature `number` (à partir de 1)
    pub fn feature(&self, number: usize) -> Result<Feature> {
        NatearthError::check_range(number, self.record_count)?;
        let record = self.attribute_table()?.record(number)?;
        let shape = self.shapes()?.record(number)?;
        Ok(assemble_feature(record, shape))
    }

    /// Collection complète
    pub fn collection(&self) -> Result<FeatureCollection> {
        let table = self.attribute_table()?;
        let shapes = self.shapes()?;
        let records = table.records()?;
        let geometries = shapes.records()?;
        Ok(assemble_collection(shapes.header(), records, geometries))
    }
}

/// Lit le fichier `.cpg` ; Windows-1252 s'il est absent ou inconnu
fn read_code_page(path: &Path) -> &'static Encoding {
    let Ok(label) = std::fs::read_to_string(path) else {
        return encoding_rs::WINDOWS_1252;
    };
    let label = label.trim();
    match Encoding::for_label(label.as_bytes()) {
        Some(encoding) => encoding,
        None => {
            warn!(code_page = label, "Unknown code page, falling back to windows-1252");
            encoding_rs::WINDOWS_1252
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbf::tests::build_dbf;
    use crate::dbf::RECORD_ACTIVE;
    use crate::shp::tests::{build_shp, TestShape};
    use crate::types::{FieldValue, Geometry};

    fn buffers(points: usize) -> (Vec<u8>, Vec<u8>) {
        let rows: Vec<(u8, Vec<&str>)> = (0..points)
            .map(|_| (RECORD_ACTIVE, vec!["row"]))
            .collect();
        let dbf = build_dbf(&[("NAME", b'C', 4)], &rows);
        let shapes: Vec<TestShape> = (0..points)
            .map(|i| TestShape::Point(i as f64, -(i as f64)))
            .collect();
        let shp = build_shp(1, [0.0; 8], &shapes);
        (dbf, shp)
    }

    #[test]
    fn test_from_bytes_feature_and_collection() {
        let (dbf, shp) = buffers(3);
        let dataset = Dataset::from_bytes(dbf, shp).unwrap();
        assert_eq!(dataset.record_count(), 3);

        let feature = dataset.feature(2).unwrap();
        assert_eq!(feature.geometry, Geometry::Point([-1.0, 1.0]));
        assert_eq!(
            feature.properties.get("NAME"),
            Some(&FieldValue::Text("row".into()))
        );

        let collection = dataset.collection().unwrap();
        assert_eq!(collection.features.len(), 3);
        assert_eq!(collection.features[1], feature);
    }

    #[test]
    fn test_feature_out_of_range() {
        let (dbf, shp) = buffers(2);
        let dataset = Dataset::from_bytes(dbf, shp).unwrap();
        assert!(matches!(dataset.feature(0), Err(NatearthError::Range { .. })));
        assert!(matches!(dataset.feature(3), Err(NatearthError::Range { .. })));
    }

    #[test]
    fn test_mismatched_counts() {
        let (dbf, _) = buffers(2);
        let (_, shp) = buffers(3);
        let err = Dataset::from_bytes(dbf, shp).unwrap_err();
        assert!(err.to_string().contains("2 records"));
    }

    #[test]
    fn test_open_missing_paths() {
        let root = std::env::temp_dir().join("natearth_missing_root_does_not_exist");
        assert!(matches!(
            Dataset::open(&root, "countries"),
            Err(NatearthError::MissingFile(_))
        ));

        let root = std::env::temp_dir();
        assert!(matches!(
            Dataset::open(&root, "natearth_no_such_dataset"),
            Err(NatearthError::MissingFile(_))
        ));
    }

    #[test]
    fn test_open_from_disk_with_code_page() {
        let root = std::env::temp_dir().join(format!("natearth_ds_{}", std::process::id()));
        let dir = root.join("tiny");
        std::fs::create_dir_all(&dir).unwrap();

        let (dbf, shp) = buffers(1);
        std::fs::write(dir.join("tiny.dbf"), dbf).unwrap();
        std::fs::write(dir.join("tiny.shp"), shp).unwrap();
        std::fs::write(dir.join("tiny.cpg"), "UTF-8\n").unwrap();

        let dataset = Dataset::open(&root, "tiny").unwrap();
        assert_eq!(dataset.name(), "tiny");
        assert_eq!(dataset.encoding(), encoding_rs::UTF_8);
        assert_eq!(dataset.collection().unwrap().features.len(), 1);

        std::fs::remove_dir_all(&root).ok();
    }
}
