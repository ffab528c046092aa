//! Émission SVG : un élément `<path>` par feature
//!
//! Les coordonnées sont écrites telles quelles ; elles doivent déjà être
//! projetées (voir `crate::projection`).

use std::fmt;
use std::io::Write;

use natearth::{GeoObject, Geometry, Position};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::object::geo_object_from_json;

/// En-tête du document jusqu'à l'ouverture du groupe
pub const SVG_PREAMBLE: &str = concat!(
    "<!-- Made with Natural Earth. Free vector and raster map data @ naturalearthdata.com. -->\n",
    "<svg version=\"1.1\" xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\">\n",
    "  <g transform=\"translate(0, 0) scale(1, 1)\">\n",
);

pub const SVG_CLOSING: &str = "  </g>\n</svg>\n";

/// Nombre au format le plus court, `-0` écrit `0`
struct Num(f64);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0.0 {
            f.write_str("0")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Ajoute une commande `M` ou `L` et sa position
fn push_command(d: &mut String, command: char, [x, y]: Position) {
    d.push(command);
    d.push_str(&Num(x).to_string());
    d.push(',');
    d.push_str(&Num(y).to_string());
}

/// Données de chemin (`d`) : `M x,y`, `L x,y`… puis `z` pour chaque anneau
///
/// Un anneau vide produit un `z` seul.
pub fn path_data<R: AsRef<[Position]>>(rings: &[R]) -> String {
    let mut d = String::new();
    for ring in rings {
        if let Some((&first, rest)) = ring.as_ref().split_first() {
            push_command(&mut d, 'M', first);
            for &position in rest {
                push_command(&mut d, 'L', position);
            }
        }
        d.push('z');
    }
    d
}

/// Chemin d'une géométrie ; un Point donne un anneau d'une position
pub fn emit_path(geometry: &Geometry) -> String {
    path_data(&geometry.rings())
}

/// Écrit le document complet dans `sink`, puis le vide
pub fn emit<W: Write>(object: &GeoObject, mut sink: W) -> Result<()> {
    let features = object.features();
    debug!(features = features.len(), "Writing SVG");

    sink.write_all(SVG_PREAMBLE.as_bytes())?;
    for feature in features {
        writeln!(
            sink,
            r#"    <path id="" class="land" d="{}"></path>"#,
            emit_path(&feature.geometry)
        )?;
    }
    sink.write_all(SVG_CLOSING.as_bytes())?;
    sink.flush()?;

    Ok(())
}

/// Écrit le document sur la sortie standard
pub fn emit_stdout(object: &GeoObject) -> Result<()> {
    let stdout = std::io::stdout();
    emit(object, std::io::BufWriter::new(stdout.lock()))
}

/// Variante non typée : le `type` de premier niveau est contrôlé avant écriture
pub fn emit_json<W: Write>(object: Value, sink: W) -> Result<()> {
    let object = geo_object_from_json(object)?;
    emit(&object, sink)
}
