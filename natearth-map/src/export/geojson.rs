//! Export vers GeoJSON avec geozero (streaming)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use geo::algorithm::winding_order::WindingOrder;
use geo::{Contains, Coord, LineString, MultiLineString, MultiPolygon, Point, Polygon, Winding};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use natearth::{Feature, GeoObject, Geometry, Position, Ring};
use tracing::info;

use crate::error::Result;

/// Ordre des positions de l'objet exporté
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// Positions décodées `[lat, lon]`
    LatLon,
    /// Positions projetées `[x, y]`
    Xy,
}

impl AxisOrder {
    fn coord(self, [a, b]: Position) -> Coord<f64> {
        match self {
            Self::LatLon => Coord { x: b, y: a },
            Self::Xy => Coord { x: a, y: b },
        }
    }
}

/// Géométrie `geo` équivalente
///
/// Une PolyLine d'une seule part devient un LineString. Les anneaux d'un
/// Polygon sont répartis par sens de parcours (voir `polygon_rings`) ; plusieurs
/// anneaux extérieurs donnent un MultiPolygon.
pub fn to_geo(geometry: &Geometry, order: AxisOrder) -> geo::Geometry<f64> {
    match geometry {
        Geometry::Point(p) => Point::from(order.coord(*p)).into(),
        Geometry::PolyLine(rings) if rings.len() == 1 => line_string(&rings[0], order).into(),
        Geometry::PolyLine(rings) => {
            MultiLineString::new(rings.iter().map(|r| line_string(r, order)).collect()).into()
        }
        Geometry::Polygon(rings) => {
            let mut polygons = polygon_rings(rings, order);
            match polygons.len() {
                0 => Polygon::new(LineString::new(Vec::new()), Vec::new()).into(),
                1 => polygons.remove(0).into(),
                _ => MultiPolygon::new(polygons).into(),
            }
        }
    }
}

/// Regroupe les anneaux d'un Polygon en polygones
///
/// Le premier anneau d'un Polygon est toujours extérieur et fixe le sens des
/// extérieurs (horaire dans le fichier, inversé par un miroir simple). Un
/// anneau de sens opposé est un trou, rattaché à l'extérieur qui le contient,
/// à défaut au dernier extérieur lu.
fn polygon_rings(rings: &[Ring], order: AxisOrder) -> Vec<Polygon<f64>> {
    let mut lines = rings.iter().map(|r| {
        let mut line = line_string(r, order);
        line.close();
        line
    });
    let Some(first) = lines.next() else {
        return Vec::new();
    };
    let outer = first.winding_order().unwrap_or(WindingOrder::Clockwise);

    let mut groups: Vec<(LineString<f64>, Vec<LineString<f64>>)> = vec![(first, Vec::new())];
    for line in lines {
        match line.winding_order() {
            Some(winding) if winding != outer => {
                let start = line.0.first().copied().map(Point::from);
                let target = start
                    .and_then(|p| {
                        groups.iter().rposition(|(exterior, _)| {
                            Polygon::new(exterior.clone(), Vec::new()).contains(&p)
                        })
                    })
                    .unwrap_or(groups.len() - 1);
                groups[target].1.push(line);
            }
            _ => groups.push((line, Vec::new())),
        }
    }

    groups
        .into_iter()
        .map(|(exterior, holes)| Polygon::new(exterior, holes))
        .collect()
}

fn line_string(ring: &[Position], order: AxisOrder) -> LineString<f64> {
    ring.iter().map(|&p| order.coord(p)).collect()
}

/// Exporte un objet dans un fichier GeoJSON
pub fn export_to_geojson(object: &GeoObject, order: AxisOrder, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    write_geojson(object, order, &mut writer)?;

    info!(
        output = %output_path.display(),
        features = object.features().len(),
        "GeoJSON written"
    );
    Ok(())
}

/// Écrit une FeatureCollection GeoJSON ; l'emprise n'est reprise que pour
/// des positions non projetées
pub fn write_geojson<W: Write>(object: &GeoObject, order: AxisOrder, mut writer: W) -> Result<()> {
    write!(writer, r#"{{"type":"FeatureCollection","#)?;
    if let (GeoObject::FeatureCollection(collection), AxisOrder::LatLon) = (object, order) {
        write!(writer, r#""bbox":"#)?;
        serde_json::to_writer(&mut writer, &collection.bbox)?;
        write!(writer, ",")?;
    }
    write!(writer, r#""features":["#)?;

    for (i, feature) in object.features().iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(&mut writer, feature, order)?;
    }

    write!(writer, "]}}")?;
    writer.flush()?;

    Ok(())
}

fn write_feature<W: Write>(writer: &mut W, feature: &Feature, order: AxisOrder) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    to_geo(&feature.geometry, order).process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    write!(writer, r#","properties":"#)?;
    serde_json::to_writer(&mut *writer, &feature.properties)?;
    write!(writer, "}}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use natearth::{FeatureCollection, FieldValue};
    use serde_json::Value;

    fn sample() -> FeatureCollection {
        FeatureCollection {
            bbox: [-10.0, -5.0, 10.0, 5.0],
            features: vec![
                Feature {
                    properties: [
                        ("NAME".to_string(), FieldValue::Text("Quote \"q\"".into())),
                        ("RANK".to_string(), FieldValue::Integer(3)),
                        ("AREA".to_string(), FieldValue::Null),
                    ]
                    .into_iter()
                    .collect(),
                    geometry: Geometry::Point([48.85, 2.35]),
                },
                Feature {
                    properties: Default::default(),
                    geometry: Geometry::PolyLine(vec![
                        vec![[0.0, 0.0], [1.0, 1.0]],
                        vec![[2.0, 2.0], [3.0, 3.0]],
                    ]),
                },
            ],
        }
    }

    #[test]
    fn test_to_geo_axis_order() {
        let point = Geometry::Point([48.85, 2.35]);
        assert_eq!(
            to_geo(&point, AxisOrder::LatLon),
            geo::Geometry::Point(Point::new(2.35, 48.85))
        );
        assert_eq!(
            to_geo(&point, AxisOrder::Xy),
            geo::Geometry::Point(Point::new(48.85, 2.35))
        );
    }

    #[test]
    fn test_to_geo_shapes() {
        let single = Geometry::PolyLine(vec![vec![[0.0, 0.0], [1.0, 1.0]]]);
        assert!(matches!(to_geo(&single, AxisOrder::Xy), geo::Geometry::LineString(_)));

        // extérieur horaire en (x = lon, y = lat), trou antihoraire
        let polygon = Geometry::Polygon(vec![
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
            vec![[1.0, 1.0], [1.0, 2.0], [2.0, 2.0], [2.0, 1.0], [1.0, 1.0]],
        ]);
        match to_geo(&polygon, AxisOrder::LatLon) {
            geo::Geometry::Polygon(p) => {
                assert_eq!(p.exterior().0.len(), 5);
                assert_eq!(p.interiors().len(), 1);
            }
            other => panic!("Expected Polygon, got {:?}", other),
        }
    }

    fn square(lat: f64, lon: f64, size: f64, clockwise: bool) -> Ring {
        // horaire en (x = lon, y = lat) : nord, est, sud
        let ring = vec![
            [lat, lon],
            [lat + size, lon],
            [lat + size, lon + size],
            [lat, lon + size],
            [lat, lon],
        ];
        if clockwise {
            ring
        } else {
            ring.into_iter().rev().collect()
        }
    }

    #[test]
    fn test_islands_become_multipolygon() {
        let country = Geometry::Polygon(vec![
            square(0.0, 0.0, 1.0, true),
            square(50.0, 100.0, 4.0, true),
            square(51.0, 101.0, 1.0, false),
        ]);
        match to_geo(&country, AxisOrder::LatLon) {
            geo::Geometry::MultiPolygon(mp) => {
                assert_eq!(mp.0.len(), 2);
                assert!(mp.0[0].interiors().is_empty());
                assert_eq!(mp.0[1].interiors().len(), 1);
                assert_eq!(mp.0[1].exterior().0[0], Coord { x: 100.0, y: 50.0 });
            }
            other => panic!("Expected MultiPolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_mirrored_rings_keep_their_roles() {
        // un miroir simple inverse tous les sens de parcours
        let mirrored = Geometry::Polygon(vec![
            square(0.0, 0.0, 10.0, false),
            square(2.0, 2.0, 1.0, true),
            square(20.0, 20.0, 1.0, false),
        ]);
        match to_geo(&mirrored, AxisOrder::LatLon) {
            geo::Geometry::MultiPolygon(mp) => {
                assert_eq!(mp.0.len(), 2);
                assert_eq!(mp.0[0].interiors().len(), 1);
            }
            other => panic!("Expected MultiPolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_polygon() {
        match to_geo(&Geometry::Polygon(Vec::new()), AxisOrder::Xy) {
            geo::Geometry::Polygon(p) => assert!(p.exterior().0.is_empty()),
            other => panic!("Expected Polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_write_geojson_parses_back() {
        let mut buffer = Vec::new();
        write_geojson(&GeoObject::from(sample()), AxisOrder::LatLon, &mut buffer).unwrap();

        let json: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["bbox"][2], 10.0);
        assert_eq!(json["features"].as_array().unwrap().len(), 2);

        let first = &json["features"][0];
        assert_eq!(first["geometry"]["type"], "Point");
        assert_eq!(first["geometry"]["coordinates"][0], 2.35);
        assert_eq!(first["properties"]["NAME"], "Quote \"q\"");
        assert_eq!(first["properties"]["RANK"], 3);
        assert!(first["properties"]["AREA"].is_null());

        assert_eq!(json["features"][1]["geometry"]["type"], "MultiLineString");
    }

    #[test]
    fn test_projected_export_has_no_bbox() {
        let mut buffer = Vec::new();
        write_geojson(&GeoObject::from(sample()), AxisOrder::Xy, &mut buffer).unwrap();
        let json: Value = serde_json::from_slice(&buffer).unwrap();
        assert!(json.get("bbox").is_none());
    }

    #[test]
    fn test_export_to_geojson_file() {
        let output_path = std::env::temp_dir().join(format!(
            "natearth_export_{}.geojson",
            std::process::id()
        ));
        export_to_geojson(&GeoObject::from(sample()), AxisOrder::LatLon, &output_path).unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.starts_with(r#"{"type":"FeatureCollection""#));

        std::fs::remove_file(output_path).ok();
    }
}
