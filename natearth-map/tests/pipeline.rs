//! Tests d'intégration : décodage → projection → SVG / GeoJSON

use natearth::{Dataset, GeoObject, Geometry};
use natearth_map::export::geojson::{write_geojson, AxisOrder};
use natearth_map::export::svg::{self, SVG_CLOSING, SVG_PREAMBLE};
use natearth_map::{transform, Boundaries, DatasetReport, Mirror, Projection, TransformOptions};
use serde_json::Value;

/// Table dBase : une colonne NAME (C, 10)
fn dbf_bytes(names: &[&str]) -> Vec<u8> {
    let mut data = vec![0u8; 32];
    data[0] = 0x03;
    data[1] = 124;
    data[2] = 3;
    data[3] = 9;
    data[4..8].copy_from_slice(&(names.len() as u32).to_le_bytes());
    data[8..10].copy_from_slice(&65u16.to_le_bytes());
    data[10..12].copy_from_slice(&11u16.to_le_bytes());

    let mut desc = [0u8; 32];
    desc[..4].copy_from_slice(b"NAME");
    desc[11] = b'C';
    desc[16] = 10;
    data.extend_from_slice(&desc);
    data.push(0x0D);

    for name in names {
        data.push(0x20);
        let mut cell = [b' '; 10];
        cell[..name.len()].copy_from_slice(name.as_bytes());
        data.extend_from_slice(&cell);
    }
    data
}

/// Fichier de formes multi-part (3 PolyLine, 5 Polygon), coordonnées (x = lon, y = lat)
fn shp_bytes(shape_type: u32, lines: &[Vec<Vec<(f64, f64)>>]) -> Vec<u8> {
    let mut records = Vec::new();
    for (i, parts) in lines.iter().enumerate() {
        let mut content = Vec::new();
        content.extend_from_slice(&shape_type.to_le_bytes());
        content.extend_from_slice(&[0u8; 32]);
        let num_points: usize = parts.iter().map(Vec::len).sum();
        content.extend_from_slice(&(parts.len() as u32).to_le_bytes());
        content.extend_from_slice(&(num_points as u32).to_le_bytes());
        let mut first = 0u32;
        for part in parts {
            content.extend_from_slice(&first.to_le_bytes());
            first += part.len() as u32;
        }
        for (x, y) in parts.iter().flatten() {
            content.extend_from_slice(&x.to_le_bytes());
            content.extend_from_slice(&y.to_le_bytes());
        }
        records.extend_from_slice(&(i as u32 + 1).to_be_bytes());
        records.extend_from_slice(&((content.len() / 2) as u32).to_be_bytes());
        records.extend_from_slice(&content);
    }

    let mut data = vec![0u8; 100];
    data[0..4].copy_from_slice(&9994u32.to_be_bytes());
    data[24..28].copy_from_slice(&(((100 + records.len()) / 2) as u32).to_be_bytes());
    data[28..32].copy_from_slice(&1000u32.to_le_bytes());
    data[32..36].copy_from_slice(&shape_type.to_le_bytes());
    for (i, v) in [-20.0f64, -10.0, 30.0, 60.0].iter().enumerate() {
        data[36 + 8 * i..44 + 8 * i].copy_from_slice(&v.to_le_bytes());
    }
    data.extend_from_slice(&records);
    data
}

fn coastlines() -> Dataset {
    let dbf = dbf_bytes(&["north", "south"]);
    let shp = shp_bytes(3, &[
        vec![vec![(-20.0, 60.0), (10.0, 50.5)]],
        vec![
            vec![(0.0, -10.0), (30.0, 0.0)],
            vec![(1.0, 1.0), (2.0, 2.0)],
        ],
    ]);
    Dataset::from_bytes(dbf, shp).unwrap()
}

/// Carré horaire en (x, y), comme les anneaux extérieurs d'un shapefile
fn clockwise_square(x: f64, y: f64, size: f64) -> Vec<(f64, f64)> {
    vec![
        (x, y),
        (x, y + size),
        (x + size, y + size),
        (x + size, y),
        (x, y),
    ]
}

/// Un pays de deux îles, la seconde percée d'un lac
fn archipelago() -> Dataset {
    let mut lake = clockwise_square(102.0, 51.0, 1.0);
    lake.reverse();
    let shp = shp_bytes(
        5,
        &[vec![
            clockwise_square(0.0, 0.0, 1.0),
            clockwise_square(100.0, 50.0, 4.0),
            lake,
        ]],
    );
    Dataset::from_bytes(dbf_bytes(&["islands"]), shp).unwrap()
}

#[test]
fn test_dataset_to_svg() {
    let collection = GeoObject::from(coastlines().collection().unwrap());
    let options = TransformOptions::new(2.0, Projection::None, Mirror::X).unwrap();
    let projected = transform(&collection, &options);

    let mut out = Vec::new();
    svg::emit(&projected, &mut out).unwrap();
    let document = String::from_utf8(out).unwrap();

    assert!(document.starts_with(SVG_PREAMBLE));
    assert!(document.ends_with(SVG_CLOSING));
    let paths: Vec<&str> = document.lines().filter(|l| l.contains("<path ")).collect();
    assert_eq!(
        paths,
        vec![
            r#"    <path id="" class="land" d="M-40,-120L20,-101z"></path>"#,
            r#"    <path id="" class="land" d="M0,20L60,0zM2,-2L4,-4z"></path>"#,
        ]
    );
}

#[test]
fn test_mercator_pipeline_clamps_nothing_below_limit() {
    let collection = GeoObject::from(coastlines().collection().unwrap());
    let options = TransformOptions::new(1.0, Projection::Mercator, Mirror::None).unwrap();
    let projected = transform(&collection, &options);

    match &projected.features()[0].geometry {
        Geometry::PolyLine(parts) => {
            let [x, y] = parts[0][0];
            assert_eq!(x, -20.0);
            assert!(y > 60.0 && y < 180.0, "y={}", y);
        }
        other => panic!("Expected PolyLine, got {:?}", other),
    }
}

#[test]
fn test_raw_geojson_export() {
    let collection = GeoObject::from(coastlines().collection().unwrap());
    let mut buffer = Vec::new();
    write_geojson(&collection, AxisOrder::LatLon, &mut buffer).unwrap();

    let json: Value = serde_json::from_slice(&buffer).unwrap();
    let features = json["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["geometry"]["type"], "LineString");
    assert_eq!(features[0]["geometry"]["coordinates"][0][0], -20.0);
    assert_eq!(features[0]["geometry"]["coordinates"][0][1], 60.0);
    assert_eq!(features[1]["geometry"]["type"], "MultiLineString");
    assert_eq!(features[1]["properties"]["NAME"], "south");
    assert_eq!(json["bbox"][3], 60.0);
}

#[test]
fn test_dataset_report() {
    let dataset = coastlines();
    let report = DatasetReport::from_dataset(&dataset).unwrap();

    assert_eq!(report.record_count, 2);
    assert_eq!(report.shape_type, "PolyLine");
    assert_eq!(report.last_update, "2024-03-09");
    assert_eq!(report.bbox, [-20.0, -10.0, 30.0, 60.0]);
    assert_eq!(report.fields.len(), 1);
    assert_eq!(report.fields[0].field_type, 'C');
    assert_eq!(
        report.boundaries,
        Some(Boundaries {
            lon_min: -20.0,
            lat_min: -10.0,
            lon_max: 30.0,
            lat_max: 60.0,
        })
    );
    assert!(report.summary().contains("2 PolyLine records"));
}

#[test]
fn test_archipelago_boundaries_cover_every_island() {
    let collection = archipelago().collection().unwrap();
    assert_eq!(
        Boundaries::of(&collection.features),
        Some(Boundaries {
            lon_min: 0.0,
            lat_min: 0.0,
            lon_max: 104.0,
            lat_max: 54.0,
        })
    );
}

#[test]
fn test_archipelago_exports_multipolygon() {
    let collection = GeoObject::from(archipelago().collection().unwrap());
    let mut buffer = Vec::new();
    write_geojson(&collection, AxisOrder::LatLon, &mut buffer).unwrap();

    let json: Value = serde_json::from_slice(&buffer).unwrap();
    let geometry = &json["features"][0]["geometry"];
    assert_eq!(geometry["type"], "MultiPolygon");
    let polygons = geometry["coordinates"].as_array().unwrap();
    assert_eq!(polygons.len(), 2);
    assert_eq!(polygons[0].as_array().unwrap().len(), 1);
    assert_eq!(polygons[1].as_array().unwrap().len(), 2);
    assert_eq!(polygons[1][0][0][0], 100.0);

    // le miroir x inverse les sens de parcours sans changer les rôles
    let options = TransformOptions::new(1.0, Projection::None, Mirror::X).unwrap();
    let projected = transform(&collection, &options);
    let mut buffer = Vec::new();
    write_geojson(&projected, AxisOrder::Xy, &mut buffer).unwrap();
    let json: Value = serde_json::from_slice(&buffer).unwrap();
    assert_eq!(json["features"][0]["geometry"]["type"], "MultiPolygon");
    assert_eq!(
        json["features"][0]["geometry"]["coordinates"][1]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}
