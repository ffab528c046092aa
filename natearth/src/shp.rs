//! Décodeur des fichiers de formes ESRI (.shp)
//!
//! ```text
//!  -----------------------------
//! | En-tête (100 octets)        |
//!  -----------------------------
//! | En-tête d'enregistrement (8)|
//!  -----------------------------
//! | Contenu (taille variable)   |
//!  -----------------------------
//! | ...                         |
//!  -----------------------------
//! ```
//!
//! Les longueurs sont exprimées en mots de 16 bits, en big-endian ; le reste
//! du fichier est en little-endian.

use rayon::prelude::*;
use tracing::debug;

use crate::bytes::ByteView;
use crate::error::{NatearthError, Result};
use crate::types::{Geometry, Position, Ring};

const FILE: &str = "shp";

/// Code magique en tête de fichier
pub const SHP_MAGIC: u32 = 9994;

const HEADER_SIZE: usize = 100;
const RECORD_HEADER_SIZE: usize = 8;
const POINT_SIZE: usize = 16;

/// Offsets dans l'en-tête
mod header {
    pub const FILE_CODE: usize = 0;
    pub const FILE_LENGTH: usize = 24;
    pub const VERSION: usize = 28;
    pub const SHAPE_TYPE: usize = 32;
    pub const BBOX: usize = 36;
}

/// Offsets dans le contenu d'un enregistrement (après l'en-tête de 8 octets)
mod body {
    pub const SHAPE_TYPE: usize = 0;
    pub const POINT_X: usize = 4;
    pub const POINT_Y: usize = 12;
    pub const NUM_PARTS: usize = 36;
    pub const NUM_POINTS: usize = 40;
    pub const PARTS: usize = 44;
}

/// Types de formes ESRI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
    MultiPatch,
}

impl ShapeType {
    pub fn code(self) -> u32 {
        match self {
            Self::Null => 0,
            Self::Point => 1,
            Self::PolyLine => 3,
            Self::Polygon => 5,
            Self::MultiPoint => 8,
            Self::PointZ => 11,
            Self::PolyLineZ => 13,
            Self::PolygonZ => 15,
            Self::MultiPointZ => 18,
            Self::PointM => 21,
            Self::PolyLineM => 23,
            Self::PolygonM => 25,
            Self::MultiPointM => 28,
            Self::MultiPatch => 31,
        }
    }
}

impl TryFrom<u32> for ShapeType {
    type Error = NatearthError;

    fn try_from(code: u32) -> Result<Self> {
        Ok(match code {
            0 => Self::Null,
            1 => Self::Point,
            3 => Self::PolyLine,
            5 => Self::Polygon,
            8 => Self::MultiPoint,
            11 => Self::PointZ,
            13 => Self::PolyLineZ,
            15 => Self::PolygonZ,
            18 => Self::MultiPointZ,
            21 => Self::PointM,
            23 => Self::PolyLineM,
            25 => Self::PolygonM,
            28 => Self::MultiPointM,
            31 => Self::MultiPatch,
            other => {
                return Err(NatearthError::unsupported(
                    FILE,
                    "unknown shape type",
                    other.to_string(),
                ))
            }
        })
    }
}

/// Emprise déclarée dans l'en-tête
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
    pub m_min: f64,
    pub m_max: f64,
}

impl BoundingBox {
    /// `[Xmin, Ymin, Xmax, Ymax]`
    pub fn xy(&self) -> [f64; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }
}

/// En-tête d'un fichier de formes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShpHeader {
    pub file_code: u32,
    /// Longueur du fichier en octets
    pub file_length: usize,
    pub version: u32,
    pub shape_type: ShapeType,
    pub bbox: BoundingBox,
}

impl ShpHeader {
    fn parse(view: &ByteView<'_>) -> Result<Self> {
        // Le code magique est vérifié avant toute autre lecture
        let file_code = view.u32_be(header::FILE_CODE)?;
        if file_code != SHP_MAGIC {
            return Err(NatearthError::format(
                FILE,
                format!(
                    "not a shapefile: first four bytes are {} instead of {}",
                    file_code, SHP_MAGIC
                ),
            ));
        }

        let f = |i: usize| view.f64_le(header::BBOX + 8 * i);
        let bbox = BoundingBox {
            x_min: f(0)?,
            y_min: f(1)?,
            x_max: f(2)?,
            y_max: f(3)?,
            z_min: f(4)?,
            z_max: f(5)?,
            m_min: f(6)?,
            m_max: f(7)?,
        };

        if bbox.z_min != 0.0 || bbox.z_max != 0.0 {
            return Err(NatearthError::format(
                FILE,
                format!(
                    "Z range must be zero, found [{}, {}]",
                    bbox.z_min, bbox.z_max
                ),
            ));
        }
        if bbox.m_min != 0.0 || bbox.m_max != 0.0 {
            return Err(NatearthError::format(
                FILE,
                format!(
                    "M range must be zero, found [{}, {}]",
                    bbox.m_min, bbox.m_max
                ),
            ));
        }

        Ok(Self {
            file_code,
            file_length: view.u32_be(header::FILE_LENGTH)? as usize * 2,
            version: view.u32_le(header::VERSION)?,
            shape_type: ShapeType::try_from(view.u32_le(header::SHAPE_TYPE)?)?,
            bbox,
        })
    }
}

/// Un enregistrement du fichier de formes
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord {
    /// Numéro d'enregistrement déclaré (commence à 1)
    pub number: u32,
    /// Longueur du contenu, en mots de 16 bits
    pub content_length: u32,
    pub shape_type: ShapeType,
    pub geometry: Geometry,
}

/// Fichier de formes décodé sur un buffer en mémoire
#[derive(Debug, Clone)]
pub struct ShpFile<'a> {
    view: ByteView<'a>,
    header: ShpHeader,
}

impl<'a> ShpFile<'a> {
    /// Lit et valide l'en-tête
    ///
    /// # Errors
    ///
    /// `NatearthError::Format` si le code magique n'est pas 9994, si les
    /// plages Z/M ne sont pas nulles, ou si le buffer est tronqué.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let view = ByteView::new(data, FILE);
        let header = ShpHeader::parse(&view)?;

        debug!(
            file_length = header.file_length,
            shape_type = ?header.shape_type,
            bbox = ?header.bbox.xy(),
            "Shapefile header decoded"
        );

        Ok(Self { view, header })
    }

    pub fn header(&self) -> &ShpHeader {
        &self.header
    }

    /// Offsets de début de chaque enregistrement, dans l'ordre du fichier
    pub fn record_offsets(&self) -> Result<Vec<usize>> {
        let mut offsets = Vec::new();
        let mut offset = HEADER_SIZE;
        while offset < self.header.file_length {
            let content_length = self.view.u32_be(offset + 4)? as usize;
            offsets.push(offset);
            offset += RECORD_HEADER_SIZE + content_length * 2;
        }
        Ok(offsets)
    }

    pub fn record_count(&self) -> Result<usize> {
        self.record_offsets().map(|offsets| offsets.len())
    }

    /// Retourne l'enregistrement `number` (à partir de 1)
    pub fn record(&self, number: usize) -> Result<ShapeRecord> {
        let offsets = self.record_offsets()?;
        let index = NatearthError::check_range(number, offsets.len())?;
        self.decode_record(offsets[index])
    }

    /// Décode tous les enregistrements, dans l'ordre du fichier
    ///
    /// Les offsets sont repérés séquentiellement puis chaque enregistrement
    /// est décodé indépendamment.
    pub fn records(&self) -> Result<Vec<ShapeRecord>> {
        let offsets = self.record_offsets()?;
        offsets
            .into_par_iter()
            .map(|offset| self.decode_record(offset))
            .collect()
    }

    fn decode_record(&self, offset: usize) -> Result<ShapeRecord> {
        let number = self.view.u32_be(offset)?;
        let content_length = self.view.u32_be(offset + 4)?;
        let start = offset + RECORD_HEADER_SIZE;
        let shape_type = ShapeType::try_from(self.view.u32_le(start + body::SHAPE_TYPE)?)?;

        let geometry = match shape_type {
            ShapeType::Point => Geometry::Point(self.read_point(start)?),
            ShapeType::PolyLine => Geometry::PolyLine(self.read_parts(start, number)?),
            ShapeType::Polygon => Geometry::Polygon(self.read_parts(start, number)?),
            ShapeType::Null
            | ShapeType::MultiPoint
            | ShapeType::PointZ
            | ShapeType::PolyLineZ
            | ShapeType::PolygonZ
            | ShapeType::MultiPointZ
            | ShapeType::PointM
            | ShapeType::PolyLineM
            | ShapeType::PolygonM
            | ShapeType::MultiPointM
            | ShapeType::MultiPatch => {
                return Err(NatearthError::unsupported(
                    FILE,
                    "shape type",
                    format!("{:?} ({}) in record {}", shape_type, shape_type.code(), number),
                ))
            }
        };

        Ok(ShapeRecord {
            number,
            content_length,
            shape_type,
            geometry,
        })
    }

    /// Point stocké (x=lon, y=lat), retourné `[lat, lon]`
    fn read_point(&self, start: usize) -> Result<Position> {
        Ok([
            self.view.f64_le(start + body::POINT_Y)?,
            self.view.f64_le(start + body::POINT_X)?,
        ])
    }

    /// PolyLine / Polygon : un anneau par part, positions `[lat, lon]`
    fn read_parts(&self, start: usize, number: u32) -> Result<Vec<Ring>> {
        let num_parts = self.view.u32_le(start + body::NUM_PARTS)? as usize;
        let num_points = self.view.u32_le(start + body::NUM_POINTS)? as usize;

        let parts_len = num_parts.checked_mul(4).ok_or_else(|| overflow(number))?;
        let parts = self.view.slice(start + body::PARTS, parts_len)?;
        let points_start = start + body::PARTS + parts_len;
        let points_len = num_points
            .checked_mul(POINT_SIZE)
            .ok_or_else(|| overflow(number))?;
        // tous les points doivent être présents, même hors des parts
        self.view.slice(points_start, points_len)?;

        let first_indices: Vec<usize> = parts
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]) as usize)
            .collect();

        let mut rings = Vec::with_capacity(num_parts);
        for (i, &first) in first_indices.iter().enumerate() {
            let end = first_indices.get(i + 1).copied().unwrap_or(num_points);
            if first > end || end > num_points {
                return Err(NatearthError::format(
                    FILE,
                    format!(
                        "record {}: part {} spans points {}..{} of {}",
                        number, i, first, end, num_points
                    ),
                ));
            }

            let ring = (first..end)
                .map(|k| {
                    let at = points_start + k * POINT_SIZE;
                    Ok([self.view.f64_le(at + 8)?, self.view.f64_le(at)?])
                })
                .collect::<Result<Ring>>()?;
            rings.push(ring);
        }

        Ok(rings)
    }
}

fn overflow(number: u32) -> NatearthError {
    NatearthError::format(FILE, format!("record {}: part or point count overflows", number))
}
