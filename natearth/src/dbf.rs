//! Décodeur des tables attributaires dBase III (.dbf)
//!
//! Structure :
//!
//! ```text
//!  ------------------------------------
//! | En-tête (32 octets)                |
//!  ------------------------------------
//! | Descripteurs de champs (32 o. ch.) |
//! | ...                                |
//!  ------------------------------------
//! | Terminateur 0x0D                   |
//!  ------------------------------------
//! | Enregistrements (taille fixe)      |
//!  ------------------------------------
//! ```
//!
//! Chaque enregistrement commence par un octet d'état (0x20 actif, 0x2A
//! supprimé) suivi des valeurs des champs, en texte, bout à bout.

use std::borrow::Cow;

use encoding_rs::Encoding;
use rayon::prelude::*;
use tracing::debug;

use crate::bytes::ByteView;
use crate::error::{NatearthError, Result};
use crate::types::{FieldValue, Properties};

const FILE: &str = "dbf";

const HEADER_SIZE: usize = 32;
const DESCRIPTOR_SIZE: usize = 32;

/// Terminateur du tableau de descripteurs
pub const FIELD_TERMINATOR: u8 = 0x0D;
/// Premier octet d'un enregistrement actif
pub const RECORD_ACTIVE: u8 = 0x20;
/// Premier octet d'un enregistrement supprimé
pub const RECORD_DELETED: u8 = 0x2A;

/// Offsets dans l'en-tête
mod header {
    pub const VERSION: usize = 0;
    pub const LAST_UPDATE: usize = 1;
    pub const RECORD_COUNT: usize = 4;
    pub const HEADER_LENGTH: usize = 8;
    pub const RECORD_LENGTH: usize = 10;
    pub const LANGUAGE_DRIVER: usize = 29;
}

/// Offsets dans un descripteur de champ
mod descriptor {
    pub const NAME: usize = 0;
    pub const NAME_LEN: usize = 11;
    pub const TYPE: usize = 11;
    pub const LENGTH: usize = 16;
    pub const DECIMAL_COUNT: usize = 17;
}

/// En-tête d'une table dBase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbfHeader {
    pub version: u8,
    /// Date de dernière mise à jour (année, mois, jour)
    pub last_update: (u16, u8, u8),
    pub record_count: u32,
    pub header_length: u16,
    pub record_length: u16,
    /// Identifiant de page de code (souvent 0 : non renseigné)
    pub language_driver: u8,
}

impl DbfHeader {
    fn parse(view: &ByteView<'_>) -> Result<Self> {
        let year = 1900 + u16::from(view.u8(header::LAST_UPDATE)?);
        Ok(Self {
            version: view.u8(header::VERSION)?,
            last_update: (
                year,
                view.u8(header::LAST_UPDATE + 1)?,
                view.u8(header::LAST_UPDATE + 2)?,
            ),
            record_count: view.u32_le(header::RECORD_COUNT)?,
            header_length: view.u16_le(header::HEADER_LENGTH)?,
            record_length: view.u16_le(header::RECORD_LENGTH)?,
            language_driver: view.u8(header::LANGUAGE_DRIVER)?,
        })
    }

    /// Nombre de descripteurs : `(header_length - 1) / 32 - 1`
    pub fn field_count(&self) -> usize {
        (usize::from(self.header_length).saturating_sub(1) / DESCRIPTOR_SIZE).saturating_sub(1)
    }

    /// Début de la section des enregistrements
    pub fn record_section_start(&self) -> usize {
        usize::from(self.header_length)
    }
}

/// Type d'un champ dBase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `C` : texte
    Character,
    /// `N` : numérique entier en texte
    Numeric,
    /// `F` : flottant en texte
    Float,
    /// `D` : date (non géré)
    Date,
    /// `L` : booléen (non géré)
    Logical,
    /// `M` : mémo (non géré)
    Memo,
}

impl FieldType {
    pub fn code(self) -> char {
        match self {
            Self::Character => 'C',
            Self::Numeric => 'N',
            Self::Float => 'F',
            Self::Date => 'D',
            Self::Logical => 'L',
            Self::Memo => 'M',
        }
    }
}

impl TryFrom<u8> for FieldType {
    type Error = NatearthError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            b'C' => Ok(Self::Character),
            b'N' => Ok(Self::Numeric),
            b'F' => Ok(Self::Float),
            b'D' => Ok(Self::Date),
            b'L' => Ok(Self::Logical),
            b'M' => Ok(Self::Memo),
            other => Err(NatearthError::unsupported(
                FILE,
                "unknown field type",
                format!("{:?} (0x{:02X})", char::from(other), other),
            )),
        }
    }
}

/// Descripteur d'un champ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub length: u8,
    pub decimal_count: u8,
}

/// Un enregistrement décodé
#[derive(Debug, Clone, PartialEq)]
pub struct DbfRecord {
    /// Marqué supprimé (0x2A) ; l'enregistrement reste à sa position
    pub deleted: bool,
    pub properties: Properties,
}

/// Table dBase décodée sur un buffer en mémoire
#[derive(Debug, Clone)]
pub struct DbfTable<'a> {
    view: ByteView<'a>,
    header: DbfHeader,
    fields: Vec<FieldDescriptor>,
    encoding: &'static Encoding,
}

impl<'a> DbfTable<'a> {
    /// Lit l'en-tête et les descripteurs de champs
    ///
    /// # Errors
    ///
    /// `NatearthError::Format` si le buffer est tronqué ou si le terminateur
    /// 0x0D ne suit pas le dernier descripteur.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let view = ByteView::new(data, FILE);
        let header = DbfHeader::parse(&view)?;
        let fields = parse_fields(&view, &header)?;

        debug!(
            version = header.version,
            records = header.record_count,
            fields = fields.len(),
            record_length = header.record_length,
            "dBase header decoded"
        );

        Ok(Self {
            view,
            header,
            fields,
            encoding: encoding_rs::WINDOWS_1252,
        })
    }

    /// Encodage utilisé pour les textes qui ne sont pas de l'UTF-8 valide
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn header(&self) -> &DbfHeader {
        &self.header
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn record_count(&self) -> usize {
        self.header.record_count as usize
    }

    /// Retourne l'enregistrement `number` (à partir de 1)
    ///
    /// # Errors
    ///
    /// `NatearthError::Range` si `number` vaut 0 ou dépasse le nombre
    /// d'enregistrements.
    pub fn record(&self, number: usize) -> Result<DbfRecord> {
        let index = NatearthError::check_range(number, self.record_count())?;
        self.decode_record(index)
    }

    /// Décode tous les enregistrements, dans l'ordre du fichier
    pub fn records(&self) -> Result<Vec<DbfRecord>> {
        (0..self.record_count())
            .into_par_iter()
            .map(|index| self.decode_record(index))
            .collect()
    }

    fn decode_record(&self, index: usize) -> Result<DbfRecord> {
        let mut offset = self.header.record_section_start()
            + usize::from(self.header.record_length) * index;

        let deleted = match self.view.u8(offset)? {
            RECORD_ACTIVE => false,
            RECORD_DELETED => true,
            other => {
                return Err(NatearthError::format(
                    FILE,
                    format!(
                        "record {} starts with 0x{:02X}, expected 0x20 or 0x2A",
                        index + 1,
                        other
                    ),
                ))
            }
        };
        offset += 1;

        let mut properties = Properties::with_capacity(self.fields.len());
        for field in &self.fields {
            let raw = self.view.slice(offset, usize::from(field.length))?;
            let value = self.decode_value(field, raw)?;
            properties.insert(field.name.clone(), value);
            offset += usize::from(field.length);
        }

        Ok(DbfRecord {
            deleted,
            properties,
        })
    }

    fn decode_value(&self, field: &FieldDescriptor, raw: &[u8]) -> Result<FieldValue> {
        match field.field_type {
            FieldType::Character => {
                let text = decode_text(raw, self.encoding);
                Ok(FieldValue::Text(trim_field(&text).to_string()))
            }
            FieldType::Numeric => {
                let text = decode_text(raw, self.encoding);
                let text = trim_field(&text);
                if text.is_empty() {
                    return Ok(FieldValue::Null);
                }
                parse_leading_integer(text)
                    .map(FieldValue::Integer)
                    .ok_or_else(|| invalid_number(field, text))
            }
            FieldType::Float => {
                let text = decode_text(raw, self.encoding);
                let text = trim_field(&text);
                if text.is_empty() {
                    return Ok(FieldValue::Null);
                }
                fast_float::parse_partial::<f64, _>(text)
                    .map(|(value, _)| FieldValue::Float(value))
                    .map_err(|_| invalid_number(field, text))
            }
            FieldType::Date | FieldType::Logical | FieldType::Memo => {
                Err(NatearthError::unsupported(
                    FILE,
                    "field type",
                    format!("'{}' for field {}", field.field_type.code(), field.name),
                ))
            }
        }
    }
}

fn parse_fields(view: &ByteView<'_>, header: &DbfHeader) -> Result<Vec<FieldDescriptor>> {
    let count = header.field_count();
    let mut fields = Vec::with_capacity(count);
    let mut offset = HEADER_SIZE;

    for _ in 0..count {
        let raw = view.slice(offset, DESCRIPTOR_SIZE)?;
        let name_bytes = &raw[descriptor::NAME..descriptor::NAME + descriptor::NAME_LEN];
        let name_end = memchr::memchr(0, name_bytes).unwrap_or(name_bytes.len());
        let name = decode_text(&name_bytes[..name_end], encoding_rs::WINDOWS_1252).into_owned();

        fields.push(FieldDescriptor {
            name,
            field_type: FieldType::try_from(raw[descriptor::TYPE])?,
            length: raw[descriptor::LENGTH],
            decimal_count: raw[descriptor::DECIMAL_COUNT],
        });
        offset += DESCRIPTOR_SIZE;
    }

    let terminator = view.u8(offset)?;
    if terminator != FIELD_TERMINATOR {
        return Err(NatearthError::format(
            FILE,
            format!(
                "field descriptor terminator 0x0D not found at offset {} (found 0x{:02X})",
                offset, terminator
            ),
        ));
    }

    Ok(fields)
}

/// UTF-8 si valide, sinon décodage via la page de code du jeu de données
fn decode_text<'b>(raw: &'b [u8], encoding: &'static Encoding) -> Cow<'b, str> {
    match simdutf8::basic::from_utf8(raw) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => encoding.decode_without_bom_handling(raw).0,
    }
}

/// Retire les espaces de bourrage (et les NUL laissés par certains outils)
fn trim_field(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\0')
}

/// Signe optionnel puis chiffres ; le reste (partie décimale...) est ignoré
fn parse_leading_integer(text: &str) -> Option<i64> {
    let bytes = text.as_bytes();
    let sign_len = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits = bytes[sign_len..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    text[..sign_len + digits].parse().ok()
}

fn invalid_number(field: &FieldDescriptor, text: &str) -> NatearthError {
    NatearthError::format(
        FILE,
        format!("field {} holds non-numeric value {:?}", field.name, text),
    )
}
