//! Lecture d'entiers et de flottants à offset fixe dans un buffer

use crate::error::{NatearthError, Result};

/// Vue en lecture seule sur un buffer, avec le nom du fichier pour les erreurs
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    data: &'a [u8],
    file: &'static str,
}

impl<'a> ByteView<'a> {
    pub fn new(data: &'a [u8], file: &'static str) -> Self {
        Self { data, file }
    }

    /// Tranche `[offset, offset + len)`, erreur de format si elle déborde
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| {
                NatearthError::format(
                    self.file,
                    format!(
                        "truncated buffer: need {} bytes at offset {}, have {}",
                        len,
                        offset,
                        self.data.len()
                    ),
                )
            })
    }

    #[inline]
    fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let bytes = self.slice(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    #[inline]
    pub fn u8(&self, offset: usize) -> Result<u8> {
        Ok(self.array::<1>(offset)?[0])
    }

    #[inline]
    pub fn u16_le(&self, offset: usize) -> Result<u16> {
        self.array(offset).map(u16::from_le_bytes)
    }

    #[inline]
    pub fn u32_le(&self, offset: usize) -> Result<u32> {
        self.array(offset).map(u32::from_le_bytes)
    }

    #[inline]
    pub fn u32_be(&self, offset: usize) -> Result<u32> {
        self.array(offset).map(u32::from_be_bytes)
    }

    #[inline]
    pub fn f64_le(&self, offset: usize) -> Result<f64> {
        self.array(offset).map(f64::from_le_bytes)
    }
}
