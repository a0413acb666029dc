//! FITS file writer.
//!
//! Writes an empty primary HDU followed by one image extension per
//! [`ImageHdu`]. Headers are padded with blank cards and data units with
//! zero bytes to whole blocks.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{FitsError, Result};
use crate::header::{BLOCK_LEN, CARD_LEN, HeaderValue, align_to_block, build_card, build_keyword_card};
use crate::types::{Bitpix, ImageHdu};

/// FITS file writer.
pub struct FitsWriter<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> FitsWriter<W> {
    /// Create a new writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Write a complete file: primary HDU plus the given extensions.
    pub fn write_file(mut self, images: &[ImageHdu]) -> Result<()> {
        self.write_primary(!images.is_empty())?;
        for image in images {
            self.write_image(image)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn write_primary(&mut self, extend: bool) -> Result<()> {
        let cards = vec![
            build_card("SIMPLE", &HeaderValue::Logical(true), Some("conforms to FITS standard")),
            build_card("BITPIX", &HeaderValue::Integer(8), None),
            build_card("NAXIS", &HeaderValue::Integer(0), None),
            build_card("EXTEND", &HeaderValue::Logical(extend), None),
        ];
        self.write_header(&cards)
    }

    fn write_image(&mut self, image: &ImageHdu) -> Result<()> {
        let expected = image.pixel_count();
        if expected != image.values.len() {
            return Err(FitsError::ShapeMismatch {
                name: image.name.clone(),
                expected,
                actual: image.values.len(),
            });
        }

        let mut cards = vec![
            build_card("XTENSION", &HeaderValue::Text("IMAGE".to_string()), Some("image extension")),
            build_card("BITPIX", &HeaderValue::Integer(image.bitpix.code()), None),
            build_card("NAXIS", &HeaderValue::Integer(image.axes.len() as i64), None),
        ];
        for (idx, len) in image.axes.iter().enumerate() {
            cards.push(build_card(
                &format!("NAXIS{}", idx + 1),
                &HeaderValue::Integer(*len as i64),
                None,
            ));
        }
        cards.push(build_card("PCOUNT", &HeaderValue::Integer(0), None));
        cards.push(build_card("GCOUNT", &HeaderValue::Integer(1), None));
        if !image.scaling.is_identity() {
            cards.push(build_card("BSCALE", &HeaderValue::Real(image.scaling.scale), None));
            cards.push(build_card("BZERO", &HeaderValue::Real(image.scaling.zero), None));
        }
        cards.push(build_card(
            "EXTNAME",
            &HeaderValue::Text(image.name.clone()),
            Some("extension name"),
        ));
        self.write_header(&cards)?;
        self.write_data(image)
    }

    fn write_header(&mut self, cards: &[[u8; CARD_LEN]]) -> Result<()> {
        let mut written = 0usize;
        for card in cards {
            self.writer.write_all(card)?;
            written += CARD_LEN;
        }
        self.writer.write_all(&build_keyword_card("END", ""))?;
        written += CARD_LEN;
        let padding = align_to_block(written) - written;
        self.writer.write_all(&vec![b' '; padding])?;
        Ok(())
    }

    fn write_data(&mut self, image: &ImageHdu) -> Result<()> {
        let mut written = 0usize;
        for value in &image.values {
            let stored = if image.scaling.is_identity() {
                *value
            } else {
                image.scaling.invert(*value)
            };
            written += encode_one(&mut self.writer, stored, image.bitpix)?;
        }
        let padding = align_to_block(written) - written;
        self.writer.write_all(&vec![0u8; padding])?;
        Ok(())
    }
}

impl FitsWriter<File> {
    /// Create a FITS file for writing, replacing any existing file.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

/// Write image extensions to a new FITS file.
pub fn write_fits(path: &Path, images: &[ImageHdu]) -> Result<()> {
    FitsWriter::create(path)?.write_file(images)
}

/// Encode one stored value, returning the byte count written.
///
/// Integer encodings round to nearest and saturate at the type bounds.
fn encode_one<W: Write>(writer: &mut W, stored: f64, bitpix: Bitpix) -> Result<usize> {
    match bitpix {
        Bitpix::U8 => writer.write_all(&[stored.round() as u8])?,
        Bitpix::I16 => writer.write_all(&(stored.round() as i16).to_be_bytes())?,
        Bitpix::I32 => writer.write_all(&(stored.round() as i32).to_be_bytes())?,
        Bitpix::I64 => writer.write_all(&(stored.round() as i64).to_be_bytes())?,
        Bitpix::F32 => writer.write_all(&(stored as f32).to_be_bytes())?,
        Bitpix::F64 => writer.write_all(&stored.to_be_bytes())?,
    }
    Ok(bitpix.bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_is_block_aligned() {
        let mut buffer = Vec::new();
        FitsWriter::new(&mut buffer)
            .write_file(&[ImageHdu::new("DATA", vec![1.0, 2.0, 3.0])])
            .unwrap();
        assert_eq!(buffer.len() % BLOCK_LEN, 0);
        // primary header + extension header + one data block
        assert_eq!(buffer.len(), 3 * BLOCK_LEN);
        assert!(buffer.starts_with(b"SIMPLE  =                    T"));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let mut buffer = Vec::new();
        let image = ImageHdu::new("DATA", vec![1.0, 2.0]).with_axes(vec![3]);
        let result = FitsWriter::new(&mut buffer).write_file(&[image]);
        assert!(matches!(result, Err(FitsError::ShapeMismatch { .. })));
    }
}
