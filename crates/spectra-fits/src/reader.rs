//! FITS file reader.
//!
//! Walks header-data units in file order, seeking past data units that are
//! not requested, and decodes image data into physical `f64` values.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{FitsError, Result};
use crate::header::{BLOCK_LEN, CARD_LEN, Header, align_to_block, parse_card};
use crate::types::{Bitpix, HduKind, ImageData, Scaling};

/// Summary of one HDU, as listed by [`FitsReader::hdus`].
#[derive(Debug, Clone, PartialEq)]
pub struct HduInfo {
    /// Zero-based position in the file.
    pub index: usize,
    /// Extension name (`PRIMARY` for an unnamed primary HDU).
    pub name: Option<String>,
    /// HDU kind.
    pub kind: HduKind,
    /// Axis lengths.
    pub axes: Vec<usize>,
}

/// FITS file reader.
pub struct FitsReader<R: Read + Seek> {
    reader: BufReader<R>,
    offset: u64,
}

impl<R: Read + Seek> FitsReader<R> {
    /// Create a new reader positioned at the start of the stream.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            offset: 0,
        }
    }

    /// List every HDU in the file.
    pub fn hdus(&mut self) -> Result<Vec<HduInfo>> {
        self.rewind()?;
        let mut hdus = Vec::new();
        while let Some(header) = self.next_header(hdus.len())? {
            hdus.push(HduInfo {
                index: header.index,
                name: header.name(),
                kind: header.kind(),
                axes: header.axes()?,
            });
            self.skip_data(&header)?;
        }
        Ok(hdus)
    }

    /// Read the image HDU named `name`.
    ///
    /// The first HDU whose `EXTNAME` matches (case-insensitive) is used. A
    /// matching HDU that is not an image is an error rather than a miss.
    pub fn read_image(&mut self, name: &str) -> Result<ImageData> {
        let header = self.seek_hdu(name)?;
        let kind = header.kind();
        if !kind.is_image() {
            return Err(FitsError::UnsupportedHdu {
                name: name.to_string(),
                kind: kind.to_string(),
            });
        }

        let bitpix = header.bitpix()?;
        let axes = header.axes()?;
        let scaling = Scaling {
            scale: header.real("BSCALE")?.unwrap_or(1.0),
            zero: header.real("BZERO")?.unwrap_or(0.0),
        };
        let blank = if bitpix.is_integer() {
            header.integer("BLANK")?
        } else {
            None
        };

        let bytes = self.read_data(header.data_len()?)?;
        let values = decode_samples(&bytes, bitpix, scaling, blank);

        Ok(ImageData {
            name: header.name().unwrap_or_else(|| name.to_string()),
            axes,
            values,
        })
    }

    /// Position the stream at the data unit of the HDU named `name`.
    fn seek_hdu(&mut self, name: &str) -> Result<Header> {
        self.rewind()?;
        let mut index = 0usize;
        while let Some(header) = self.next_header(index)? {
            if header.is_named(name) {
                return Ok(header);
            }
            self.skip_data(&header)?;
            index += 1;
        }
        Err(FitsError::hdu_not_found(name))
    }

    fn rewind(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.offset = 0;
        Ok(())
    }

    /// Read the next header, or `None` at a clean end of file.
    ///
    /// Anything after the last HDU that does not start with `XTENSION` is
    /// treated as trailing padding.
    fn next_header(&mut self, index: usize) -> Result<Option<Header>> {
        let mut cards = Vec::new();
        let mut first_block = true;
        loop {
            let Some(block) = self.read_block()? else {
                if first_block {
                    return Ok(None);
                }
                return Err(FitsError::Truncated {
                    offset: self.offset,
                });
            };
            if first_block {
                let expected: &[u8] = if index == 0 { b"SIMPLE  " } else { b"XTENSION" };
                if !block.starts_with(expected) {
                    if index == 0 {
                        return Err(FitsError::invalid_format("missing SIMPLE card"));
                    }
                    return Ok(None);
                }
                first_block = false;
            }
            for record in block.chunks_exact(CARD_LEN) {
                let card = parse_card(record);
                if card.is_end() {
                    return Ok(Some(Header::new(index, cards)));
                }
                if !card.keyword.is_empty() {
                    cards.push(card);
                }
            }
        }
    }

    /// Read one block, or `None` if the stream is exhausted before it starts.
    fn read_block(&mut self) -> Result<Option<[u8; BLOCK_LEN]>> {
        let mut block = [0u8; BLOCK_LEN];
        let mut filled = 0usize;
        while filled < BLOCK_LEN {
            match self.reader.read(&mut block[filled..]) {
                Ok(0) => break,
                Ok(read) => filled += read,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.offset += filled as u64;
        match filled {
            0 => Ok(None),
            BLOCK_LEN => Ok(Some(block)),
            _ => Err(FitsError::Truncated {
                offset: self.offset,
            }),
        }
    }

    fn skip_data(&mut self, header: &Header) -> Result<()> {
        let padded = align_to_block(header.data_len()?);
        let padded = i64::try_from(padded).map_err(|_| FitsError::DataOverflow)?;
        self.reader.seek_relative(padded)?;
        self.offset += padded as u64;
        Ok(())
    }

    /// Read a data unit of `len` bytes.
    ///
    /// The buffer grows with the bytes actually present, so a header that
    /// declares more data than the file holds fails as truncated instead of
    /// allocating the declared size up front.
    fn read_data(&mut self, len: usize) -> Result<Vec<u8>> {
        let wanted = u64::try_from(len).map_err(|_| FitsError::DataOverflow)?;
        let mut bytes = Vec::new();
        let read = (&mut self.reader).take(wanted).read_to_end(&mut bytes)?;
        self.offset += read as u64;
        if read < len {
            return Err(FitsError::Truncated {
                offset: self.offset,
            });
        }
        Ok(bytes)
    }
}

impl FitsReader<File> {
    /// Open a FITS file for reading.
    ///
    /// # Arguments
    /// * `path` - Path to the FITS file
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                FitsError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                FitsError::Io(e)
            }
        })?;
        Ok(Self::new(file))
    }
}

/// Read one named image HDU from a file.
///
/// The file is closed before this returns.
pub fn read_image(path: &Path, name: &str) -> Result<ImageData> {
    FitsReader::open(path)?.read_image(name)
}

/// Read several named image HDUs from one file, in the order requested.
pub fn read_images(path: &Path, names: &[&str]) -> Result<Vec<ImageData>> {
    let mut reader = FitsReader::open(path)?;
    names.iter().map(|name| reader.read_image(name)).collect()
}

/// Decode big-endian samples into physical values.
fn decode_samples(bytes: &[u8], bitpix: Bitpix, scaling: Scaling, blank: Option<i64>) -> Vec<f64> {
    let width = bitpix.bytes();
    bytes
        .chunks_exact(width)
        .map(|chunk| {
            let (raw, is_blank) = decode_one(chunk, bitpix, blank);
            if is_blank {
                f64::NAN
            } else if scaling.is_identity() {
                raw
            } else {
                scaling.apply(raw)
            }
        })
        .collect()
}

fn decode_one(chunk: &[u8], bitpix: Bitpix, blank: Option<i64>) -> (f64, bool) {
    let integer = |value: i64| (value as f64, blank == Some(value));
    match bitpix {
        Bitpix::U8 => integer(i64::from(chunk[0])),
        Bitpix::I16 => integer(i64::from(i16::from_be_bytes([chunk[0], chunk[1]]))),
        Bitpix::I32 => integer(i64::from(i32::from_be_bytes([
            chunk[0], chunk[1], chunk[2], chunk[3],
        ]))),
        Bitpix::I64 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            integer(i64::from_be_bytes(buf))
        }
        Bitpix::F32 => (
            f64::from(f32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])),
            false,
        ),
        Bitpix::F64 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            (f64::from_be_bytes(buf), false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_i16_with_scaling() {
        let bytes = [0x00, 0x02, 0xff, 0xfe];
        let scaling = Scaling {
            scale: 0.5,
            zero: 10.0,
        };
        let values = decode_samples(&bytes, Bitpix::I16, scaling, None);
        assert_eq!(values, vec![11.0, 9.0]);
    }

    #[test]
    fn test_decode_blank_is_nan() {
        let bytes = [0x00, 0x00, 0x00, 0x07, 0xff, 0xff, 0xff, 0xff];
        let values = decode_samples(&bytes, Bitpix::I32, Scaling::default(), Some(-1));
        assert_eq!(values[0], 7.0);
        assert!(values[1].is_nan());
    }

    #[test]
    fn test_decode_f32_and_f64() {
        let f32_bytes = 1.5f32.to_be_bytes();
        assert_eq!(
            decode_samples(&f32_bytes, Bitpix::F32, Scaling::default(), None),
            vec![1.5]
        );
        let f64_bytes = (-2.25f64).to_be_bytes();
        assert_eq!(
            decode_samples(&f64_bytes, Bitpix::F64, Scaling::default(), None),
            vec![-2.25]
        );
    }

    #[test]
    fn test_decode_u8() {
        let values = decode_samples(&[0, 255], Bitpix::U8, Scaling::default(), None);
        assert_eq!(values, vec![0.0, 255.0]);
    }
}
