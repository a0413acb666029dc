//! FITS header parsing.
//!
//! A header is a sequence of 2880-byte blocks, each holding 36 cards, and is
//! terminated by the `END` card. This module turns those cards into a
//! [`Header`] and derives the layout of the data unit that follows it.

pub mod card;

pub use card::{CARD_LEN, Card, HeaderValue, KEYWORD_LEN, build_card, build_keyword_card, parse_card};

use crate::error::{FitsError, Result};
use crate::types::{Bitpix, HduKind};

/// Block length in bytes.
pub const BLOCK_LEN: usize = 2880;

/// Round a byte count up to the next block boundary.
#[must_use]
pub const fn align_to_block(len: usize) -> usize {
    len.div_ceil(BLOCK_LEN) * BLOCK_LEN
}

/// Parsed header of one HDU.
#[derive(Debug, Clone, Default)]
pub struct Header {
    /// Zero-based position of the HDU in the file.
    pub index: usize,
    /// Cards in file order, excluding `END`.
    pub cards: Vec<Card>,
}

impl Header {
    /// Build a header from its cards.
    #[must_use]
    pub fn new(index: usize, cards: Vec<Card>) -> Self {
        Self { index, cards }
    }

    /// First value recorded for a keyword.
    #[must_use]
    pub fn get(&self, keyword: &str) -> Option<&HeaderValue> {
        self.cards
            .iter()
            .find(|card| card.keyword.eq_ignore_ascii_case(keyword))
            .and_then(|card| card.value.as_ref())
    }

    /// Optional integer keyword; a non-integer value is an error.
    pub fn integer(&self, keyword: &str) -> Result<Option<i64>> {
        match self.get(keyword) {
            None => Ok(None),
            Some(value) => value
                .as_integer()
                .map(Some)
                .ok_or_else(|| FitsError::invalid_keyword(keyword, value)),
        }
    }

    /// Mandatory integer keyword.
    pub fn required_integer(&self, keyword: &str) -> Result<i64> {
        self.integer(keyword)?
            .ok_or_else(|| FitsError::missing_keyword(keyword, self.index))
    }

    /// Optional real keyword; integers are accepted.
    pub fn real(&self, keyword: &str) -> Result<Option<f64>> {
        match self.get(keyword) {
            None => Ok(None),
            Some(value) => value
                .as_real()
                .map(Some)
                .ok_or_else(|| FitsError::invalid_keyword(keyword, value)),
        }
    }

    /// Optional string keyword.
    #[must_use]
    pub fn text(&self, keyword: &str) -> Option<&str> {
        self.get(keyword).and_then(HeaderValue::as_text)
    }

    /// HDU kind from the first card.
    #[must_use]
    pub fn kind(&self) -> HduKind {
        let Some(first) = self.cards.first() else {
            return HduKind::Other(String::new());
        };
        match first.keyword.as_str() {
            "SIMPLE" => HduKind::Primary,
            "XTENSION" => {
                let name = first
                    .value
                    .as_ref()
                    .and_then(HeaderValue::as_text)
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_uppercase();
                match name.as_str() {
                    "IMAGE" => HduKind::Image,
                    "BINTABLE" => HduKind::BinTable,
                    "TABLE" => HduKind::Table,
                    _ => HduKind::Other(name),
                }
            }
            other => HduKind::Other(other.to_string()),
        }
    }

    /// Extension name; the primary HDU is `PRIMARY` unless it names itself.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        if let Some(name) = self.text("EXTNAME") {
            return Some(name.trim().to_string());
        }
        (self.index == 0).then(|| "PRIMARY".to_string())
    }

    /// Whether the HDU answers to `name` (case-insensitive).
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name()
            .is_some_and(|own| own.eq_ignore_ascii_case(name.trim()))
    }

    /// Pixel type.
    pub fn bitpix(&self) -> Result<Bitpix> {
        Bitpix::try_from(self.required_integer("BITPIX")?)
    }

    /// Axis lengths `NAXIS1..NAXISn`.
    pub fn axes(&self) -> Result<Vec<usize>> {
        let naxis = self.required_integer("NAXIS")?;
        let naxis = usize::try_from(naxis)
            .ok()
            .filter(|count| *count <= 999)
            .ok_or_else(|| FitsError::invalid_keyword("NAXIS", naxis))?;
        let mut axes = Vec::with_capacity(naxis);
        for axis in 1..=naxis {
            let keyword = format!("NAXIS{axis}");
            let length = self.required_integer(&keyword)?;
            let length =
                usize::try_from(length).map_err(|_| FitsError::invalid_keyword(&keyword, length))?;
            axes.push(length);
        }
        Ok(axes)
    }

    /// Data unit size in bytes, before block padding.
    ///
    /// `|BITPIX| / 8 * GCOUNT * (PCOUNT + NAXIS1 * ... * NAXISn)`
    pub fn data_len(&self) -> Result<usize> {
        let axes = self.axes()?;
        if axes.is_empty() {
            return Ok(0);
        }
        let pixels = axes
            .iter()
            .try_fold(1usize, |acc, len| acc.checked_mul(*len))
            .ok_or(FitsError::DataOverflow)?;
        let pcount = self.non_negative("PCOUNT", 0)?;
        let gcount = self.non_negative("GCOUNT", 1)?;
        let sample_bytes = self.bitpix()?.bytes();
        pixels
            .checked_add(pcount)
            .and_then(|count| count.checked_mul(gcount))
            .and_then(|count| count.checked_mul(sample_bytes))
            .ok_or(FitsError::DataOverflow)
    }

    fn non_negative(&self, keyword: &str, default: usize) -> Result<usize> {
        match self.integer(keyword)? {
            None => Ok(default),
            Some(value) => {
                usize::try_from(value).map_err(|_| FitsError::invalid_keyword(keyword, value))
            }
        }
    }
}
