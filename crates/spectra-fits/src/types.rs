//! Core FITS types.

use std::fmt;

use crate::error::{FitsError, Result};

/// Pixel encoding declared by `BITPIX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitpix {
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Signed 64-bit integer.
    I64,
    /// IEEE single precision.
    F32,
    /// IEEE double precision.
    F64,
}

impl Bitpix {
    /// Bytes per sample.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::I16 => 2,
            Self::I32 | Self::F32 => 4,
            Self::I64 | Self::F64 => 8,
        }
    }

    /// Header value for this encoding.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::U8 => 8,
            Self::I16 => 16,
            Self::I32 => 32,
            Self::I64 => 64,
            Self::F32 => -32,
            Self::F64 => -64,
        }
    }

    /// Whether samples are integers (and therefore subject to `BLANK`).
    #[must_use]
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::F32 | Self::F64)
    }
}

impl TryFrom<i64> for Bitpix {
    type Error = FitsError;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            8 => Ok(Self::U8),
            16 => Ok(Self::I16),
            32 => Ok(Self::I32),
            64 => Ok(Self::I64),
            -32 => Ok(Self::F32),
            -64 => Ok(Self::F64),
            other => Err(FitsError::UnsupportedBitpix(other)),
        }
    }
}

/// Kind of header-data unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HduKind {
    /// First HDU of the file (`SIMPLE = T`).
    Primary,
    /// `XTENSION = 'IMAGE'`.
    Image,
    /// `XTENSION = 'BINTABLE'`.
    BinTable,
    /// `XTENSION = 'TABLE'` (ASCII table).
    Table,
    /// Anything else.
    Other(String),
}

impl HduKind {
    /// Whether the data unit is a pixel array.
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Primary | Self::Image)
    }
}

impl fmt::Display for HduKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "PRIMARY"),
            Self::Image => write!(f, "IMAGE"),
            Self::BinTable => write!(f, "BINTABLE"),
            Self::Table => write!(f, "TABLE"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Linear scaling from stored to physical values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    /// `BSCALE`, default 1.
    pub scale: f64,
    /// `BZERO`, default 0.
    pub zero: f64,
}

impl Default for Scaling {
    fn default() -> Self {
        Self {
            scale: 1.0,
            zero: 0.0,
        }
    }
}

impl Scaling {
    /// Whether applying this scaling changes values.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.zero == 0.0
    }

    /// Stored to physical.
    #[must_use]
    pub fn apply(&self, raw: f64) -> f64 {
        self.zero + self.scale * raw
    }

    /// Physical to stored.
    #[must_use]
    pub fn invert(&self, physical: f64) -> f64 {
        (physical - self.zero) / self.scale
    }
}

/// Pixel data read from one image HDU.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Extension name the data was found under.
    pub name: String,
    /// Axis lengths, `NAXIS1` first.
    pub axes: Vec<usize>,
    /// Physical values in storage order.
    pub values: Vec<f64>,
}

impl ImageData {
    /// Number of pixels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the image holds no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Image extension to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHdu {
    /// Value for `EXTNAME`.
    pub name: String,
    /// Axis lengths, `NAXIS1` first.
    pub axes: Vec<usize>,
    /// Physical values in storage order.
    pub values: Vec<f64>,
    /// Storage encoding.
    pub bitpix: Bitpix,
    /// Scaling written as `BSCALE`/`BZERO` when not the identity.
    pub scaling: Scaling,
}

impl ImageHdu {
    /// One-dimensional double-precision image.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            axes: vec![values.len()],
            values,
            bitpix: Bitpix::F64,
            scaling: Scaling::default(),
        }
    }

    /// Set the axis lengths.
    #[must_use]
    pub fn with_axes(mut self, axes: Vec<usize>) -> Self {
        self.axes = axes;
        self
    }

    /// Set the storage encoding.
    #[must_use]
    pub fn with_bitpix(mut self, bitpix: Bitpix) -> Self {
        self.bitpix = bitpix;
        self
    }

    /// Set `BSCALE` and `BZERO`.
    #[must_use]
    pub fn with_scaling(mut self, scale: f64, zero: f64) -> Self {
        self.scaling = Scaling { scale, zero };
        self
    }

    /// Pixel count implied by the axes.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        if self.axes.is_empty() {
            0
        } else {
            self.axes.iter().product()
        }
    }
}
