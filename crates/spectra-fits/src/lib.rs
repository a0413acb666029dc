//! Minimal FITS reader and writer for spectral data products.
//!
//! Spectra are stored as image extensions located by their `EXTNAME`
//! (for example `DATA` for flux and `ERR` for its uncertainty). This crate
//! reads such extensions into `f64` arrays and writes them back out.
//!
//! # Features
//!
//! - Header card parsing (logical, integer, real, string values and comments)
//! - All standard `BITPIX` encodings with `BSCALE`/`BZERO` and `BLANK`
//! - HDU lookup by name with seeking over unrelated data units
//! - Image-extension writer for producing test and sample files
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use spectra_fits::{ImageHdu, read_image, write_fits};
//!
//! write_fits(
//!     Path::new("spec.fits"),
//!     &[
//!         ImageHdu::new("DATA", vec![1.0, 2.0, 3.0]),
//!         ImageHdu::new("ERR", vec![0.5, 0.5, 0.5]),
//!     ],
//! )
//! .unwrap();
//!
//! let flux = read_image(Path::new("spec.fits"), "DATA").unwrap();
//! assert_eq!(flux.values, vec![1.0, 2.0, 3.0]);
//! ```

mod error;
pub mod header;
mod reader;
mod types;
mod writer;

pub use error::{FitsError, Result};

pub use types::{Bitpix, HduKind, ImageData, ImageHdu, Scaling};

pub use reader::{FitsReader, HduInfo, read_image, read_images};

pub use writer::{FitsWriter, write_fits};
