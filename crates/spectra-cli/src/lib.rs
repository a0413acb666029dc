//! CLI library components for select-spectra.

pub mod cli;
pub mod logging;
pub mod settings;
pub mod summary;
