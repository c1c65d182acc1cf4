//! Shared library for the AEP ETL workspace
//!
//! Holds the pieces both the pipeline binary and its tests need: the common
//! error type, configuration resolution, the canonical data model, the
//! supported year range and country universe, and slug derivation.

pub mod config;
pub mod constants;
pub mod error;
pub mod slug;
pub mod types;

pub use error::{Error, Result};
