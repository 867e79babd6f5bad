//! # songcat common library
//!
//! Shared code for the songcat crates:
//! - Error type
//! - Bootstrap configuration loading
//! - Catalog database provisioning (pool + schema)

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
