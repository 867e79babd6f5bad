//! Catalog database provisioning

pub mod init;

pub use init::*;
