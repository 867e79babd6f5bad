//! Test helper utilities
//!
//! Shared fixtures for the songcat-ingest integration tests

#![allow(dead_code)]

pub mod db_utils;
pub mod stores;

pub use db_utils::{count_rows, create_test_pool, record, similar};
pub use stores::{CountingStore, FailingStore, LossyStore};
