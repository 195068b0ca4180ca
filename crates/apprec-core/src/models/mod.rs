//! Data structures for receipts, items, and configuration.

pub mod config;
pub mod receipt;
