//! Core library for extracting structured data from Apple-style receipt
//! emails.
//!
//! The pipeline is: parse the HTML body, detect which of the two known
//! layouts produced it, extract a [`ReceiptDraft`] structurally, classify
//! each line item from its description fragments, and reconcile the printed
//! tax across the items. The result is a [`Receipt`] that is identical
//! regardless of which layout the email used.
//!
//! ```no_run
//! use apprec_core::{receipt_from_html, TaxConfig};
//!
//! let html = std::fs::read_to_string("receipt.html")?;
//! let receipt = receipt_from_html(&html, &TaxConfig::default())?;
//! println!("{} items, tax {}", receipt.items.len(), receipt.tax);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classify;
pub mod dates;
pub mod email;
pub mod error;
pub mod models;
pub mod money;
pub mod tax;

pub use email::{
    detect_layout, receipt_from_document, receipt_from_html, BodyKind, FormatOne, FormatTwo,
    ItemDraft, LayoutParser, ReceiptDraft,
};
pub use error::{ApprecError, ParseError, ReconcileError, Result};
pub use models::config::{ApprecConfig, StorageConfig, TaxConfig};
pub use models::receipt::{Item, ItemCategory, ItemType, Receipt, SubscriptionCadence};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
