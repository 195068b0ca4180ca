//! Error types for the apprec-core library.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the apprec library.
#[derive(Error, Debug)]
pub enum ApprecError {
    /// Structural parse failure in a receipt document.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Tax reconciliation failure.
    #[error("reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while extracting fields from a receipt document.
///
/// These are fatal for the document: the structure did not match either
/// known layout, or a closed-world field map saw a label it does not know.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The document does not have the structure either layout expects.
    #[error("malformed document: {context}")]
    MalformedDocument { context: String },

    /// A field label fell outside the closed set for its section.
    #[error("unknown field label {label:?} in {section} section")]
    UnknownField { section: String, label: String },
}

/// Errors raised while attributing the receipt tax to line items.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Tax was charged but no item is taxable and no single item's
    /// hypothetical tax matches the charged amount exactly.
    #[error(
        "receipt {order_id}: tax of {tax} charged but no taxable item and no \
         single item accounts for the full amount"
    )]
    Unattributable { order_id: String, tax: Decimal },

    /// An adjustment is needed but no item carries a nonzero computed tax.
    #[error(
        "receipt {order_id}: adjustment of {adjustment} required (receipt tax \
         {tax}, computed {computed}) but no item carries tax to adjust"
    )]
    NothingToAdjust {
        order_id: String,
        tax: Decimal,
        computed: Decimal,
        adjustment: Decimal,
    },

    /// The adjustment exceeds the drift threshold and more than one item is
    /// taxable, so the correction cannot be attributed to a single item.
    #[error(
        "receipt {order_id}: adjustment of {adjustment} exceeds the drift \
         threshold across {taxable_items} taxable items"
    )]
    ExcessiveDrift {
        order_id: String,
        adjustment: Decimal,
        taxable_items: usize,
    },
}

/// Result type for the apprec library.
pub type Result<T> = std::result::Result<T, ApprecError>;
