//! Receipt email layout detection and structural extraction.
//!
//! Two generations of receipt markup exist. The older one is positional: a
//! fixed tree of three sections walked by child index ([`FormatOne`]). The
//! newer one is label-driven: fields and storefront sections are located by
//! searching for their text labels ([`FormatTwo`]). [`detect_layout`] probes
//! a single sentinel to pick between them, and both populate the same
//! [`ReceiptDraft`] so downstream classification and reconciliation never
//! know which layout a receipt came from.

pub mod dom;
mod format_one;
mod format_two;
mod patterns;

pub use format_one::FormatOne;
pub use format_two::FormatTwo;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use scraper::Html;
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::models::config::TaxConfig;
use crate::models::receipt::{Item, ItemCategory, Receipt};
use crate::tax;

/// Sentinel text marking the positional layout: the first top-level section
/// of the older markup is a banner reading exactly "Receipt".
pub const FORMAT_ONE_SENTINEL: &str = "receipt";

/// MIME body routing at the mail-retrieval boundary. Only HTML bodies enter
/// the extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Html,
    Plain,
    Unknown,
}

impl BodyKind {
    pub fn from_mime(content_type: &str) -> Self {
        let normalized = content_type.trim().to_lowercase();
        if normalized.starts_with("text/html") {
            BodyKind::Html
        } else if normalized.starts_with("text/plain") {
            BodyKind::Plain
        } else {
            BodyKind::Unknown
        }
    }
}

/// Mutable carrier for a line item while a layout parser walks the document.
#[derive(Debug, Clone, Default)]
pub struct ItemDraft {
    pub category: ItemCategory,
    pub fragments: Vec<String>,
    pub purchase_amount: Decimal,
    pub other_amount: Decimal,
    pub image_url: String,
}

/// Mutable carrier for a receipt while a layout parser walks the document.
/// Every field is optional; [`ReceiptDraft::finalize`] applies defaults and
/// runs reconciliation.
#[derive(Debug, Clone, Default)]
pub struct ReceiptDraft {
    pub receipt_date: Option<NaiveDate>,
    pub order_id: Option<String>,
    pub doc_nbr: Option<String>,
    pub apple_account: Option<String>,
    pub subtotal: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub total: Option<Decimal>,
    pub card: Option<String>,
    pub items: Vec<ItemDraft>,
}

impl ReceiptDraft {
    /// Build the final [`Receipt`]: construct items, reconcile tax exactly
    /// once, and derive the subtotal when the document reported none.
    pub fn finalize(self, config: &TaxConfig) -> Result<Receipt> {
        let mut receipt = Receipt {
            receipt_date: self.receipt_date,
            order_id: self.order_id.unwrap_or_default(),
            doc_nbr: self.doc_nbr.unwrap_or_default(),
            apple_account: self.apple_account.unwrap_or_default(),
            subtotal: self.subtotal.unwrap_or(Decimal::ZERO),
            tax: self.tax.unwrap_or(Decimal::ZERO),
            total: self.total.unwrap_or(Decimal::ZERO),
            card: self.card.map(|c| c.replace('\u{00a0}', " ")),
            items: Vec::with_capacity(self.items.len()),
        };

        for draft in self.items {
            receipt.items.push(Item::from_fragments(
                draft.category,
                &draft.fragments,
                draft.purchase_amount,
                draft.other_amount,
                draft.image_url,
            ));
        }

        let order_id = receipt.order_id.clone();
        tax::reconcile(&order_id, &mut receipt.items, receipt.tax, config)?;

        if receipt.subtotal.is_zero() {
            receipt.subtotal = receipt.total - receipt.tax;
        }

        Ok(receipt)
    }
}

pub(crate) fn malformed(context: impl Into<String>) -> crate::error::ApprecError {
    ParseError::MalformedDocument {
        context: context.into(),
    }
    .into()
}

/// A layout-specific structural extractor.
pub trait LayoutParser {
    fn populate(&self, draft: &mut ReceiptDraft) -> Result<()>;
}

/// Pick the layout parser for a parsed document.
///
/// Probes the first `<div>` child of the outermost `<div>`: sentinel text
/// selects the positional layout, anything else the label-search layout.
/// A document without that structure is malformed.
pub fn detect_layout<'a>(doc: &'a Html) -> Result<Box<dyn LayoutParser + 'a>> {
    let outer = dom::first_element(doc, "div").ok_or_else(|| ParseError::MalformedDocument {
        context: "document contains no <div>".to_string(),
    })?;

    let top = dom::direct_children(outer, &["div"]);
    let first = top.first().ok_or_else(|| ParseError::MalformedDocument {
        context: "outermost <div> has no <div> children".to_string(),
    })?;

    if dom::full_text(*first).to_lowercase() == FORMAT_ONE_SENTINEL {
        debug!("detected positional layout");
        Ok(Box::new(FormatOne::new(doc)))
    } else {
        debug!("detected label-search layout");
        Ok(Box::new(FormatTwo::new(doc)))
    }
}

/// Extract and reconcile a receipt from raw HTML.
pub fn receipt_from_html(html: &str, config: &TaxConfig) -> Result<Receipt> {
    let doc = Html::parse_document(html);
    receipt_from_document(&doc, config)
}

/// Extract and reconcile a receipt from an already parsed document.
///
/// Interchangeable with [`receipt_from_html`]; callers that already hold a
/// parsed tree (a mail fetcher, a test) skip the reparse.
pub fn receipt_from_document(doc: &Html, config: &TaxConfig) -> Result<Receipt> {
    let parser = detect_layout(doc)?;
    let mut draft = ReceiptDraft::default();
    parser.populate(&mut draft)?;
    draft.finalize(config)
}
