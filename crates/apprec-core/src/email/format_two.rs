//! Label-search layout: fields and sections located by their text labels.
//!
//! Nothing here is positional at the document level. Each field is found by
//! searching for a leaf `<span>` (or `<td>` for the grand total) whose text
//! matches the label, then reading the value from a fixed position relative
//! to it. Storefront sections ("App Store", "Apple TV", "Apple Services")
//! are each optional; a receipt carries only the sections it billed under.

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html};

use super::patterns::{
    HEADER_APPLE_SERVICES, HEADER_APPLE_TV, HEADER_APP_STORE, LABEL_APPLE_ACCOUNT, LABEL_APPLE_ID,
    LABEL_DATE, LABEL_DOCUMENT_NO, LABEL_ORDER_ID, LABEL_SUBTOTAL, LABEL_TAX, LABEL_TOTAL,
};
use super::{dom, malformed, ItemDraft, LayoutParser, ReceiptDraft};
use crate::dates::parse_date_loose;
use crate::error::Result;
use crate::models::receipt::ItemCategory;
use crate::money::parse_dollar;

/// Link texts interleaved with the description fragments.
const NOISE_FRAGMENTS: &[&str] = &["report a problem", "write a review"];

pub struct FormatTwo<'a> {
    doc: &'a Html,
}

impl<'a> FormatTwo<'a> {
    pub fn new(doc: &'a Html) -> Self {
        Self { doc }
    }

    /// Value held in the label's parent as a direct text node.
    fn label_own_text(&self, pattern: &Regex) -> String {
        dom::find_text_element(self.doc, "span", pattern)
            .and_then(dom::parent_element)
            .map(dom::own_text)
            .unwrap_or_default()
    }

    /// Value held in the span following the label within the same parent;
    /// when the parent holds a single span, the value is its second text
    /// fragment instead.
    fn label_sibling_text(&self, pattern: &Regex) -> String {
        let Some(label) = dom::find_text_element(self.doc, "span", pattern) else {
            return String::new();
        };
        let Some(parent) = dom::parent_element(label) else {
            return String::new();
        };

        let spans = dom::descendant_elements(parent, "span");
        if spans.len() < 2 {
            dom::text_fragments(parent).get(1).cloned().unwrap_or_default()
        } else {
            dom::full_text(spans[1])
        }
    }

    /// Amount held in the second span under the label's grandparent.
    /// Absent label resolves to zero.
    fn label_amount(&self, pattern: &Regex) -> Decimal {
        dom::find_text_element(self.doc, "span", pattern)
            .and_then(dom::parent_element)
            .and_then(dom::parent_element)
            .and_then(|block| dom::descendant_elements(block, "span").get(1).copied())
            .map(|span| parse_dollar(&dom::full_text(span)))
            .unwrap_or(Decimal::ZERO)
    }

    /// Amount held in the third cell of the label's table row.
    fn row_amount(&self, pattern: &Regex) -> Decimal {
        dom::find_text_element(self.doc, "td", pattern)
            .and_then(dom::parent_element)
            .and_then(|row| dom::descendant_elements(row, "td").get(2).copied())
            .map(|cell| parse_dollar(&dom::full_text(cell)))
            .unwrap_or(Decimal::ZERO)
    }

    /// Collect the item rows of one storefront section. An absent section
    /// contributes nothing; a present one must have the expected nesting.
    fn section_items(
        &self,
        header: &Regex,
        category: ItemCategory,
        draft: &mut ReceiptDraft,
    ) -> Result<()> {
        let Some(span) = dom::find_text_element(self.doc, "span", header) else {
            return Ok(());
        };

        let section = dom::parent_element(span)
            .and_then(dom::parent_element)
            .and_then(dom::parent_element)
            .ok_or_else(|| malformed("section header outside expected table nesting"))?;

        for row in dom::descendant_elements(section, "tr") {
            // Item rows span multiple cells; single-cell rows are headers
            // and separators.
            if dom::child_elements(row).len() > 1 {
                draft.items.push(self.item_details(category, row)?);
            }
        }

        Ok(())
    }

    fn item_details(&self, category: ItemCategory, row: ElementRef<'a>) -> Result<ItemDraft> {
        // Direct children only: the charged-amount cell nests its own table
        // and recursive collection would shift the indexes.
        let cells = dom::direct_children(row, &["td"]);
        let (Some(image_cell), Some(desc_cell), Some(amount_cell)) =
            (cells.first(), cells.get(1), cells.get(2))
        else {
            return Err(malformed("item row does not have its four cells"));
        };

        let image_url = dom::first_descendant(*image_cell, "img")
            .and_then(|img| img.value().attr("src"))
            .ok_or_else(|| malformed("item row has no artwork <img>"))?
            .to_string();

        let fragments = dom::text_fragments(*desc_cell)
            .into_iter()
            .filter(|f| {
                let lowered = f.to_lowercase();
                !NOISE_FRAGMENTS.contains(&lowered.as_str())
            })
            .collect();

        // The charged amount sits in a one-cell table nested in the third
        // column.
        let amount_span = dom::first_descendant(*amount_cell, "table")
            .and_then(|table| dom::first_descendant(table, "tr"))
            .and_then(|tr| dom::first_descendant(tr, "td"))
            .and_then(|td| dom::first_descendant(td, "span"))
            .ok_or_else(|| malformed("item row has no charged-amount span"))?;
        let purchase_amount = parse_dollar(&dom::full_text(amount_span));

        let other_amount = cells
            .get(3)
            .and_then(|cell| dom::first_descendant(*cell, "span"))
            .map(|span| parse_dollar(&dom::full_text(span)))
            .unwrap_or(Decimal::ZERO);

        Ok(ItemDraft {
            category,
            fragments,
            purchase_amount,
            other_amount,
            image_url,
        })
    }
}

impl LayoutParser for FormatTwo<'_> {
    fn populate(&self, draft: &mut ReceiptDraft) -> Result<()> {
        draft.receipt_date = parse_date_loose(&self.label_sibling_text(&LABEL_DATE));
        draft.order_id = Some(self.label_sibling_text(&LABEL_ORDER_ID));
        draft.doc_nbr = Some(self.label_own_text(&LABEL_DOCUMENT_NO));

        let mut account = self.label_own_text(&LABEL_APPLE_ACCOUNT);
        if account.is_empty() {
            // Older sends of this layout still label the account "Apple ID".
            account = self.label_own_text(&LABEL_APPLE_ID);
        }
        draft.apple_account = Some(account);

        self.section_items(&HEADER_APP_STORE, ItemCategory::App, draft)?;
        self.section_items(&HEADER_APPLE_TV, ItemCategory::Tv, draft)?;
        self.section_items(&HEADER_APPLE_SERVICES, ItemCategory::Service, draft)?;

        draft.subtotal = Some(self.label_amount(&LABEL_SUBTOTAL));
        draft.tax = Some(self.label_amount(&LABEL_TAX));
        draft.total = Some(self.row_amount(&LABEL_TOTAL));

        Ok(())
    }
}
