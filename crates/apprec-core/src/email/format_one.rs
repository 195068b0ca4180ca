//! Positional layout: three fixed sections walked by child index.
//!
//! The second top-level `<div>` holds exactly three sections: header fields,
//! a single-item table, and the totals/payment block. Field labels in the
//! header and totals sections are closed-world: an unrecognized label means
//! the layout has changed underneath us and the document must be rejected,
//! not silently half-parsed.

use rust_decimal::Decimal;
use scraper::{ElementRef, Html};

use super::{dom, malformed, ItemDraft, LayoutParser, ReceiptDraft};
use crate::dates::parse_date_loose;
use crate::error::{ParseError, Result};
use crate::models::receipt::ItemCategory;
use crate::money::parse_dollar;

const TRAILING_LINK_TEXT: &str = "report a problem";

pub struct FormatOne<'a> {
    doc: &'a Html,
}

impl<'a> FormatOne<'a> {
    pub fn new(doc: &'a Html) -> Self {
        Self { doc }
    }

    fn sections(&self) -> Result<Vec<ElementRef<'a>>> {
        let outer = dom::first_element(self.doc, "div")
            .ok_or_else(|| malformed("document contains no <div>"))?;
        let top = dom::direct_children(outer, &["div"]);
        let body = top
            .get(1)
            .ok_or_else(|| malformed("expected a content <div> after the banner"))?;

        Ok(dom::direct_children(*body, &["div", "table"]))
    }

    /// Section 1: receipt date plus label/value field rows.
    fn header_section(&self, section: ElementRef<'a>, draft: &mut ReceiptDraft) -> Result<()> {
        let date_el = dom::first_descendant(section, "p")
            .ok_or_else(|| malformed("header section has no date paragraph"))?;
        draft.receipt_date = parse_date_loose(&dom::full_text(date_el));

        for row in dom::direct_children(section, &["div"]) {
            let pair = dom::direct_children(row, &["p"]);
            let (Some(label_el), Some(value_el)) = (pair.first(), pair.get(1)) else {
                return Err(malformed("header field row is not a label/value pair"));
            };

            let raw = dom::full_text(*label_el).to_lowercase();
            let label = raw.strip_suffix(':').unwrap_or(&raw);
            let value = dom::full_text(*value_el);

            match label {
                "order id" => draft.order_id = Some(value),
                "document" => draft.doc_nbr = Some(value),
                "apple account" => draft.apple_account = Some(value),
                other => {
                    return Err(ParseError::UnknownField {
                        section: "header".to_string(),
                        label: other.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Section 2: a single line item split across three table cells.
    fn item_section(&self, section: ElementRef<'a>, draft: &mut ReceiptDraft) -> Result<()> {
        let cells = dom::descendant_elements(section, "td");
        let (Some(image_cell), Some(desc_cell), Some(amount_cell)) =
            (cells.first(), cells.get(1), cells.get(2))
        else {
            return Err(malformed("item section does not have three cells"));
        };

        let image_url = dom::first_descendant(*image_cell, "img")
            .and_then(|img| img.value().attr("src"))
            .ok_or_else(|| malformed("item cell has no artwork <img>"))?
            .to_string();

        let mut fragments = dom::text_fragments(*desc_cell);
        if fragments
            .last()
            .is_some_and(|f| f.eq_ignore_ascii_case(TRAILING_LINK_TEXT))
        {
            fragments.pop();
        }

        draft.items.push(ItemDraft {
            category: ItemCategory::None,
            fragments,
            purchase_amount: parse_dollar(&dom::full_text(*amount_cell)),
            other_amount: Decimal::ZERO,
            image_url,
        });

        Ok(())
    }

    /// Section 3: subtotal/tax amounts, the payment instrument, and the
    /// grand total.
    fn totals_section(&self, section: ElementRef<'a>, draft: &mut ReceiptDraft) -> Result<()> {
        let wrapper = dom::first_descendant(section, "div")
            .ok_or_else(|| malformed("totals section is empty"))?;
        let block = dom::direct_children(wrapper, &["div"])
            .get(1)
            .copied()
            .ok_or_else(|| malformed("totals section has no payment block"))?;

        let amounts_box = dom::first_descendant(block, "div")
            .ok_or_else(|| malformed("payment block has no amounts box"))?;
        let labels = dom::direct_children(amounts_box, &["p"]);
        let values = dom::direct_children(amounts_box, &["div"]);

        for (label_el, value_el) in labels.iter().zip(values.iter()) {
            let label = dom::full_text(*label_el).to_lowercase();
            let amount = parse_dollar(&dom::full_text(*value_el));

            match label.as_str() {
                "subtotal" => draft.subtotal = Some(amount),
                "tax" => draft.tax = Some(amount),
                other => {
                    return Err(ParseError::UnknownField {
                        section: "totals".to_string(),
                        label: other.to_string(),
                    }
                    .into());
                }
            }
        }

        let card_el = dom::direct_children(block, &["p"])
            .first()
            .copied()
            .ok_or_else(|| malformed("payment block has no payment instrument"))?;
        draft.card = Some(dom::full_text(card_el));

        let total_el = dom::direct_children(block, &["div"])
            .get(1)
            .copied()
            .ok_or_else(|| malformed("payment block has no grand total"))?;
        draft.total = Some(parse_dollar(&dom::full_text(total_el)));

        Ok(())
    }
}

impl LayoutParser for FormatOne<'_> {
    fn populate(&self, draft: &mut ReceiptDraft) -> Result<()> {
        let sections = self.sections()?;
        let (Some(header), Some(item), Some(totals)) =
            (sections.first(), sections.get(1), sections.get(2))
        else {
            return Err(malformed(format!(
                "expected 3 sections, found {}",
                sections.len()
            )));
        };

        self.header_section(*header, draft)?;
        self.item_section(*item, draft)?;
        self.totals_section(*totals, draft)?;

        Ok(())
    }
}
