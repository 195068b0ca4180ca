//! Receipt and line-item data model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classify;
use crate::money;

/// Coarse storefront category a line item was billed under.
///
/// Only the label-search layout carries section headers; the positional
/// layout has a single uncategorized item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    #[default]
    None,
    App,
    Tv,
    Service,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::None => "none",
            ItemCategory::App => "app",
            ItemCategory::Tv => "tv",
            ItemCategory::Service => "service",
        }
    }
}

/// The closed set of recognized line-item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    MovieRental,
    MoviePurchase,
    InAppPurchase,
    InAppMovieRental,
    StreamingSubscription,
    SoftwareSubscription,
    ServiceSubscription,
    IndividualSubscription,
    /// Terminal fallthrough for unmatched fragment shapes; not an error.
    Unknown,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::MovieRental => "movie rental",
            ItemType::MoviePurchase => "movie purchase",
            ItemType::InAppPurchase => "in-app purchase",
            ItemType::InAppMovieRental => "in-app movie rental",
            ItemType::StreamingSubscription => "streaming subscription",
            ItemType::SoftwareSubscription => "software subscription",
            ItemType::ServiceSubscription => "service subscription",
            ItemType::IndividualSubscription => "individual subscription",
            ItemType::Unknown => "unknown",
        }
    }

    /// Whether this kind attracts sales tax.
    pub fn is_taxable(&self) -> bool {
        matches!(
            self,
            ItemType::InAppPurchase
                | ItemType::SoftwareSubscription
                | ItemType::ServiceSubscription
        )
    }
}

/// Billing cadence of a subscription item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionCadence {
    Monthly,
    SemiAnnual,
    Annual,
    /// Subscription recognized but cadence keyword absent.
    Unknown,
}

impl SubscriptionCadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionCadence::Monthly => "monthly",
            SubscriptionCadence::SemiAnnual => "semi-annual",
            SubscriptionCadence::Annual => "annual",
            SubscriptionCadence::Unknown => "unknown",
        }
    }
}

/// A single receipt line item.
///
/// Constructed once from its description fragments; after construction the
/// only mutation is tax application and the single-item drift adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub category: ItemCategory,
    pub item_type: ItemType,
    pub description_1: String,
    pub description_2: Option<String>,
    pub purchase_amount: Decimal,
    pub other_amount: Decimal,
    pub tax_applied: Decimal,
    pub total_amount: Decimal,
    pub cadence: Option<SubscriptionCadence>,
    pub next_renewal_date: Option<NaiveDate>,
    pub device: Option<String>,
    pub image_url: String,
    pub taxable: bool,
}

impl Item {
    /// Build an item from raw description-cell fragments.
    ///
    /// Fragments are lowercased before classification; all derived fields
    /// (descriptions, cadence, renewal date, device) come out lowercased.
    pub fn from_fragments(
        category: ItemCategory,
        fragments: &[String],
        purchase_amount: Decimal,
        other_amount: Decimal,
        image_url: String,
    ) -> Self {
        let fragments: Vec<String> = fragments.iter().map(|f| f.to_lowercase()).collect();
        let item_type = classify::classify(&fragments);

        Self {
            category,
            item_type,
            description_1: classify::primary_description(item_type, &fragments),
            description_2: classify::secondary_description(item_type, &fragments),
            purchase_amount,
            other_amount,
            tax_applied: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            cadence: classify::subscription_cadence(item_type, &fragments),
            next_renewal_date: classify::renewal_date(item_type, &fragments),
            device: classify::device(item_type, &fragments),
            image_url,
            taxable: item_type.is_taxable(),
        }
    }

    /// The tax this item would attract at `rate`, regardless of taxability.
    pub fn calc_tax(&self, rate: Decimal) -> Decimal {
        money::round_tax(self.purchase_amount * rate)
    }

    /// Apply tax at `rate` (zero when not taxable) and set the line total.
    /// Returns the tax applied.
    pub fn apply_tax(&mut self, rate: Decimal) -> Decimal {
        self.tax_applied = if self.taxable {
            self.calc_tax(rate)
        } else {
            Decimal::ZERO
        };
        self.total_amount = self.purchase_amount + self.tax_applied;
        self.tax_applied
    }

    /// Shift this item's tax and total by a signed reconciliation adjustment.
    pub fn adjust_tax(&mut self, adjustment: Decimal) {
        self.tax_applied += adjustment;
        self.total_amount += adjustment;
    }
}

/// A fully extracted and reconciled receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_date: Option<NaiveDate>,
    pub order_id: String,
    pub doc_nbr: String,
    pub apple_account: String,
    pub subtotal: Decimal,
    /// Authoritative tax as printed on the receipt.
    pub tax: Decimal,
    pub total: Decimal,
    pub card: Option<String>,
    /// Line items in document order.
    pub items: Vec<Item>,
}

impl Receipt {
    /// File name under which the raw document is archived.
    pub fn archive_file_name(&self) -> String {
        let date = self
            .receipt_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "undated".to_string());
        format!("{}_{}.html", self.order_id, date)
    }
}
