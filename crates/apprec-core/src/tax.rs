//! Tax reconciliation between computed per-item tax and the receipt total.
//!
//! The receipt's printed tax is authoritative. Per-item tax is recomputed
//! from the nominal rate and any residual drift is attributed to a single
//! item, so that the sum of applied tax always equals the printed amount.
//! Reconciliation runs exactly once per receipt; re-running it would stack
//! adjustments and is unsupported.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::ReconcileError;
use crate::models::config::TaxConfig;
use crate::models::receipt::Item;

/// Attribute `receipt_tax` across `items`.
///
/// On success the post-condition Σ `item.tax_applied` == `receipt_tax`
/// holds. Failure leaves the items partially taxed and the receipt must be
/// discarded.
pub fn reconcile(
    order_id: &str,
    items: &mut [Item],
    receipt_tax: Decimal,
    config: &TaxConfig,
) -> Result<(), ReconcileError> {
    let applied: Vec<Decimal> = items
        .iter_mut()
        .map(|item| item.apply_tax(config.rate))
        .collect();
    let computed: Decimal = applied.iter().copied().sum();

    if !receipt_tax.is_zero() && computed.is_zero() {
        // Tax was charged but nothing is recognized as taxable. Recompute
        // every item as if it were taxable and look for a single exact match.
        let hypothetical: Vec<Decimal> =
            items.iter().map(|item| item.calc_tax(config.rate)).collect();

        let Some(idx) = hypothetical.iter().position(|tax| *tax == receipt_tax) else {
            return Err(ReconcileError::Unattributable {
                order_id: order_id.to_string(),
                tax: receipt_tax,
            });
        };

        warn!(
            order_id,
            %receipt_tax,
            item = idx,
            "no taxable item; attributing full tax to exact-match item"
        );
        items[idx].adjust_tax(receipt_tax);
    } else {
        let adjustment = receipt_tax - computed;

        if !adjustment.is_zero() {
            let Some(idx) = applied.iter().position(|tax| !tax.is_zero()) else {
                return Err(ReconcileError::NothingToAdjust {
                    order_id: order_id.to_string(),
                    tax: receipt_tax,
                    computed,
                    adjustment,
                });
            };

            let taxable_items = applied.iter().filter(|tax| !tax.is_zero()).count();
            if adjustment.abs() > config.drift_threshold && taxable_items > 1 {
                return Err(ReconcileError::ExcessiveDrift {
                    order_id: order_id.to_string(),
                    adjustment,
                    taxable_items,
                });
            }

            debug!(order_id, %adjustment, item = idx, "absorbing rounding drift");
            items[idx].adjust_tax(adjustment);
        }
    }

    debug_assert_eq!(
        items.iter().map(|i| i.tax_applied).sum::<Decimal>(),
        receipt_tax
    );

    Ok(())
}
