//! SQLite persistence for processed receipts.
//!
//! Two tables: `order_header` (one row per receipt, unique by order id) and
//! `item_detail` (one row per line item). Decimals convert to REAL at this
//! boundary only; everything upstream stays exact.

use std::path::Path;

use rusqlite::{params, Connection};
use rust_decimal::prelude::ToPrimitive;

use apprec_core::Receipt;

pub struct ReceiptStore {
    conn: Connection,
}

impl ReceiptStore {
    /// Open (or create) the database at `path` and ensure the schema.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS order_header (
                hdr_id        INTEGER PRIMARY KEY AUTOINCREMENT,
                receipt_date  TEXT,
                order_id      TEXT NOT NULL UNIQUE,
                doc_nbr       TEXT,
                apple_account TEXT,
                subtotal      REAL,
                tax           REAL,
                total         REAL,
                card          TEXT,
                file_path     TEXT
            );

            CREATE TABLE IF NOT EXISTS item_detail (
                item_id                INTEGER PRIMARY KEY AUTOINCREMENT,
                hdr_id                 INTEGER NOT NULL REFERENCES order_header(hdr_id),
                item_category          TEXT,
                item_type              TEXT,
                description_1          TEXT,
                description_2          TEXT,
                purchase_amount        REAL,
                other_amount           REAL,
                tax_applied            REAL,
                total_amount           REAL,
                subscription_frequency TEXT,
                next_renewal_date      TEXT,
                device                 TEXT,
                image_url              TEXT
            );
            "#,
        )?;
        Ok(())
    }

    /// Header row id of an order already ingested, if any.
    pub fn find(&self, order_id: &str) -> anyhow::Result<Option<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT hdr_id FROM order_header WHERE order_id = ?1")?;
        let mut rows = stmt.query(params![order_id])?;

        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Insert a receipt and its items; returns the new header row id.
    pub fn insert(&mut self, receipt: &Receipt, file_path: Option<&str>) -> anyhow::Result<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO order_header
                (receipt_date, order_id, doc_nbr, apple_account,
                 subtotal, tax, total, card, file_path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                receipt.receipt_date.map(|d| d.format("%Y-%m-%d").to_string()),
                receipt.order_id,
                receipt.doc_nbr,
                receipt.apple_account,
                receipt.subtotal.to_f64(),
                receipt.tax.to_f64(),
                receipt.total.to_f64(),
                receipt.card,
                file_path,
            ],
        )?;
        let hdr_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO item_detail
                    (hdr_id, item_category, item_type, description_1,
                     description_2, purchase_amount, other_amount, tax_applied,
                     total_amount, subscription_frequency, next_renewal_date,
                     device, image_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            )?;

            for item in &receipt.items {
                stmt.execute(params![
                    hdr_id,
                    item.category.as_str(),
                    item.item_type.as_str(),
                    item.description_1,
                    item.description_2,
                    item.purchase_amount.to_f64(),
                    // Zero auxiliary amounts persist as NULL.
                    if item.other_amount.is_zero() {
                        None
                    } else {
                        item.other_amount.to_f64()
                    },
                    item.tax_applied.to_f64(),
                    item.total_amount.to_f64(),
                    item.cadence.map(|c| c.as_str()),
                    item.next_renewal_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    item.device,
                    item.image_url,
                ])?;
            }
        }

        tx.commit()?;
        Ok(hdr_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apprec_core::{Item, ItemCategory};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn sample_receipt() -> Receipt {
        let fragments: Vec<String> = ["Gardenscapes", "Coins", "In-App Purchase", "Device C"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut item = Item::from_fragments(
            ItemCategory::App,
            &fragments,
            dec!(25.00),
            Decimal::ZERO,
            "https://img.example/coins.png".to_string(),
        );
        item.apply_tax(dec!(0.08));

        Receipt {
            receipt_date: NaiveDate::from_ymd_opt(2024, 12, 18),
            order_id: "ML7P1X2QZ".to_string(),
            doc_nbr: "189427553101".to_string(),
            apple_account: "user@example.com".to_string(),
            subtotal: dec!(25.00),
            tax: dec!(2.00),
            total: dec!(27.00),
            card: Some("Visa .... 1234".to_string()),
            items: vec![item],
        }
    }

    #[test]
    fn test_insert_and_find() {
        let mut store = ReceiptStore::open_in_memory().unwrap();
        let receipt = sample_receipt();

        assert!(store.find(&receipt.order_id).unwrap().is_none());

        let hdr_id = store.insert(&receipt, Some("archive/ML7P1X2QZ_2024-12-18.html")).unwrap();
        assert_eq!(store.find(&receipt.order_id).unwrap(), Some(hdr_id));

        let count: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM item_detail WHERE hdr_id = ?1", [hdr_id], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_duplicate_order_id_rejected_by_schema() {
        let mut store = ReceiptStore::open_in_memory().unwrap();
        let receipt = sample_receipt();

        store.insert(&receipt, None).unwrap();
        assert!(store.insert(&receipt, None).is_err());
    }

    #[test]
    fn test_zero_other_amount_stored_as_null() {
        let mut store = ReceiptStore::open_in_memory().unwrap();
        let receipt = sample_receipt();
        let hdr_id = store.insert(&receipt, None).unwrap();

        let other: Option<f64> = store
            .conn
            .query_row(
                "SELECT other_amount FROM item_detail WHERE hdr_id = ?1",
                [hdr_id],
                |r| r.get(0),
            )
            .unwrap();
        assert!(other.is_none());
    }
}
