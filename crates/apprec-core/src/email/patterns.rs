//! Compiled label patterns for the label-search layout.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref LABEL_DATE: Regex = Regex::new(r"(?i)date").unwrap();
    pub static ref LABEL_ORDER_ID: Regex = Regex::new(r"(?i)order id").unwrap();
    pub static ref LABEL_DOCUMENT_NO: Regex = Regex::new(r"(?i)document no").unwrap();
    // The account label sometimes carries an NBSP between the words.
    pub static ref LABEL_APPLE_ACCOUNT: Regex =
        Regex::new(r"(?i)apple[\s\u{00A0}]account").unwrap();
    pub static ref LABEL_APPLE_ID: Regex = Regex::new(r"(?i)apple id").unwrap();
    pub static ref LABEL_SUBTOTAL: Regex = Regex::new(r"(?i)subtotal").unwrap();
    pub static ref LABEL_TAX: Regex = Regex::new(r"(?i)tax").unwrap();
    pub static ref LABEL_TOTAL: Regex = Regex::new(r"(?i)\btotal").unwrap();

    // Anchored both ends: item description lines can start with a section
    // name ("Apple TV+ ..."), and a prefix match would take them for headers.
    pub static ref HEADER_APP_STORE: Regex = Regex::new(r"(?i)^app store$").unwrap();
    pub static ref HEADER_APPLE_TV: Regex = Regex::new(r"(?i)^apple tv$").unwrap();
    pub static ref HEADER_APPLE_SERVICES: Regex = Regex::new(r"(?i)^apple services$").unwrap();
}
