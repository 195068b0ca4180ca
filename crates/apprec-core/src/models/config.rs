//! Configuration structures for the receipt pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the apprec pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprecConfig {
    /// Tax reconciliation configuration.
    pub tax: TaxConfig,

    /// Storage and archival configuration.
    pub storage: StorageConfig,
}

impl Default for ApprecConfig {
    fn default() -> Self {
        Self {
            tax: TaxConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Tax rate and reconciliation tolerances.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxConfig {
    /// Nominal sales tax rate applied to taxable items.
    pub rate: Decimal,

    /// Largest rounding drift attributable to a single item when more than
    /// one item is taxable.
    pub drift_threshold: Decimal,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            rate: Decimal::new(8, 2),             // 0.08
            drift_threshold: Decimal::new(4, 2),  // 0.04
        }
    }
}

/// Where processed receipts are persisted and archived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Directory for archived raw documents; archival is skipped when unset.
    pub archive_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("receipts.db"),
            archive_dir: None,
        }
    }
}

impl ApprecConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
