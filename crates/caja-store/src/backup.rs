//! # Backup Snapshot
//!
//! Serializable full-store snapshot for export and import.
//!
//! Export walks every table into one JSON document. Import merges by id
//! (insert or replace) and never deletes: records present locally but
//! absent from the snapshot survive. Restoring an old snapshot therefore
//! cannot silently drop sales committed after it was taken.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use caja_core::{BusinessConfig, Category, DailyCash, Product, Sale, Unit, User};

use crate::error::StoreResult;

/// A full point-in-time copy of the store, ready for JSON serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the export was taken (UTC).
    pub exported_at: DateTime<Utc>,

    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub units: Vec<Unit>,
    pub users: Vec<User>,
    pub sales: Vec<Sale>,
    pub config: Option<BusinessConfig>,
    pub daily_cash: Vec<DailyCash>,
}

impl Snapshot {
    /// Serializes the snapshot to pretty-printed JSON.
    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a snapshot from JSON.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of records across all tables (diagnostics).
    pub fn record_count(&self) -> usize {
        self.products.len()
            + self.categories.len()
            + self.units.len()
            + self.users.len()
            + self.sales.len()
            + usize::from(self.config.is_some())
            + self.daily_cash.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_round_trip() {
        let snapshot = Snapshot {
            exported_at: Utc::now(),
            products: vec![Product {
                id: 1,
                name: "Arroz Extra".to_string(),
                price_cents: 450,
                category: "Abarrotes".to_string(),
                unit: "kg".to_string(),
                image: None,
                stock: 20,
            }],
            categories: vec![Category {
                id: 1,
                name: "Abarrotes".to_string(),
            }],
            units: vec![],
            users: vec![],
            sales: vec![],
            config: None,
            daily_cash: vec![DailyCash {
                day: "2024-01-10".to_string(),
                opening_cents: 5000,
            }],
        };

        let json = snapshot.to_json().unwrap();
        let parsed = Snapshot::from_json(&json).unwrap();
        assert_eq!(parsed, snapshot);
        assert_eq!(parsed.record_count(), 3);
    }
}
