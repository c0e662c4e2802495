use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::catalog::CategoryRule;

/// Unique identifier of a printed label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(Uuid);

impl LabelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 hex digits, enough to tell labels apart on screen
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for LabelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A label as it was printed. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRecord {
    pub id: LabelId,
    pub product_name: String,
    pub category: String,
    // Copied from the rule at print time so later catalog edits don't leak in
    pub shelf_life_days: u32,
    pub temperature_range: String,
    pub production_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub printed_at: DateTime<Local>,
}

impl LabelRecord {
    pub(crate) fn new(
        product_name: String,
        rule: &CategoryRule,
        production_date: NaiveDate,
        expiry_date: NaiveDate,
        printed_at: DateTime<Local>,
    ) -> Self {
        Self {
            id: LabelId::new(),
            product_name,
            category: rule.name.clone(),
            shelf_life_days: rule.shelf_life_days,
            temperature_range: rule.temperature_range.clone(),
            production_date,
            expiry_date,
            printed_at,
        }
    }

    /// Copy of this label with a fresh id and print time
    pub(crate) fn duplicate(&self, printed_at: DateTime<Local>) -> Self {
        Self {
            id: LabelId::new(),
            printed_at,
            ..self.clone()
        }
    }

    /// 12-digit number printed under the barcode
    pub fn barcode(&self) -> String {
        format!("{:012}", self.id.0.as_u128() % 1_000_000_000_000)
    }
}
