//! Loosely-typed raw store records, as they arrive in import datasets.
//!
//! Everything optional stays optional here; defaulting and coercion
//! happen in the normalizer, not in the schema. `category` is kept as a
//! raw JSON value because datasets have shipped it as a string, an
//! object, or nothing at all; a non-array simply means "no categories".

use rust_decimal::Decimal;
use serde::Deserialize;

/// Top-level dataset shape: `{ "stores": [ … ] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDataset {
    pub stores: Vec<RawStoreRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStoreRecord {
    pub name: String,
    #[serde(default)]
    pub category: serde_json::Value,
    #[serde(default)]
    pub cuisine_types: Option<Vec<String>>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub location: Option<RawGeoPoint>,
    /// Raw score sequence.
    #[serde(default)]
    pub ratings: Option<Vec<f64>>,
    /// Caller-supplied total; not re-derived from `ratings`.
    #[serde(default)]
    pub total_ratings: Option<u32>,
    #[serde(default)]
    pub menus: Option<Vec<RawMenuItem>>,
    #[serde(default)]
    pub business_hours: Option<Vec<RawHours>>,
    #[serde(default)]
    pub happy_hours: Option<Vec<RawHours>>,
    #[serde(default)]
    pub is_24_hours: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGeoPoint {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMenuItem {
    pub item_id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A raw hours window. Business hours use the open/close fields, happy
/// hours the start/end fields; both shapes arrive through the same
/// record type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHours {
    #[serde(default)]
    pub open_hour: Option<u8>,
    #[serde(default)]
    pub open_minute: Option<u8>,
    #[serde(default)]
    pub close_hour: Option<u8>,
    #[serde(default)]
    pub close_minute: Option<u8>,
    #[serde(default)]
    pub start_hour: Option<u8>,
    #[serde(default)]
    pub start_minute: Option<u8>,
    #[serde(default)]
    pub end_hour: Option<u8>,
    #[serde(default)]
    pub end_minute: Option<u8>,
    #[serde(default)]
    pub is_next_day: bool,
    #[serde(default)]
    pub days_of_week: Vec<String>,
}
