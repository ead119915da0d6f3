//! Store domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store ids are short random base-36 strings allocated at import time,
/// not UUIDs.
pub type StoreId = String;

/// Promotion categories a store can be listed under. Anything outside
/// this enumeration is dropped at the normalization boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    HappyHour,
    DealsAndDiscounts,
    SpecialEvents,
    AllYouCanEat,
}

impl Category {
    /// Parse a raw category tag; unrecognized tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "happy_hour" => Some(Category::HappyHour),
            "deals_and_discounts" => Some(Category::DealsAndDiscounts),
            "special_events" => Some(Category::SpecialEvents),
            "all_you_can_eat" => Some(Category::AllYouCanEat),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::HappyHour => "happy_hour",
            Category::DealsAndDiscounts => "deals_and_discounts",
            Category::SpecialEvents => "special_events",
            Category::AllYouCanEat => "all_you_can_eat",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Aggregate rating state. `total` is carried verbatim from the source
/// record and may legitimately diverge from `scores.len()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub total: u32,
    pub scores: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A regular opening window. Hour/minute fields stay optional: source
/// records omit them and the canonical shape is a structural rename, not
/// a repair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BusinessWindow {
    pub open_hour: Option<u8>,
    pub open_minute: Option<u8>,
    pub close_hour: Option<u8>,
    pub close_minute: Option<u8>,
    pub is_next_day: bool,
    pub days_of_week: Vec<String>,
}

/// A happy-hour window. Same field conventions as [`BusinessWindow`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HappyHourWindow {
    pub start_hour: Option<u8>,
    pub start_minute: Option<u8>,
    pub end_hour: Option<u8>,
    pub end_minute: Option<u8>,
    pub is_next_day: bool,
    pub days_of_week: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    /// Case-folded copy of `name`, maintained for prefix lookup.
    /// Recomputed on every write; see [`crate::hooks::CaseFoldSync`].
    pub name_lower: String,
    pub category: Vec<Category>,
    pub cuisine_types: Vec<String>,
    pub contact_number: String,
    pub location: GeoPoint,
    pub ratings: RatingSummary,
    pub menus: Vec<MenuItem>,
    pub business_hours: Vec<BusinessWindow>,
    pub happy_hours: Vec<HappyHourWindow>,
    pub is_24_hours: bool,
    /// Set if and only if some owner lists this store in `owned_stores`.
    pub owner_id: Option<Uuid>,
    /// Union of `managed_stores` memberships across manager users.
    pub managers: Vec<Uuid>,
    /// Always empty at import; populated by a separate process.
    pub menu_categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Canonical normalized store document, pre-persistence. Timestamps are
/// assigned by the database at commit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStore {
    pub id: StoreId,
    pub name: String,
    pub name_lower: String,
    pub category: Vec<Category>,
    pub cuisine_types: Vec<String>,
    pub contact_number: String,
    pub location: GeoPoint,
    pub ratings: RatingSummary,
    pub menus: Vec<MenuItem>,
    pub business_hours: Vec<BusinessWindow>,
    pub happy_hours: Vec<HappyHourWindow>,
    pub is_24_hours: bool,
    pub owner_id: Option<Uuid>,
    pub menu_categories: Vec<String>,
}

/// Compute the case-folded search key for a store name.
pub fn search_key(name: &str) -> String {
    name.to_lowercase()
}
