//! Raw record → canonical store document transformation.
//!
//! Pure apart from id randomness: category filtering, defaulting,
//! rating aggregation, and field-by-field menu/hours mapping. One
//! [`Normalizer`] spans one import run; its used-id set is what makes
//! ids unique within the run.

use std::collections::HashSet;

use rand::Rng;

use tapster_core::models::store::{
    BusinessWindow, Category, GeoPoint, HappyHourWindow, MenuItem, NewStore, RatingSummary,
    search_key,
};

use crate::raw::{RawHours, RawStoreRecord};

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of generated store ids.
pub const ID_LENGTH: usize = 13;

/// One random base-36 candidate id.
fn random_store_id(rng: &mut impl Rng) -> String {
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Normalizes raw records for a single import run.
pub struct Normalizer<R: Rng> {
    rng: R,
    used_ids: HashSet<String>,
}

impl Normalizer<rand::rngs::ThreadRng> {
    pub fn new() -> Self {
        Self::with_rng(rand::rng())
    }
}

impl Default for Normalizer<rand::rngs::ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Normalizer<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            used_ids: HashSet::new(),
        }
    }

    /// Allocate an id that is unique within this run. The id space is
    /// 36^13, so the retry loop is about guaranteed termination of the
    /// run, not collision probability.
    fn allocate_id(&mut self) -> String {
        loop {
            let id = random_store_id(&mut self.rng);
            if self.used_ids.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Transform one raw record into a canonical, ownerless store
    /// document.
    pub fn normalize(&mut self, raw: RawStoreRecord) -> NewStore {
        let id = self.allocate_id();
        let name_lower = search_key(&raw.name);

        // Non-array and missing category both collapse to the empty
        // set; unknown tags are silently dropped.
        let category: Vec<Category> = raw
            .category
            .as_array()
            .map(|tags| {
                tags.iter()
                    .filter_map(|v| v.as_str())
                    .filter_map(Category::parse)
                    .collect()
            })
            .unwrap_or_default();

        let scores = raw.ratings.unwrap_or_default();
        let average = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        let location = raw
            .location
            .map(|loc| GeoPoint {
                latitude: loc.latitude.unwrap_or(0.0),
                longitude: loc.longitude.unwrap_or(0.0),
            })
            .unwrap_or_default();

        NewStore {
            id,
            name: raw.name,
            name_lower,
            category,
            cuisine_types: raw.cuisine_types.unwrap_or_default(),
            contact_number: raw.contact_number.unwrap_or_default(),
            location,
            ratings: RatingSummary {
                average,
                total: raw.total_ratings.unwrap_or(0),
                scores,
            },
            menus: raw
                .menus
                .unwrap_or_default()
                .into_iter()
                .map(|menu| MenuItem {
                    id: menu.item_id,
                    name: menu.name,
                    price: menu.price,
                    kind: menu.kind,
                })
                .collect(),
            business_hours: raw
                .business_hours
                .unwrap_or_default()
                .into_iter()
                .map(business_window)
                .collect(),
            happy_hours: raw
                .happy_hours
                .unwrap_or_default()
                .into_iter()
                .map(happy_hour_window)
                .collect(),
            is_24_hours: raw.is_24_hours.unwrap_or(false),
            owner_id: None,
            menu_categories: vec![],
        }
    }
}

fn business_window(hours: RawHours) -> BusinessWindow {
    BusinessWindow {
        open_hour: hours.open_hour,
        open_minute: hours.open_minute,
        close_hour: hours.close_hour,
        close_minute: hours.close_minute,
        is_next_day: hours.is_next_day,
        days_of_week: hours.days_of_week,
    }
}

fn happy_hour_window(hours: RawHours) -> HappyHourWindow {
    HappyHourWindow {
        start_hour: hours.start_hour,
        start_minute: hours.start_minute,
        end_hour: hours.end_hour,
        end_minute: hours.end_minute,
        is_next_day: hours.is_next_day,
        days_of_week: hours.days_of_week,
    }
}
