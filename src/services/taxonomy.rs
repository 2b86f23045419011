// src/services/taxonomy.rs
// DOCUMENTATION: Interest tags and provider place types
// PURPOSE: Static mapping between user-facing interests and the provider's type vocabulary

use crate::models::PlaceRecord;
use serde::Serialize;
use std::collections::BTreeSet;

/// Interest tag → provider types
/// Tags mapped to an empty slice are filter-only and never sent to the provider
const INTEREST_TYPES: &[(&str, &[&str])] = &[
    // Direct provider types offered in the picker
    ("restaurant", &["restaurant"]),
    ("cafe", &["cafe"]),
    ("shopping_mall", &["shopping_mall"]),
    ("supermarket", &["supermarket"]),
    ("convenience_store", &["convenience_store"]),
    ("bakery", &["bakery"]),
    // Broader interests
    ("food", &["restaurant", "cafe", "bakery", "meal_takeaway"]),
    ("coffee", &["cafe"]),
    ("groceries", &["supermarket", "convenience_store"]),
    ("shopping", &["shopping_mall", "clothing_store", "book_store", "electronics_store"]),
    ("nightlife", &["bar", "night_club"]),
    ("culture", &["museum", "art_gallery", "library", "church"]),
    ("sightseeing", &["tourist_attraction", "museum", "park"]),
    ("nature", &["park", "zoo", "aquarium"]),
    ("wellness", &["gym", "spa", "beauty_salon"]),
    ("entertainment", &["movie_theater", "night_club", "zoo", "aquarium"]),
    ("services", &["atm", "bank", "pharmacy", "post_office"]),
    // Filter-only
    ("budget", &[]),
    ("upscale", &[]),
    ("wheelchair_accessible", &[]),
    ("family_friendly", &[]),
    ("kids", &[]),
    ("seniors", &[]),
    ("pet_friendly", &[]),
];

/// Provider type → display label
const TYPE_LABELS: &[(&str, &str)] = &[
    ("restaurant", "Restaurant"),
    ("food", "Food"),
    ("store", "Store"),
    ("shopping_mall", "Shopping Mall"),
    ("supermarket", "Supermarket"),
    ("gas_station", "Gas Station"),
    ("bank", "Bank"),
    ("hospital", "Hospital"),
    ("pharmacy", "Pharmacy"),
    ("school", "School"),
    ("park", "Park"),
    ("tourist_attraction", "Tourist Attraction"),
    ("museum", "Museum"),
    ("church", "Church"),
    ("gym", "Gym"),
    ("cafe", "Cafe"),
    ("bar", "Bar"),
    ("lodging", "Hotel"),
    ("atm", "ATM"),
    ("post_office", "Post Office"),
    ("beauty_salon", "Beauty Salon"),
    ("hair_care", "Hair Care"),
    ("clothing_store", "Clothing Store"),
    ("electronics_store", "Electronics Store"),
    ("book_store", "Book Store"),
    ("library", "Library"),
    ("movie_theater", "Movie Theater"),
    ("night_club", "Night Club"),
    ("spa", "Spa"),
    ("zoo", "Zoo"),
    ("aquarium", "Aquarium"),
];

pub const UNKNOWN_LABEL: &str = "Unknown";

/// Selectable interest for the presentation layer
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InterestOption {
    pub value: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

const AVAILABLE_INTERESTS: &[InterestOption] = &[
    InterestOption { value: "restaurant", label: "Restaurant", icon: "🍽️" },
    InterestOption { value: "cafe", label: "Cafe", icon: "☕" },
    InterestOption { value: "shopping_mall", label: "Shopping Mall", icon: "🛍️" },
    InterestOption { value: "supermarket", label: "Supermarket", icon: "🏪" },
    InterestOption { value: "convenience_store", label: "Convenience Store", icon: "🏬" },
    InterestOption { value: "bakery", label: "Bakery", icon: "🥖" },
];

/// Interests offered in the picker
pub fn available_interests() -> &'static [InterestOption] {
    AVAILABLE_INTERESTS
}

/// Resolve interest tags to the provider types to search for
/// DOCUMENTATION: Unknown and filter-only tags contribute nothing
pub fn to_provider_types(interests: &BTreeSet<String>) -> BTreeSet<String> {
    let mut types = BTreeSet::new();

    for interest in interests {
        match INTEREST_TYPES.iter().find(|(tag, _)| *tag == interest.as_str()) {
            Some((_, mapped)) => types.extend(mapped.iter().map(|t| t.to_string())),
            None => log::debug!("Unmapped interest tag ignored: {}", interest),
        }
    }

    types
}

/// Human label for the first provider type
pub fn display_label<S: AsRef<str>>(provider_types: &[S]) -> String {
    let Some(first) = provider_types.first() else {
        return UNKNOWN_LABEL.to_string();
    };
    let first = first.as_ref();

    if let Some((_, label)) = TYPE_LABELS.iter().find(|(tag, _)| *tag == first) {
        return label.to_string();
    }

    // Underscores become spaces, then every word start is capitalized
    let mut label = String::with_capacity(first.len());
    let mut at_word_start = true;
    for c in first.chars().map(|c| if c == '_' { ' ' } else { c }) {
        if at_word_start && c.is_alphanumeric() {
            label.extend(c.to_uppercase());
        } else {
            label.push(c);
        }
        at_word_start = !c.is_alphanumeric();
    }

    label
}

/// Filter-only tag that can be checked against provider data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    /// price_level 0 or 1
    Budget,
    /// price_level 3 or 4
    Upscale,
}

impl PostFilter {
    pub fn accepts(&self, record: &PlaceRecord) -> bool {
        match (self, record.price_level) {
            (PostFilter::Budget, Some(level)) => level <= 1,
            (PostFilter::Upscale, Some(level)) => level >= 3,
            (_, None) => false,
        }
    }
}

/// Post-filters requested by the interest set
/// Filter-only tags without a provider field behind them are skipped
pub fn post_filter_tags(interests: &BTreeSet<String>) -> Vec<PostFilter> {
    let mut filters = Vec::new();

    for interest in interests {
        match interest.as_str() {
            "budget" => filters.push(PostFilter::Budget),
            "upscale" => filters.push(PostFilter::Upscale),
            other => {
                let filter_only = INTEREST_TYPES
                    .iter()
                    .any(|(tag, mapped)| *tag == other && mapped.is_empty());
                if filter_only {
                    log::debug!("No provider field for filter tag '{}', skipping", other);
                }
            }
        }
    }

    filters
}
