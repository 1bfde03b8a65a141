//! Typed render contexts, one per template family.
//!
//! Field names (camelCase after serialization) are exactly the placeholders
//! the bundled templates use.

use serde::Serialize;

use crate::backend::{CountryPrice, FilingRecord, PriceValue};

/// Context for `html://search-results` and `template://search-results`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultsContext {
    pub trademark_name: String,
    pub search_id: String,
    pub status: String,
    pub email: String,
    pub countries: Vec<String>,
    /// Preformatted estimate, e.g. `$2162` or `Not available`.
    pub price: String,
    /// `Available`, `Unavailable`, or `Pending review`.
    pub availability: String,
}

/// Context for `html://filing-status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingStatusContext {
    pub email: String,
    pub filing_count: usize,
    pub filings: Vec<FilingRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingRow {
    pub id: String,
    pub trademark_name: String,
    pub countries: String,
    pub classes: String,
    pub status: String,
    pub created_at: String,
}

impl From<&FilingRecord> for FilingRow {
    fn from(record: &FilingRecord) -> Self {
        Self {
            id: record.id.clone(),
            trademark_name: record.trademark_name.clone(),
            countries: record.countries.join(", "),
            classes: record
                .nice_classes
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            status: record.status.clone(),
            created_at: record.created_at.clone().unwrap_or_default(),
        }
    }
}

/// Context for `template://pricing-display`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingDisplayContext {
    pub rows: Vec<PricingRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRow {
    pub country: String,
    pub base_price: String,
    pub additional_class_price: String,
}

impl From<&CountryPrice> for PricingRow {
    fn from(price: &CountryPrice) -> Self {
        Self {
            country: price.country.clone(),
            base_price: price.base_price.to_string(),
            additional_class_price: price.additional_class_price.to_string(),
        }
    }
}

/// Render an optional estimate the way the templates show it.
pub fn format_price(amount: Option<u32>) -> String {
    match amount {
        Some(n) => PriceValue::Amount(n).to_string(),
        None => PriceValue::NOT_AVAILABLE.to_string(),
    }
}

/// Human label for a preliminary availability flag.
pub fn availability_label(available: Option<bool>) -> &'static str {
    match available {
        Some(true) => "Available",
        Some(false) => "Unavailable",
        None => "Pending review",
    }
}
