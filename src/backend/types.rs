use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Searches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub trademark_name: String,
    pub countries: Vec<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Acknowledgement returned when a search is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSubmission {
    #[serde(alias = "id")]
    pub search_id: String,
    #[serde(default = "pending")]
    pub status: String,
    /// Preliminary availability, when the backend can tell right away.
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    pub id: String,
    pub trademark_name: String,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default = "pending")]
    pub status: String,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SearchList {
    #[serde(default)]
    pub searches: Vec<SearchRecord>,
}

// ---------------------------------------------------------------------------
// Filings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingRequest {
    pub trademark_name: String,
    pub countries: Vec<String>,
    pub nice_classes: Vec<u32>,
    pub email: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingConfirmation {
    #[serde(alias = "id")]
    pub filing_id: String,
    #[serde(default = "pending")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingRecord {
    pub id: String,
    pub trademark_name: String,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub nice_classes: Vec<u32>,
    #[serde(default = "pending")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct FilingList {
    #[serde(default)]
    pub filings: Vec<FilingRecord>,
}

fn pending() -> String {
    "pending".to_string()
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// A USD amount, or the marker for a country with no published price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceValue {
    Amount(u32),
    NotAvailable,
}

impl PriceValue {
    pub const NOT_AVAILABLE: &'static str = "Not available";

    pub fn amount(&self) -> Option<u32> {
        match self {
            Self::Amount(n) => Some(*n),
            Self::NotAvailable => None,
        }
    }
}

impl std::fmt::Display for PriceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Amount(n) => write!(f, "${n}"),
            Self::NotAvailable => f.write_str(Self::NOT_AVAILABLE),
        }
    }
}

impl Serialize for PriceValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Amount(n) => serializer.serialize_u32(*n),
            Self::NotAvailable => serializer.serialize_str(Self::NOT_AVAILABLE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryPrice {
    pub country: String,
    pub base_price: PriceValue,
    pub additional_class_price: PriceValue,
}

impl CountryPrice {
    /// Cost of filing in this country for `classes` NICE classes.
    pub fn total_for(&self, classes: usize) -> Option<u32> {
        let base = self.base_price.amount()?;
        let extra = self.additional_class_price.amount()?;
        let additional = u32::try_from(classes.saturating_sub(1)).ok()?;
        Some(base + extra * additional)
    }
}
