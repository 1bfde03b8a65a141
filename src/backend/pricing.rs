//! Static per-country filing price table (USD, government + service fees).

use super::types::{CountryPrice, PriceValue};

/// `(canonical name, aliases, base price, additional class price)`.
const PRICE_TABLE: &[(&str, &[&str], u32, u32)] = &[
    ("United States", &["us", "usa", "united states of america"], 1012, 225),
    ("European Union", &["eu", "euipo"], 1490, 310),
    ("United Kingdom", &["uk", "gb", "great britain"], 690, 150),
    ("Germany", &["de", "deutschland"], 1150, 180),
    ("France", &["fr"], 980, 170),
    ("Spain", &["es"], 890, 140),
    ("Italy", &["it"], 940, 160),
    ("Switzerland", &["ch"], 1120, 260),
    ("Canada", &["ca"], 1050, 240),
    ("Mexico", &["mx"], 760, 390),
    ("Brazil", &["br"], 820, 310),
    ("Australia", &["au"], 980, 330),
    ("New Zealand", &["nz"], 790, 290),
    ("China", &["cn"], 720, 280),
    ("Japan", &["jp"], 1390, 560),
    ("South Korea", &["kr", "korea"], 1090, 420),
    ("India", &["in"], 590, 190),
    ("Singapore", &["sg"], 880, 340),
    ("United Arab Emirates", &["uae", "ae"], 2150, 1750),
];

/// Price a single country. Unknown names are priced as [`PriceValue::NotAvailable`].
pub fn quote_country(country: &str) -> CountryPrice {
    let key = country.trim().to_lowercase();
    PRICE_TABLE
        .iter()
        .find(|(name, aliases, _, _)| name.to_lowercase() == key || aliases.contains(&key.as_str()))
        .map(|(name, _, base, extra)| CountryPrice {
            country: (*name).to_string(),
            base_price: PriceValue::Amount(*base),
            additional_class_price: PriceValue::Amount(*extra),
        })
        .unwrap_or_else(|| CountryPrice {
            country: country.trim().to_string(),
            base_price: PriceValue::NotAvailable,
            additional_class_price: PriceValue::NotAvailable,
        })
}

/// Price every requested country, preserving order.
pub fn quote(countries: &[String]) -> Vec<CountryPrice> {
    countries.iter().map(|c| quote_country(c)).collect()
}

/// Sum of base prices for the priced countries, `None` when nothing is priced.
pub fn estimate_search_price(prices: &[CountryPrice]) -> Option<u32> {
    let amounts: Vec<u32> = prices.iter().filter_map(|p| p.base_price.amount()).collect();
    (!amounts.is_empty()).then(|| amounts.iter().sum())
}

/// All canonical country names in the table.
pub fn supported_countries() -> Vec<&'static str> {
    PRICE_TABLE.iter().map(|(name, ..)| *name).collect()
}
