//! Tool handlers.
//!
//! Arguments reach a handler only after schema validation. Each handler then
//! extracts them through serde into a typed struct, applies the checks a
//! schema cannot express (non-empty text, NICE class range), talks to the
//! backend, and assembles text, embedded resources, and structured metadata.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::backend::{
    pricing, Backend, CountryPrice, FilingConfirmation, FilingRecord, FilingRequest, SearchRecord,
    SearchRequest, SearchSubmission,
};
use crate::error::DispatchError;
use crate::render::context::{
    availability_label, format_price, FilingRow, FilingStatusContext, PricingDisplayContext,
    PricingRow, SearchResultsContext,
};
use crate::render::{uris, TemplateRenderer};
use crate::types::{ContentBlock, ToolResult};

/// Highest class number in the NICE classification.
pub const MAX_NICE_CLASS: u32 = 45;

// ---------------------------------------------------------------------------
// ToolKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Check,
    SearchTrademark,
    CheckSearchStatus,
    CreateFiling,
    GetFiling,
    GetTrademarkPricing,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Check,
        ToolKind::SearchTrademark,
        ToolKind::CheckSearchStatus,
        ToolKind::CreateFiling,
        ToolKind::GetFiling,
        ToolKind::GetTrademarkPricing,
    ];

    /// Wire name of the tool.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::SearchTrademark => "search_trademark",
            Self::CheckSearchStatus => "check_search_status",
            Self::CreateFiling => "createFiling",
            Self::GetFiling => "getFiling",
            Self::GetTrademarkPricing => "get_trademark_pricing",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// What a handler may touch.
pub struct ToolContext<'a> {
    pub backend: &'a dyn Backend,
    pub renderer: &'a TemplateRenderer,
}

/// Run the handler for `kind`.
pub async fn invoke(
    kind: ToolKind,
    ctx: &ToolContext<'_>,
    args: &Map<String, Value>,
) -> Result<ToolResult, DispatchError> {
    match kind {
        ToolKind::Check => check(ctx, parse_args(kind, args)?).await,
        ToolKind::SearchTrademark => search_trademark(ctx, parse_args(kind, args)?).await,
        ToolKind::CheckSearchStatus => check_search_status(ctx, parse_args(kind, args)?).await,
        ToolKind::CreateFiling => create_filing(ctx, parse_args(kind, args)?).await,
        ToolKind::GetFiling => get_filing(ctx, parse_args(kind, args)?).await,
        ToolKind::GetTrademarkPricing => get_pricing(ctx, parse_args(kind, args)?).await,
    }
}

fn parse_args<T: DeserializeOwned>(
    kind: ToolKind,
    args: &Map<String, Value>,
) -> Result<T, DispatchError> {
    serde_json::from_value(Value::Object(args.clone()))
        .map_err(|e| DispatchError::invalid(kind.as_str(), e.to_string()))
}

// ---------------------------------------------------------------------------
// Argument structs
// ---------------------------------------------------------------------------

/// A single country or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(one) => vec![one],
            Self::Many(many) => many,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckArgs {
    trademark_name: String,
    country: OneOrMany,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchTrademarkArgs {
    trademark_name: String,
    countries: OneOrMany,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchStatusArgs {
    email: String,
    search_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateFilingArgs {
    trademark_name: String,
    countries: Vec<String>,
    // Integral floats (`9.0`) pass the schema, so take them as f64 here.
    nice_classes: Vec<f64>,
    email: String,
    full_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetFilingArgs {
    email: String,
    filing_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PricingArgs {
    countries: Vec<String>,
}

// ---------------------------------------------------------------------------
// Argument checks
// ---------------------------------------------------------------------------

fn required_text(kind: ToolKind, field: &str, value: String) -> Result<String, DispatchError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DispatchError::invalid(
            kind.as_str(),
            format!("`{field}` must not be empty"),
        ));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn email_address(kind: ToolKind, value: String) -> Result<String, DispatchError> {
    let email = required_text(kind, "email", value)?;
    if !looks_like_email(&email) {
        return Err(DispatchError::invalid(
            kind.as_str(),
            format!("`email` is not a valid address: {email}"),
        ));
    }
    Ok(email)
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Trim, drop blanks, and dedupe while keeping the caller's order.
///
/// Two spellings of the same priced country (`US`, `United States`) count as
/// one; the first spelling wins.
fn country_list(
    kind: ToolKind,
    field: &str,
    values: Vec<String>,
) -> Result<Vec<String>, DispatchError> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    let mut seen: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = pricing::quote_country(trimmed).country.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(trimmed.to_string());
        }
    }
    if out.is_empty() {
        return Err(DispatchError::invalid(
            kind.as_str(),
            format!("`{field}` must name at least one country"),
        ));
    }
    Ok(out)
}

fn nice_class_list(kind: ToolKind, values: Vec<f64>) -> Result<Vec<u32>, DispatchError> {
    if values.is_empty() {
        return Err(DispatchError::invalid(
            kind.as_str(),
            "`niceClasses` must contain at least one class",
        ));
    }
    let mut out: Vec<u32> = Vec::with_capacity(values.len());
    for value in values {
        let in_range = value.fract() == 0.0 && (1.0..=f64::from(MAX_NICE_CLASS)).contains(&value);
        if !in_range {
            return Err(DispatchError::invalid(
                kind.as_str(),
                format!("NICE class {value} is outside 1-{MAX_NICE_CLASS}"),
            ));
        }
        // Range-checked above, so the cast is exact.
        let class = value as u32;
        if !out.contains(&class) {
            out.push(class);
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Search tools
// ---------------------------------------------------------------------------

struct SearchOutcome {
    request: SearchRequest,
    submission: SearchSubmission,
    prices: Vec<CountryPrice>,
    price: Option<u32>,
}

impl SearchOutcome {
    fn summary(&self) -> String {
        let mut lines = vec![
            format!(
                "Trademark search submitted for \"{}\" in {}.",
                self.request.trademark_name,
                country_names(&self.prices)
            ),
            format!("Search ID: {}", self.submission.search_id),
            format!("Status: {}", self.submission.status),
            format!(
                "Preliminary availability: {}",
                availability_label(self.submission.available)
            ),
            format!("Estimated search price: {}", format_price(self.price)),
        ];
        if let Some(message) = &self.submission.message {
            lines.push(message.clone());
        }
        lines.push(format!(
            "Full results will be emailed to {}.",
            self.request.email
        ));
        lines.join("\n")
    }

    fn render_context(&self) -> SearchResultsContext {
        SearchResultsContext {
            trademark_name: self.request.trademark_name.clone(),
            search_id: self.submission.search_id.clone(),
            status: self.submission.status.clone(),
            email: self.request.email.clone(),
            countries: self.prices.iter().map(|p| p.country.clone()).collect(),
            price: format_price(self.price),
            availability: availability_label(self.submission.available).to_string(),
        }
    }

    fn meta(&self) -> Value {
        json!({
            "searchId": self.submission.search_id,
            "trademarkName": self.request.trademark_name,
            "countries": self.request.countries,
            "email": self.request.email,
            "status": self.submission.status,
            "available": self.submission.available,
            "price": self.price,
            "pricing": self.prices,
        })
    }
}

fn search_request(
    kind: ToolKind,
    trademark_name: String,
    countries: OneOrMany,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<SearchRequest, DispatchError> {
    let (name_field, country_field) = if kind == ToolKind::Check {
        ("trademarkName", "country")
    } else {
        ("trademark_name", "countries")
    };
    Ok(SearchRequest {
        trademark_name: required_text(kind, name_field, trademark_name)?,
        countries: country_list(kind, country_field, countries.into_vec())?,
        email: email_address(kind, email)?,
        first_name: optional_text(first_name),
        last_name: optional_text(last_name),
    })
}

async fn run_search(
    ctx: &ToolContext<'_>,
    request: SearchRequest,
) -> Result<SearchOutcome, DispatchError> {
    let prices = ctx.backend.pricing(&request.countries).await?;
    let submission = ctx.backend.submit_search(&request).await?;
    tracing::info!(
        backend = ctx.backend.id(),
        search_id = %submission.search_id,
        countries = request.countries.len(),
        "trademark search submitted"
    );
    let price = pricing::estimate_search_price(&prices);
    Ok(SearchOutcome {
        request,
        submission,
        prices,
        price,
    })
}

async fn check(ctx: &ToolContext<'_>, args: CheckArgs) -> Result<ToolResult, DispatchError> {
    let request = search_request(
        ToolKind::Check,
        args.trademark_name,
        args.country,
        args.email,
        args.first_name,
        args.last_name,
    )?;
    let outcome = run_search(ctx, request).await?;
    let card = ctx
        .renderer
        .embed(uris::HTML_SEARCH_RESULTS, &outcome.render_context())?;
    Ok(ToolResult::success(vec![
        ContentBlock::text(outcome.summary()),
        ContentBlock::Resource { resource: card },
    ])
    .with_meta(outcome.meta()))
}

async fn search_trademark(
    ctx: &ToolContext<'_>,
    args: SearchTrademarkArgs,
) -> Result<ToolResult, DispatchError> {
    let request = search_request(
        ToolKind::SearchTrademark,
        args.trademark_name,
        args.countries,
        args.email,
        args.first_name,
        args.last_name,
    )?;
    let outcome = run_search(ctx, request).await?;
    let card = ctx
        .renderer
        .embed(uris::TEMPLATE_SEARCH_RESULTS, &outcome.render_context())?;
    Ok(ToolResult::success(vec![
        ContentBlock::text(outcome.summary()),
        ContentBlock::Resource { resource: card },
    ])
    .with_meta(outcome.meta()))
}

async fn check_search_status(
    ctx: &ToolContext<'_>,
    args: SearchStatusArgs,
) -> Result<ToolResult, DispatchError> {
    let kind = ToolKind::CheckSearchStatus;
    let email = email_address(kind, args.email)?;
    let search_id = optional_text(args.search_id);
    let searches = ctx
        .backend
        .list_searches(&email, search_id.as_deref())
        .await?;

    let text = if searches.is_empty() {
        match &search_id {
            Some(id) => format!("No search {id} found for {email}."),
            None => format!("No trademark searches found for {email}."),
        }
    } else {
        let mut lines = vec![format!(
            "Found {} trademark search(es) for {email}:",
            searches.len()
        )];
        lines.extend(searches.iter().map(search_line));
        lines.join("\n")
    };
    Ok(ToolResult::success(vec![ContentBlock::text(text)])
        .with_meta(json!({ "email": email, "searches": searches })))
}

fn search_line(search: &SearchRecord) -> String {
    let mut line = format!(
        "- {}: \"{}\" in {}, status {}",
        search.id,
        search.trademark_name,
        join_or_dash(&search.countries),
        search.status
    );
    if search.available.is_some() {
        line.push_str(&format!(" ({})", availability_label(search.available)));
    }
    line
}

// ---------------------------------------------------------------------------
// Filing tools
// ---------------------------------------------------------------------------

async fn create_filing(
    ctx: &ToolContext<'_>,
    args: CreateFilingArgs,
) -> Result<ToolResult, DispatchError> {
    let kind = ToolKind::CreateFiling;
    let request = FilingRequest {
        trademark_name: required_text(kind, "trademarkName", args.trademark_name)?,
        countries: country_list(kind, "countries", args.countries)?,
        nice_classes: nice_class_list(kind, args.nice_classes)?,
        email: email_address(kind, args.email)?,
        full_name: required_text(kind, "fullName", args.full_name)?,
    };

    let prices = ctx.backend.pricing(&request.countries).await?;
    let confirmation = ctx.backend.create_filing(&request).await?;
    tracing::info!(
        backend = ctx.backend.id(),
        filing_id = %confirmation.filing_id,
        classes = request.nice_classes.len(),
        "trademark filing created"
    );

    let total = filing_total(&prices, request.nice_classes.len());
    let unpriced: Vec<&str> = prices
        .iter()
        .filter(|p| p.base_price.amount().is_none())
        .map(|p| p.country.as_str())
        .collect();

    let mut lines = vec![
        format!(
            "Filing {} created for \"{}\".",
            confirmation.filing_id, request.trademark_name
        ),
        format!("Countries: {}", country_names(&prices)),
        format!("NICE classes: {}", join_classes(&request.nice_classes)),
        format!("Status: {}", confirmation.status),
        format!("Estimated total: {}", format_price(total)),
    ];
    if !unpriced.is_empty() {
        lines.push(format!("No published price for: {}", unpriced.join(", ")));
    }
    lines.push(format!(
        "A confirmation will be sent to {}.",
        request.email
    ));

    let record = filing_record(&request, &confirmation);
    let card = ctx.renderer.embed(
        uris::HTML_FILING_STATUS,
        &FilingStatusContext {
            email: request.email.clone(),
            filing_count: 1,
            filings: vec![FilingRow::from(&record)],
        },
    )?;

    let meta = json!({
        "filingId": confirmation.filing_id,
        "status": confirmation.status,
        "createdAt": confirmation.created_at,
        "trademarkName": request.trademark_name,
        "countries": request.countries,
        "niceClasses": request.nice_classes,
        "email": request.email,
        "totalPrice": total,
        "pricing": prices,
    });
    Ok(ToolResult::success(vec![
        ContentBlock::text(lines.join("\n")),
        ContentBlock::Resource { resource: card },
    ])
    .with_meta(meta))
}

/// Filing cost across every country, `None` when any of them is unpriced.
fn filing_total(prices: &[CountryPrice], classes: usize) -> Option<u32> {
    if prices.is_empty() {
        return None;
    }
    prices.iter().map(|p| p.total_for(classes)).sum()
}

fn filing_record(request: &FilingRequest, confirmation: &FilingConfirmation) -> FilingRecord {
    FilingRecord {
        id: confirmation.filing_id.clone(),
        trademark_name: request.trademark_name.clone(),
        countries: request.countries.clone(),
        nice_classes: request.nice_classes.clone(),
        status: confirmation.status.clone(),
        created_at: confirmation.created_at.clone(),
        updated_at: None,
    }
}

async fn get_filing(ctx: &ToolContext<'_>, args: GetFilingArgs) -> Result<ToolResult, DispatchError> {
    let kind = ToolKind::GetFiling;
    let email = email_address(kind, args.email)?;
    let filing_id = optional_text(args.filing_id);
    let filings = ctx.backend.get_filings(&email, filing_id.as_deref()).await?;

    let text = if filings.is_empty() {
        match &filing_id {
            Some(id) => format!("No filing {id} found for {email}."),
            None => format!("No trademark filings found for {email}."),
        }
    } else {
        let mut lines = vec![format!("Found {} filing(s) for {email}:", filings.len())];
        lines.extend(filings.iter().map(|f| {
            format!(
                "- {}: \"{}\" in {}, classes {}, status {}",
                f.id,
                f.trademark_name,
                join_or_dash(&f.countries),
                join_classes(&f.nice_classes),
                f.status
            )
        }));
        lines.join("\n")
    };

    let card = ctx.renderer.embed(
        uris::HTML_FILING_STATUS,
        &FilingStatusContext {
            email: email.clone(),
            filing_count: filings.len(),
            filings: filings.iter().map(FilingRow::from).collect(),
        },
    )?;
    Ok(ToolResult::success(vec![
        ContentBlock::text(text),
        ContentBlock::Resource { resource: card },
    ])
    .with_meta(json!({ "email": email, "filings": filings })))
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

async fn get_pricing(ctx: &ToolContext<'_>, args: PricingArgs) -> Result<ToolResult, DispatchError> {
    let countries = country_list(ToolKind::GetTrademarkPricing, "countries", args.countries)?;
    let prices = ctx.backend.pricing(&countries).await?;

    let mut lines = vec!["Trademark registration pricing (USD):".to_string()];
    lines.extend(prices.iter().map(|p| match p.base_price.amount() {
        Some(_) => format!(
            "- {}: {} for the first class, {} per additional class",
            p.country, p.base_price, p.additional_class_price
        ),
        None => format!("- {}: {}", p.country, p.base_price),
    }));
    let table = ctx.renderer.embed(
        uris::TEMPLATE_PRICING_DISPLAY,
        &PricingDisplayContext {
            rows: prices.iter().map(PricingRow::from).collect(),
        },
    )?;
    Ok(ToolResult::success(vec![
        ContentBlock::text(lines.join("\n")),
        ContentBlock::Resource { resource: table },
    ])
    .with_meta(json!({ "pricing": prices })))
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

fn country_names(prices: &[CountryPrice]) -> String {
    let names: Vec<&str> = prices.iter().map(|p| p.country.as_str()).collect();
    join_or_dash(&names)
}

fn join_or_dash<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return "-".to_string();
    }
    items
        .iter()
        .map(|item| item.as_ref())
        .collect::<Vec<&str>>()
        .join(", ")
}

fn join_classes(classes: &[u32]) -> String {
    let parts: Vec<String> = classes.iter().map(u32::to_string).collect();
    join_or_dash(&parts)
}
