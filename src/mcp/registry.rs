//! Static tool and resource catalogs.
//!
//! Both lists are built once at startup and handed to the
//! [`Dispatcher`](super::dispatcher::Dispatcher). Order is stable and is the
//! order `tools/list` and `resources/list` report.

use crate::render::uris;
use crate::schema::SchemaNode;
use crate::types::{ResourceDescriptor, ToolDescriptor};

use super::tools::ToolKind;

const SKYBRIDGE_MIME: &str = "text/html+skybridge";
const HTML_MIME: &str = "text/html";

/// Every tool the server exposes.
pub fn tool_registry() -> Vec<ToolDescriptor> {
    vec![
        // ── Search ───────────────────────────────────────────────
        tool(
            ToolKind::Check,
            "Check whether a trademark name is available in one or more countries. \
             Submits a search, emails the results to the customer, and returns an \
             availability card with the estimated search price.",
            SchemaNode::object()
                .required_property(
                    "trademarkName",
                    SchemaNode::string().describe("The trademark name to check"),
                )
                .required_property("country", countries_schema("Country or list of countries"))
                .required_property("email", email_schema())
                .property("firstName", SchemaNode::string().describe("Customer first name"))
                .property("lastName", SchemaNode::string().describe("Customer last name")),
        ),
        tool(
            ToolKind::SearchTrademark,
            "Submit a comprehensive trademark search. Results are emailed to the \
             customer once the search completes.",
            SchemaNode::object()
                .required_property(
                    "trademark_name",
                    SchemaNode::string().describe("The trademark name to search"),
                )
                .required_property(
                    "countries",
                    countries_schema("Country or list of countries to search"),
                )
                .required_property("email", email_schema())
                .property("first_name", SchemaNode::string().describe("Customer first name"))
                .property("last_name", SchemaNode::string().describe("Customer last name")),
        ),
        tool(
            ToolKind::CheckSearchStatus,
            "List the trademark searches submitted by a customer, or look up one search by id.",
            SchemaNode::object()
                .required_property("email", email_schema())
                .property(
                    "search_id",
                    SchemaNode::string().describe("Narrow the result to this search"),
                ),
        ),
        // ── Filing ───────────────────────────────────────────────
        tool(
            ToolKind::CreateFiling,
            "Create a trademark filing order. Not idempotent: calling it twice \
             creates two filings.",
            SchemaNode::object()
                .required_property(
                    "trademarkName",
                    SchemaNode::string().describe("The trademark name to register"),
                )
                .required_property(
                    "countries",
                    SchemaNode::array(SchemaNode::string())
                        .describe("Countries to file in"),
                )
                .required_property(
                    "niceClasses",
                    SchemaNode::array(SchemaNode::integer())
                        .describe("NICE classification numbers (1-45)"),
                )
                .required_property("email", email_schema())
                .required_property(
                    "fullName",
                    SchemaNode::string().describe("Applicant full name"),
                ),
        ),
        tool(
            ToolKind::GetFiling,
            "Show the status of a customer's trademark filings, or of one filing by id.",
            SchemaNode::object()
                .required_property("email", email_schema())
                .property(
                    "filingId",
                    SchemaNode::string().describe("Narrow the result to this filing"),
                ),
        ),
        // ── Pricing ──────────────────────────────────────────────
        tool(
            ToolKind::GetTrademarkPricing,
            "Get trademark registration pricing per country: base price for the \
             first class and the price of each additional class, in USD.",
            SchemaNode::object().required_property(
                "countries",
                SchemaNode::array(SchemaNode::string()).describe("Countries to price"),
            ),
        ),
    ]
}

/// Every resource the server can render.
pub fn resource_registry() -> Vec<ResourceDescriptor> {
    vec![
        resource(
            uris::HTML_SEARCH_RESULTS,
            "Trademark Search Results",
            SKYBRIDGE_MIME,
            "Availability card shown after a trademark check.",
        ),
        resource(
            uris::HTML_FILING_STATUS,
            "Trademark Filing Status",
            SKYBRIDGE_MIME,
            "Status table for a customer's trademark filings.",
        ),
        resource(
            uris::TEMPLATE_SEARCH_RESULTS,
            "Search Results Card",
            HTML_MIME,
            "Compact search result card for embedding.",
        ),
        resource(
            uris::TEMPLATE_PRICING_DISPLAY,
            "Pricing Display",
            HTML_MIME,
            "Per-country pricing table.",
        ),
    ]
}

fn tool(kind: ToolKind, description: &str, input_schema: SchemaNode) -> ToolDescriptor {
    ToolDescriptor {
        name: kind.as_str().to_string(),
        description: description.to_string(),
        input_schema,
    }
}

fn resource(uri: &str, name: &str, mime_type: &str, description: &str) -> ResourceDescriptor {
    ResourceDescriptor {
        uri: uri.to_string(),
        mime_type: mime_type.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    }
}

fn countries_schema(description: &str) -> SchemaNode {
    SchemaNode::any_of(vec![
        SchemaNode::string(),
        SchemaNode::array(SchemaNode::string()),
    ])
    .describe(description)
}

fn email_schema() -> SchemaNode {
    SchemaNode::string().describe("Customer email address")
}
