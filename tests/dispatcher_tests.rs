//! End-to-end dispatcher tests: registries, validation, handlers, templates,
//! and error folding, driven through the public API with a recording backend.

mod common;

use std::collections::HashSet;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{dispatcher, valid_arguments, Mode, RecordingBackend};
use trademark_mcp::error::DispatchError;
use trademark_mcp::types::{ContentBlock, ToolInvocation, ToolResult};

async fn call(d: &trademark_mcp::mcp::Dispatcher, tool: &str, args: Value) -> ToolResult {
    d.call_tool(ToolInvocation::from_value(tool, args)).await
}

fn text(result: &ToolResult) -> &str {
    result.first_text().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Registries
// ---------------------------------------------------------------------------

#[test]
fn catalogs_are_stable_and_duplicate_free() {
    let d = dispatcher(RecordingBackend::healthy(), 1_000);
    let again = dispatcher(RecordingBackend::healthy(), 1_000);

    let tools: Vec<&str> = d.list_tools().iter().map(|t| t.name.as_str()).collect();
    let tools_again: Vec<&str> = again.list_tools().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tools, tools_again);
    assert!(!tools.is_empty());
    assert_eq!(tools.iter().collect::<HashSet<_>>().len(), tools.len());

    let uris: Vec<&str> = d.list_resources().iter().map(|r| r.uri.as_str()).collect();
    assert_eq!(
        uris,
        vec![
            "html://search-results",
            "html://filing-status",
            "template://search-results",
            "template://pricing-display",
        ]
    );
}

// ---------------------------------------------------------------------------
// Happy paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_tool_succeeds_with_valid_arguments() {
    let backend = RecordingBackend::healthy();
    let d = dispatcher(backend.clone(), 1_000);
    for tool in d.list_tools().iter().map(|t| t.name.clone()).collect::<Vec<_>>() {
        let result = call(&d, &tool, valid_arguments(&tool)).await;
        assert!(!result.is_error, "{tool} failed: {}", text(&result));
        assert!(!result.content.is_empty(), "{tool} returned no content");
        assert!(!text(&result).is_empty(), "{tool} returned empty text");
    }
}

#[tokio::test]
async fn pricing_matches_static_table() {
    let backend = RecordingBackend::healthy();
    let d = dispatcher(backend.clone(), 1_000);
    let result = call(
        &d,
        "get_trademark_pricing",
        json!({"countries": ["United States", "Germany"]}),
    )
    .await;

    assert!(!result.is_error);
    let pricing = result.meta.as_ref().unwrap()["pricing"].as_array().unwrap().clone();
    assert_eq!(pricing.len(), 2);
    assert_eq!(
        pricing[0],
        json!({"country": "United States", "basePrice": 1012, "additionalClassPrice": 225})
    );
    assert_eq!(
        pricing[1],
        json!({"country": "Germany", "basePrice": 1150, "additionalClassPrice": 180})
    );
    assert_eq!(backend.calls(), 0, "pricing is served from the static table");
}

#[tokio::test]
async fn unknown_country_is_not_available() {
    let d = dispatcher(RecordingBackend::healthy(), 1_000);
    let result = call(&d, "get_trademark_pricing", json!({"countries": ["Wakanda"]})).await;

    assert!(!result.is_error);
    let pricing = &result.meta.as_ref().unwrap()["pricing"];
    assert_eq!(pricing.as_array().unwrap().len(), 1);
    assert_eq!(pricing[0]["basePrice"], "Not available");
    assert_eq!(pricing[0]["additionalClassPrice"], "Not available");
    assert!(text(&result).contains("Wakanda: Not available"));
}

#[tokio::test]
async fn alias_spellings_reach_backend_once() {
    let backend = RecordingBackend::healthy();
    let d = dispatcher(backend.clone(), 1_000);
    let result = call(
        &d,
        "search_trademark",
        json!({
            "trademark_name": "Acme",
            "countries": ["usa", "United States"],
            "email": "ada@example.com"
        }),
    )
    .await;

    assert!(!result.is_error, "{}", text(&result));
    assert_eq!(backend.searches()[0].countries, vec!["usa".to_string()]);
    assert_eq!(result.meta.as_ref().unwrap()["price"], 1012);

    let pricing = call(&d, "get_trademark_pricing", json!({"countries": ["US", "United States"]})).await;
    let rows = pricing.meta.as_ref().unwrap()["pricing"].as_array().unwrap().clone();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["country"], "United States");
}

#[tokio::test]
async fn filing_total_is_null_when_a_country_is_unpriced() {
    let mut args = valid_arguments("createFiling");
    args["countries"] = json!(["Germany", "Wakanda"]);
    args["niceClasses"] = json!([9]);
    let d = dispatcher(RecordingBackend::healthy(), 1_000);
    let result = call(&d, "createFiling", args).await;

    assert!(!result.is_error, "{}", text(&result));
    assert!(result.meta.as_ref().unwrap()["totalPrice"].is_null());
}

#[tokio::test]
async fn pricing_embeds_filled_display_table() {
    let d = dispatcher(RecordingBackend::healthy(), 1_000);
    let result = call(&d, "get_trademark_pricing", json!({"countries": ["Germany"]})).await;

    let table = result
        .content
        .iter()
        .find_map(|block| match block {
            ContentBlock::Resource { resource } => Some(resource),
            ContentBlock::Text { .. } => None,
        })
        .expect("pricing embeds the display table");
    assert_eq!(table.uri, "template://pricing-display");
    assert_eq!(table.mime_type, "text/html");
    assert!(table.text.contains("<td>Germany</td><td>$1150</td><td>$180</td>"));
}

#[tokio::test]
async fn check_forwards_normalized_search_and_embeds_card() {
    let backend = RecordingBackend::healthy();
    let d = dispatcher(backend.clone(), 1_000);
    let result = call(
        &d,
        "check",
        json!({
            "trademarkName": "  Acme  ",
            "country": "United States",
            "email": "ada@example.com",
            "lastName": "   "
        }),
    )
    .await;

    assert!(!result.is_error, "{}", text(&result));
    let sent = backend.searches();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].trademark_name, "Acme");
    assert_eq!(sent[0].countries, vec!["United States".to_string()]);
    assert_eq!(sent[0].last_name, None);

    let card = result
        .content
        .iter()
        .find_map(|block| match block {
            ContentBlock::Resource { resource } => Some(resource),
            ContentBlock::Text { .. } => None,
        })
        .expect("check embeds a resource");
    assert_eq!(card.uri, "html://search-results");
    assert_eq!(card.mime_type, "text/html+skybridge");
    assert_eq!(card.text.matches("<li>").count(), 1);
    assert!(card.text.contains("$1012"));

    let meta = result.meta.as_ref().unwrap();
    assert_eq!(meta["price"], 1012);
    assert!(meta["available"].is_null());
}

#[tokio::test]
async fn get_filing_lists_backend_records() {
    let d = dispatcher(RecordingBackend::healthy(), 1_000);
    let result = call(&d, "getFiling", json!({"email": "ada@example.com", "filingId": "f-9"})).await;

    assert!(!result.is_error);
    assert!(text(&result).contains("f-9"));
    let meta = result.meta.as_ref().unwrap();
    assert_eq!(meta["filings"][0]["niceClasses"], json!([9, 42]));
    match &result.content[1] {
        ContentBlock::Resource { resource } => {
            assert_eq!(resource.uri, "html://filing-status");
            assert!(resource.text.contains("data-filing-id=\"f-9\""));
        }
        other => panic!("expected filing card, got {other:?}"),
    }
}

#[tokio::test]
async fn create_filing_is_not_deduplicated() {
    let backend = RecordingBackend::healthy();
    let d = dispatcher(backend.clone(), 1_000);
    let args = valid_arguments("createFiling");
    let first = call(&d, "createFiling", args.clone()).await;
    let second = call(&d, "createFiling", args).await;

    assert!(!first.is_error && !second.is_error);
    assert_eq!(backend.filings().len(), 2);
    assert_ne!(
        first.meta.as_ref().unwrap()["filingId"],
        second.meta.as_ref().unwrap()["filingId"]
    );
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_required_argument_is_an_error_envelope() {
    let backend = RecordingBackend::healthy();
    let d = dispatcher(backend.clone(), 1_000);
    for tool in d.list_tools().to_vec() {
        for required in tool.input_schema.required_names() {
            let mut args = valid_arguments(&tool.name);
            args.as_object_mut().unwrap().remove(required);
            let result = call(&d, &tool.name, args).await;
            assert!(result.is_error, "{} accepted missing {required}", tool.name);
            assert!(text(&result).starts_with("Error:"));
            assert!(text(&result).contains(required.as_str()));
        }
    }
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn unknown_tool_never_reaches_backend() {
    let backend = RecordingBackend::healthy();
    let d = dispatcher(backend.clone(), 1_000);
    let result = call(&d, "delete_everything", json!({"email": "ada@example.com"})).await;

    assert!(result.is_error);
    assert!(text(&result).to_lowercase().contains("unknown"));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn wrong_typed_arguments_are_rejected_before_backend() {
    let backend = RecordingBackend::healthy();
    let d = dispatcher(backend.clone(), 1_000);
    let mut args = valid_arguments("createFiling");
    args["niceClasses"] = json!(["x"]);
    let result = call(&d, "createFiling", args).await;

    assert!(result.is_error);
    assert!(text(&result).contains("niceClasses[0]"), "{}", text(&result));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn out_of_range_nice_class_is_rejected_before_backend() {
    let backend = RecordingBackend::healthy();
    let d = dispatcher(backend.clone(), 1_000);
    let mut args = valid_arguments("createFiling");
    args["niceClasses"] = json!([9, 99]);
    let result = call(&d, "createFiling", args).await;

    assert!(result.is_error);
    assert!(text(&result).contains("outside 1-45"));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn backend_failure_is_reported_in_band() {
    let backend = RecordingBackend::new(Mode::Status(500));
    let d = dispatcher(backend.clone(), 1_000);
    let result = call(&d, "search_trademark", valid_arguments("search_trademark")).await;

    assert!(result.is_error);
    assert!(result.meta.is_none());
    assert_eq!(result.content.len(), 1);
    assert!(text(&result).to_lowercase().contains("error"));
    assert!(text(&result).contains("500"));
    assert_eq!(backend.calls(), 1, "failed writes are not retried");
}

#[tokio::test]
async fn slow_backend_times_out() {
    let backend = RecordingBackend::new(Mode::Slow(Duration::from_secs(5)));
    let d = dispatcher(backend, 50);
    let result = call(&d, "check_search_status", valid_arguments("check_search_status")).await;

    assert!(result.is_error);
    assert!(text(&result).contains("timed out"));
    assert!(text(&result).contains("check_search_status"));
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

#[test]
fn every_resource_reads_as_empty_state_html() {
    let d = dispatcher(RecordingBackend::healthy(), 1_000);
    for resource in d.list_resources().to_vec() {
        let read = d.read_resource(&resource.uri).expect("registered resource");
        assert_eq!(read.contents.len(), 1);
        assert_eq!(read.contents[0].uri, resource.uri);
        assert_eq!(read.contents[0].mime_type, resource.mime_type);
        assert!(!read.contents[0].text.contains("{{"));
        assert_eq!(read, d.read_resource(&resource.uri).unwrap());
    }
}

#[test]
fn unknown_resource_is_not_found() {
    let d = dispatcher(RecordingBackend::healthy(), 1_000);
    let error = d.read_resource("html://does-not-exist").unwrap_err();
    assert!(matches!(error, DispatchError::UnknownResource(ref uri) if uri == "html://does-not-exist"));
}
