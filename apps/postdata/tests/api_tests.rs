//! Integration tests for the POSTDATA HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.
//! Queries are answered by an in-memory executor.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::{StatusCode, header};
use axum_test::TestServer;
use postdata::api::{AppState, ErrorResponse, HealthResponse, InfoResponse, create_router};
use postdata::config::ServiceConfig;
use postdata_core::{InMemoryExecutor, QueryExecutor, ResultSet};
use serde_json::Value;
use std::sync::Arc;

const URI: &str = "http://postdata.linhd.uned.es/resource/pw_jane-doe_my-poem";
const ID: &str = "e75985ca";
const AUTHOR: &str = "http://postdata.linhd.uned.es/resource/p_jane-doe";

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// A two-stanza poem with one author.
fn fixtures() -> InMemoryExecutor {
    let per_line = |key: &str, values: [&str; 5]| {
        ResultSet::from_rows(
            ["1", "1", "1", "2", "2"]
                .into_iter()
                .zip(values)
                .map(|(stanza, value)| [("StanzaNo", stanza), (key, value)]),
        )
    };
    let patterns = |key: &str, values: [&str; 5]| {
        ResultSet::from_rows(
            ["1", "1", "1", "2", "2"]
                .into_iter()
                .zip(values)
                .map(|(stanza, value)| [("StanzaNumber", stanza), (key, value)]),
        )
    };

    InMemoryExecutor::new()
        .with_result("CorpusPoemUris", ResultSet::column("poem", [URI]))
        .with_result("CorpusCountPoems", ResultSet::column("count", ["1"]))
        .with_result("CorpusCountAuthors", ResultSet::column("count", ["1"]))
        .with_result("PoemTitle", ResultSet::column("title", ["My Poem"]))
        .with_result("PoemCreationYear", ResultSet::column("creationYear", ["1901"]))
        .with_result("PoemAuthorUris", ResultSet::column("authorUri", [AUTHOR]))
        .with_result("AuthorName", ResultSet::column("name", ["Jane Doe"]))
        .with_result(
            "PoemAutomaticScansionUri",
            ResultSet::column("scansion", [
                "http://postdata.linhd.uned.es/resource/sc_jane-doe_my-poem_1",
            ]),
        )
        .with_result("PoemCountStanzas", ResultSet::column("count", ["2"]))
        .with_result("PoemCountLines", ResultSet::column("count", ["5"]))
        .with_result("PoemCountWords", ResultSet::column("count", ["21"]))
        .with_result(
            "PoemCountLinesInStanzas",
            ResultSet::column("count", ["3", "2"]),
        )
        .with_result(
            "PoemRhymeSchemesOfStanzas",
            ResultSet::column("rhymeScheme", ["aba", "cc"]),
        )
        .with_bound_result(
            "PoemCountSyllables",
            &[URI, "pdp:hasMetricalSyllable"],
            ResultSet::column("count", ["40"]),
        )
        .with_bound_result(
            "PoemCountSyllables",
            &[URI, "pdp:hasGrammaticalSyllable"],
            ResultSet::column("count", ["43"]),
        )
        .with_bound_result(
            "PoemCountSyllablesInStanzas",
            &[URI, "pdp:hasMetricalSyllable"],
            per_line("count", ["8", "8", "8", "8", "8"]),
        )
        .with_bound_result(
            "PoemCountSyllablesInStanzas",
            &[URI, "pdp:hasGrammaticalSyllable"],
            per_line("count", ["9", "8", "9", "8", "9"]),
        )
        .with_result(
            "PoemCountWordsInStanzas",
            per_line("count", ["4", "5", "4", "4", "4"]),
        )
        .with_result(
            "PoemGrammaticalStressPatternsInStanzas",
            patterns("grammaticalStressPattern", [
                "-+-+-+-+-",
                "+--+-+-+",
                "-+-+-+-+-",
                "-+-+-+-+",
                "-+-+-+-+-",
            ]),
        )
        .with_result(
            "PoemMetricalPatternsInStanzas",
            patterns("metricalPattern", [
                "-+-+-+-+",
                "+--+-+-+",
                "-+-+-+-+",
                "-+-+-+-+",
                "-+-+-+-+",
            ]),
        )
}

/// Create a test server answering from `executor`.
fn create_server_with(executor: Arc<dyn QueryExecutor>, service: ServiceConfig) -> TestServer {
    let state = AppState::new(executor, service);
    TestServer::new(create_router(state)).unwrap()
}

fn create_test_server() -> TestServer {
    create_server_with(Arc::new(fixtures()), ServiceConfig::default())
}

// =============================================================================
// HEALTH & INFO
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_info_endpoint() {
    let server = create_test_server();

    let response = server.get("/info").await;

    response.assert_status_ok();
    let info: InfoResponse = response.json();
    assert_eq!(info.name, "POSTDATA 2 DraCor API");
    assert_eq!(info.description, "Connects POSTDATA to a DraCor-like Frontend");
    assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_info_reports_configured_version() {
    let service = ServiceConfig {
        version: "2.1".to_string(),
        ..ServiceConfig::default()
    };
    let server = create_server_with(Arc::new(fixtures()), service);

    let info: InfoResponse = server.get("/info").await.json();
    assert_eq!(info.version, "2.1");
}

// =============================================================================
// CORPORA
// =============================================================================

#[tokio::test]
async fn test_corpora_without_metrics() {
    let server = create_test_server();

    let response = server.get("/corpora").await;

    response.assert_status_ok();
    let corpora: Value = response.json();
    let corpus = &corpora[0];
    assert_eq!(corpus["name"], "postdata");
    assert_eq!(corpus["title"], "POSTDATA");
    assert!(corpus.get("metrics").is_none());
}

#[tokio::test]
async fn test_corpora_with_metrics() {
    let server = create_test_server();

    let response = server
        .get("/corpora")
        .add_query_param("include", "metrics")
        .await;

    response.assert_status_ok();
    let corpora: Value = response.json();
    assert_eq!(corpora[0]["metrics"]["poems"], 1);
    assert_eq!(corpora[0]["metrics"]["authors"], 1);
}

#[tokio::test]
async fn test_corpora_rejects_unknown_include() {
    let server = create_test_server();

    let response = server
        .get("/corpora")
        .add_query_param("include", "everything")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text(),
        "everything is not a valid value of parameter 'include'."
    );
}

// =============================================================================
// POEMS
// =============================================================================

#[tokio::test]
async fn test_list_poems() {
    let server = create_test_server();

    let response = server.get("/corpora/postdata/poems").await;

    response.assert_status_ok();
    let poems: Value = response.json();
    let poems = poems.as_array().unwrap();
    assert_eq!(poems.len(), 1);
    assert_eq!(poems[0]["id"], ID);
    assert_eq!(poems[0]["uri"], URI);
    assert_eq!(poems[0]["name"], "jane-doe_my-poem");
    assert_eq!(poems[0]["sourceUri"], "POSTDATA Poetry Lab");
    assert!(poems[0].get("authors").is_none());
}

#[tokio::test]
async fn test_unknown_corpus_is_not_found() {
    let server = create_test_server();

    let response = server.get("/corpora/dracor/poems").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let error: ErrorResponse = response.json();
    assert!(error.error.contains("dracor"));
}

#[tokio::test]
async fn test_get_poem_with_authors() {
    let server = create_test_server();

    let response = server.get(&format!("/corpora/postdata/poems/{}", ID)).await;

    response.assert_status_ok();
    let poem: Value = response.json();
    assert_eq!(poem["id"], ID);
    assert_eq!(
        poem["source"],
        "http://poetry.linhd.uned.es:3000/en/author/jane-doe/poetic-work/my-poem"
    );
    assert_eq!(poem["authors"][0]["uri"], AUTHOR);
    assert_eq!(poem["authors"][0]["name"], "Jane Doe");
    assert!(poem.get("analysis").is_none());
}

#[tokio::test]
async fn test_unknown_poem_is_not_found() {
    let server = create_test_server();

    let response = server.get("/corpora/postdata/poems/00000000").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

// =============================================================================
// ANALYSIS
// =============================================================================

#[tokio::test]
async fn test_get_analysis() {
    let server = create_test_server();

    let response = server
        .get(&format!("/corpora/postdata/poems/{}/analysis", ID))
        .await;

    response.assert_status_ok();
    let analysis: Value = response.json();
    assert_eq!(analysis["numOfStanzas"], 2);
    assert_eq!(analysis["numOfLines"], 5);
    assert_eq!(analysis["numOfLinesInStanzas"], serde_json::json!([3, 2]));
    assert_eq!(analysis["rhymeSchemesOfStanzas"], serde_json::json!(["aba", "cc"]));
    assert_eq!(
        analysis["numOfGrammaticalSyllablesInStanzas"],
        serde_json::json!([[9, 8, 9], [8, 9]])
    );
    assert_eq!(
        analysis["metricalPatternsInStanzas"][1],
        serde_json::json!(["-+-+-+-+", "-+-+-+-+"])
    );
}

#[tokio::test]
async fn test_analysis_store_failure_is_server_error() {
    // Only the corpus lookup is answered; every analysis query fails.
    let executor = InMemoryExecutor::new()
        .with_result("CorpusPoemUris", ResultSet::column("poem", [URI]));
    let server = create_server_with(Arc::new(executor), ServiceConfig::default());

    let response = server
        .get(&format!("/corpora/postdata/poems/{}/analysis", ID))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = response.json();
    assert!(!error.error.is_empty());
}

#[tokio::test]
async fn test_syllables_by_kind() {
    let server = create_test_server();

    let response = server
        .get(&format!("/corpora/postdata/poems/{}/syllables/metrical", ID))
        .await;

    response.assert_status_ok();
    let syllables: Value = response.json();
    assert_eq!(syllables["kind"], "metrical");
    assert_eq!(syllables["total"], 40);
    assert_eq!(
        syllables["inStanzas"],
        serde_json::json!([[8, 8, 8], [8, 8]])
    );
}

#[tokio::test]
async fn test_invalid_syllable_kind_is_bad_request() {
    let server = create_test_server();

    let response = server
        .get(&format!("/corpora/postdata/poems/{}/syllables/phonetic", ID))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert!(error.error.contains("phonetic"));
}

// =============================================================================
// RATE LIMITING
// =============================================================================

#[tokio::test]
async fn test_rate_limit_rejects_excess_requests() {
    let service = ServiceConfig {
        rate_limit: 1,
        ..ServiceConfig::default()
    };
    let server = create_server_with(Arc::new(fixtures()), service);

    server.get("/health").await.assert_status_ok();
    let response = server.get("/health").await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        response
            .headers()
            .get(header::RETRY_AFTER)
            .map(|v| v.as_bytes()),
        Some(&b"1"[..])
    );
    let error: ErrorResponse = response.json();
    assert!(error.error.contains("1 requests per second"));
}

#[tokio::test]
async fn test_zero_rate_limit_disables_limiting() {
    let service = ServiceConfig {
        rate_limit: 0,
        ..ServiceConfig::default()
    };
    let server = create_server_with(Arc::new(fixtures()), service);

    for _ in 0..5 {
        server.get("/health").await.assert_status_ok();
    }
}
