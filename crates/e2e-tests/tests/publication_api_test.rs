//! HTTP API E2E tests for pubcat.
//!
//! Runs the real router over a RocksDB store and a Tantivy index and talks
//! to it with reqwest.

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};

use e2e_tests::TestHarness;
use pubcat_types::RecordStore;

async fn create(client: &reqwest::Client, url: &str, body: Value) -> reqwest::Response {
    client
        .post(url)
        .json(&body)
        .send()
        .await
        .expect("POST failed")
}

async fn search(client: &reqwest::Client, url: &str) -> Vec<Value> {
    let response = client.get(url).send().await.expect("GET failed");
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("Search response is not JSON")
}

/// Create the sample publication, then find it by searching its title.
#[tokio::test]
async fn test_sample_publication_roundtrip() {
    let harness = TestHarness::new();
    let server = harness.serve().await;
    let client = reqwest::Client::new();

    let response = create(
        &client,
        &server.url("/api/publications"),
        json!({
            "title": "Sample Publication",
            "rank": 1,
            "authors": ["John Doe"],
            "date": chrono::Utc::now().to_rfc3339(),
            "text": "Sample Publication Text"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let created: Value = response.json().await.unwrap();
    let id = created["_id"].as_str().expect("_id missing").to_string();
    assert_eq!(id.len(), 26);
    assert_eq!(created["title"], "Sample Publication");
    assert_eq!(created["authors"], json!(["John Doe"]));

    let results = search(&client, &server.url("/api/publications?search=Sample")).await;
    assert!(
        results.iter().any(|r| r["_id"] == id.as_str()),
        "search results should include {}: {:?}",
        id,
        results
    );

    server.stop().await;
}

/// A search hit carries exactly the record the create call returned.
#[tokio::test]
async fn test_search_hit_matches_create_response() {
    let harness = TestHarness::new();
    let server = harness.serve().await;
    let client = reqwest::Client::new();

    for body in [
        json!({ "title": "Defaulted date", "text": "no date supplied" }),
        json!({
            "title": "Supplied date",
            "rank": 2.5,
            "authors": ["Jane Roe"],
            "date": "2024-03-01T10:11:12.209346136Z",
            "text": "nanosecond timestamp"
        }),
    ] {
        let created: Value = create(&client, &server.url("/api/publications"), body)
            .await
            .json()
            .await
            .unwrap();
        let title = created["title"].as_str().unwrap().replace(' ', "%20");

        let results = search(
            &client,
            &server.url(&format!("/api/publications?search={}", title)),
        )
        .await;
        let hit = results
            .iter()
            .find(|r| r["_id"] == created["_id"])
            .expect("created record not found");
        assert_eq!(hit, &created);
    }

    server.stop().await;
}

/// Every create gets a fresh identifier, and a caller-supplied one is ignored.
#[tokio::test]
async fn test_create_assigns_unique_ids() {
    let harness = TestHarness::new();
    let server = harness.serve().await;
    let client = reqwest::Client::new();

    let mut ids = HashSet::new();
    for i in 0..5 {
        let created: Value = create(
            &client,
            &server.url("/api/publications"),
            json!({ "_id": "caller-chosen", "title": format!("Paper {}", i), "text": "body" }),
        )
        .await
        .json()
        .await
        .unwrap();
        let id = created["_id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());
        assert_ne!(id, "caller-chosen");
        assert!(ids.insert(id), "identifier reused");
    }

    server.stop().await;
}

/// An empty query returns every record, and each one is in the store.
#[tokio::test]
async fn test_empty_search_returns_all_stored() {
    let harness = TestHarness::new();
    let server = harness.serve().await;
    let client = reqwest::Client::new();

    for title in ["Graph Theory", "Compilers", "Distributed Systems"] {
        let response = create(
            &client,
            &server.url("/api/publications"),
            json!({ "title": title, "text": format!("Notes on {}", title) }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stored: HashSet<String> = harness
        .storage
        .get_all()
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();

    for url in [
        server.url("/api/publications"),
        server.url("/api/publications?search="),
    ] {
        let results = search(&client, &url).await;
        assert_eq!(results.len(), 3);
        for result in &results {
            let id = result["_id"].as_str().unwrap();
            assert!(stored.contains(id), "{} not in record store", id);
        }
    }

    server.stop().await;
}

#[tokio::test]
async fn test_search_without_match_is_empty() {
    let harness = TestHarness::new();
    let server = harness.serve().await;
    let client = reqwest::Client::new();

    create(
        &client,
        &server.url("/api/publications"),
        json!({ "title": "Ownership in Rust", "text": "Borrowing and lifetimes" }),
    )
    .await;

    let results = search(&client, &server.url("/api/publications?search=zebra")).await;
    assert_eq!(results, Vec::<Value>::new());

    server.stop().await;
}

/// Searching before anything was indexed returns an empty list, not an error.
#[tokio::test]
async fn test_search_before_index_exists() {
    let harness = TestHarness::new();
    let server = harness.serve().await;
    let client = reqwest::Client::new();

    let results = search(&client, &server.url("/api/publications?search=anything")).await;
    assert!(results.is_empty());

    server.stop().await;
}

/// Terms are OR-combined across title and text.
#[tokio::test]
async fn test_search_matches_title_or_text() {
    let harness = TestHarness::new();
    let server = harness.serve().await;
    let client = reqwest::Client::new();

    create(
        &client,
        &server.url("/api/publications"),
        json!({ "title": "Tantivy internals", "text": "segments and merges" }),
    )
    .await;
    create(
        &client,
        &server.url("/api/publications"),
        json!({ "title": "Storage engines", "text": "rocksdb compaction" }),
    )
    .await;

    let results = search(&client, &server.url("/api/publications?search=tantivy%20compaction")).await;
    assert_eq!(results.len(), 2);

    let results = search(&client, &server.url("/api/publications?search=merges")).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["title"], "Tantivy internals");

    server.stop().await;
}

/// Field prefixes and operators are ordinary words, not query syntax.
#[tokio::test]
async fn test_query_operators_are_plain_words() {
    let harness = TestHarness::new();
    let server = harness.serve().await;
    let client = reqwest::Client::new();

    create(
        &client,
        &server.url("/api/publications"),
        json!({ "title": "Sample Publication", "authors": ["John Doe"], "text": "Sample Publication Text" }),
    )
    .await;

    for query in ["authors:doe", "doc_id:x%20OR%20authors:john", "John"] {
        let url = server.url(&format!("/api/publications?search={}", query));
        assert!(search(&client, &url).await.is_empty(), "query {:?} matched", query);
    }

    for query in ["-Sample", "Sample%20AND%20Missing", "rust%20AND%20(text"] {
        let url = server.url(&format!("/api/publications?search={}", query));
        assert_eq!(search(&client, &url).await.len(), 1, "query {:?}", query);
    }

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_payloads_are_rejected() {
    let harness = TestHarness::new();
    let server = harness.serve().await;
    let client = reqwest::Client::new();
    let url = server.url("/api/publications");

    let response = client
        .post(&url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("malformed payload"));

    let response = create(&client, &url, json!(["not", "an", "object"])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.post(&url).body("title=x").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = create(&client, &url, json!({ "title": "   ", "text": "blank title" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    assert!(harness.storage.get_all().unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let harness = TestHarness::new();
    let server = harness.serve().await;
    let client = reqwest::Client::new();

    let index = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(index.status(), StatusCode::OK);
    assert!(index.text().await.unwrap().contains("<title>Publications</title>"));

    let css = client.get(server.url("/styles.css")).send().await.unwrap();
    assert_eq!(css.status(), StatusCode::OK);

    let missing = client.get(server.url("/nope.html")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    server.stop().await;
}

/// The script is read from disk on each request, so edits show up without a restart.
#[tokio::test]
async fn test_app_js_is_read_on_demand() {
    let harness = TestHarness::new();
    let server = harness.serve().await;
    let client = reqwest::Client::new();

    let first = client.get(server.url("/app.js")).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(
        first.headers()["content-type"].to_str().unwrap(),
        "text/javascript"
    );
    assert_eq!(first.text().await.unwrap(), "console.log('v1');");

    std::fs::write(harness.static_dir.join("app.js"), "console.log('v2');").unwrap();

    let second = client.get(server.url("/app.js")).send().await.unwrap();
    assert_eq!(second.text().await.unwrap(), "console.log('v2');");

    server.stop().await;
}

/// The bundled UI in the repository serves as-is.
#[tokio::test]
async fn test_bundled_ui_is_served() {
    let public = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../public");
    let harness = TestHarness::new();
    let server = harness.serve_from(&public).await;
    let client = reqwest::Client::new();

    let index = client.get(server.url("/index.html")).send().await.unwrap();
    assert_eq!(index.status(), StatusCode::OK);
    assert!(index.text().await.unwrap().contains("app.js"));

    let script = client.get(server.url("/app.js")).send().await.unwrap();
    assert_eq!(script.status(), StatusCode::OK);
    assert!(script.text().await.unwrap().contains("/api/publications"));

    server.stop().await;
}
