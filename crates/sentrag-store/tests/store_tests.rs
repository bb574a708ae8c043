use mockito::{Matcher, Server};
use serde_json::json;

use sentrag_core::config::StoreSettings;
use sentrag_core::types::{SearchMode, SearchQuery, VectorRow};
use sentrag_store::{InfinityStore, StoreError};

const DOCS: &str = "/databases/rfs/tables/data/docs";

fn store_for(server: &Server) -> InfinityStore {
    InfinityStore::new(&server.url(), "rfs", "data", None).expect("store")
}

fn row(name: &str, index: usize, text: &str, vector: Vec<f32>) -> VectorRow {
    VectorRow { name: name.to_string(), index, text: text.to_string(), vector }
}

#[test]
fn insert_posts_all_rows_in_one_payload() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", DOCS)
        .match_body(Matcher::Json(json!([
            { "name": "days.txt", "fulltext_column": "Today is Saturday.", "index": 0, "dense_column": [0.5, 0.25] },
            { "name": "days.txt", "fulltext_column": "Tomorrow is Sunday.", "index": 1, "dense_column": [0.125, 1.0] }
        ])))
        .with_status(200)
        .with_body(json!({ "error_code": 0 }).to_string())
        .expect(1)
        .create();

    store_for(&server)
        .insert(&[
            row("days.txt", 0, "Today is Saturday.", vec![0.5, 0.25]),
            row("days.txt", 1, "Tomorrow is Sunday.", vec![0.125, 1.0]),
        ])
        .expect("insert");
    mock.assert();
}

#[test]
fn insert_error_code_surfaces_store_message() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", DOCS)
        .with_status(200)
        .with_body(json!({ "error_code": 7012, "error_msg": "Column dense_column: dimension mismatch" }).to_string())
        .create();

    let err = store_for(&server).insert(&[row("a.txt", 0, "x", vec![1.0])]).expect_err("rejected");
    assert!(matches!(err, StoreError::Rejected { code: 7012, .. }), "got: {err}");
    assert!(err.to_string().contains("Column dense_column: dimension mismatch"));
}

#[test]
fn insert_error_in_non_success_status_keeps_store_message() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", DOCS)
        .with_status(500)
        .with_body(json!({ "error_code": 3022, "error_msg": "Table data doesn't exist" }).to_string())
        .create();

    let err = store_for(&server).insert(&[row("a.txt", 0, "x", vec![1.0])]).expect_err("rejected");
    assert!(err.to_string().contains("Table data doesn't exist"), "got: {err}");
}

#[test]
fn non_success_status_without_envelope_is_a_status_error() {
    let mut server = Server::new();
    let _mock = server.mock("POST", DOCS).with_status(502).with_body("bad gateway").create();

    let err = store_for(&server).insert(&[row("a.txt", 0, "x", vec![1.0])]).expect_err("502");
    assert!(matches!(err, StoreError::Status { .. }), "got: {err}");
}

#[test]
fn inserted_row_round_trips_through_search() {
    let inserted = row("notes/days.txt", 4, "Today is Saturday.", vec![0.5]);

    let mut server = Server::new();
    let _insert = server.mock("POST", DOCS).with_status(200).with_body(r#"{"error_code":0}"#).create();
    let search = server
        .mock("GET", DOCS)
        .match_body(Matcher::PartialJson(json!({
            "output": ["name", "index", "fulltext_column"],
            "search": [{ "match_method": "text", "fields": "fulltext_column", "matching_text": "Saturday", "topn": 2 }]
        })))
        .with_status(200)
        .with_body(
            json!({
                "error_code": 0,
                "output": [[
                    { "name": "notes/days.txt" },
                    { "index": 4 },
                    { "fulltext_column": "Today is Saturday." }
                ]],
                "total_hits_count": 1
            })
            .to_string(),
        )
        .create();

    let store = store_for(&server);
    store.insert(std::slice::from_ref(&inserted)).expect("insert");
    let hits = store.search(&SearchQuery::new(2).with_text("Saturday")).expect("search");
    search.assert();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, inserted.name);
    assert_eq!(hits[0].index, inserted.index);
    assert_eq!(hits[0].text, inserted.text);
}

#[test]
fn search_error_code_surfaces_store_message() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", DOCS)
        .with_status(200)
        .with_body(json!({ "error_code": 3077, "error_msg": "Fulltext index not found on fulltext_column" }).to_string())
        .create();

    let err = store_for(&server).search(&SearchQuery::new(2).with_text("x")).expect_err("rejected");
    assert!(err.to_string().contains("Fulltext index not found on fulltext_column"), "got: {err}");
}

#[test]
fn search_with_null_output_finds_nothing() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", DOCS)
        .with_status(200)
        .with_body(r#"{"error_code":0,"error_msg":null,"output":null,"total_hits_count":0}"#)
        .create();

    let hits = store_for(&server).search(&SearchQuery::new(2).with_text("nothing matches")).expect("search");
    assert!(hits.is_empty());
}

#[test]
fn search_rejects_rows_with_drifted_schema() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", DOCS)
        .with_status(200)
        .with_body(
            json!({
                "error_code": 0,
                "output": [
                    [{ "name": "a.txt" }, { "index": 0 }, { "fulltext_column": "ok" }],
                    [{ "name": "b.txt" }, { "idx": 1 }, { "fulltext_column": "drifted" }]
                ]
            })
            .to_string(),
        )
        .create();

    let err = store_for(&server).search(&SearchQuery::new(2).with_text("x")).expect_err("row 1 lacks index");
    assert!(matches!(err, StoreError::InvalidRow { row: 1, .. }), "got: {err}");
}

#[test]
fn dense_store_requires_a_vector() {
    let server = Server::new();
    let store = store_for(&server).with_mode(SearchMode::Dense);
    let err = store.search(&SearchQuery::new(2).with_text("no vector")).expect_err("missing vector");
    assert!(matches!(err, StoreError::MissingQueryInput { .. }), "got: {err}");
}

#[test]
fn hybrid_search_sends_filter_and_reads_scores() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", DOCS)
        .match_body(Matcher::PartialJson(json!({
            "output": ["name", "index", "fulltext_column", "_score"],
            "filter": "name = 'days.txt'"
        })))
        .with_status(200)
        .with_body(
            json!({
                "error_code": 0,
                "output": [[{ "name": "days.txt" }, { "index": 1 }, { "fulltext_column": "Tomorrow is Sunday." }, { "_score": 0.75 }]]
            })
            .to_string(),
        )
        .create();

    let store = store_for(&server).with_mode(SearchMode::Hybrid).with_filter("name = 'days.txt'");
    let hits = store
        .search(&SearchQuery::new(1).with_text("Sunday").with_vector(vec![0.5]).with_score(true))
        .expect("search");
    mock.assert();
    assert_eq!(hits[0].score, Some(0.75));
}

#[test]
fn from_settings_builds_docs_url_and_rejects_unknown_metric() {
    let settings = StoreSettings {
        base_url: "http://store.local:23820/".to_string(),
        database: "library".to_string(),
        table: "books".to_string(),
        mode: SearchMode::Hybrid,
        ..StoreSettings::default()
    };
    let store = InfinityStore::from_settings(&settings).expect("store");
    assert_eq!(store.docs_url(), "http://store.local:23820/databases/library/tables/books/docs");
    assert_eq!(store.mode(), SearchMode::Hybrid);

    let bad = StoreSettings { metric: "hamming".to_string(), ..StoreSettings::default() };
    assert!(InfinityStore::from_settings(&bad).is_err());
}
