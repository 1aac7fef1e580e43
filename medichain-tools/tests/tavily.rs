#![cfg(feature = "search")]

use httpmock::prelude::*;
use medichain_tools::{KnowledgeSource, TavilySource, ToolError};
use serde_json::json;

#[tokio::test]
async fn lookup_posts_query_and_maps_results() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/search")
            .header("authorization", "Bearer tvly-test")
            .json_body(json!({
                "query": "triệu chứng cúm",
                "max_results": 3,
                "search_depth": "basic"
            }));
        then.status(200).json_body(json!({
            "query": "triệu chứng cúm",
            "results": [
                { "title": "Cúm mùa", "url": "https://example.org/cum", "content": "Sốt, ho, đau họng.", "score": 0.9 },
                { "title": "Trống", "url": "https://example.org/empty", "content": "  ", "score": 0.1 }
            ]
        }));
    });

    let source = TavilySource::new("tvly-test")
        .unwrap()
        .with_base_url(server.base_url());
    let docs = source.lookup("triệu chứng cúm", 3).await.unwrap();

    mock.assert();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].content, "Sốt, ho, đau họng.");
    assert_eq!(docs[0].source(), Some("https://example.org/cum"));
    assert_eq!(docs[0].metadata["title"], json!("Cúm mùa"));
}

#[tokio::test]
async fn unauthorized_key_surfaces_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/search");
        then.status(401).body("invalid key");
    });

    let source = TavilySource::new("bad").unwrap().with_base_url(server.base_url());
    let err = source.lookup("ho", 3).await.unwrap_err();
    assert!(matches!(err, ToolError::Status { status: 401, .. }));
}

#[test]
fn empty_key_is_rejected() {
    assert!(matches!(
        TavilySource::new("  "),
        Err(ToolError::InvalidConfig(_))
    ));
}
