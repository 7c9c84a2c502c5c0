//! Weaviate client against a mocked GraphQL endpoint

use httpmock::prelude::*;
use serde_json::json;
use vec_index::{IndexError, NameQuery, SearchIndex, WeaviateClient, WeaviateSettings};

fn widget_query() -> NameQuery<'static> {
    NameQuery {
        class_name: "Product",
        field: "name",
        value: "Widget",
        limit: 1,
    }
}

#[tokio::test]
async fn test_lookup_sends_bearer_and_parses_ids() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/graphql")
                .header("authorization", "Bearer secret-key")
                .body_contains("Widget")
                .body_contains("limit: 1");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "data": { "Get": { "Product": [ { "_additional": { "id": "w-100" } } ] } }
                }));
        })
        .await;

    let client = WeaviateClient::new(&WeaviateSettings::new(server.base_url(), "secret-key")).unwrap();
    let ids = client.find_ids_by_name(&widget_query()).await.unwrap();

    assert_eq!(ids, vec!["w-100".to_string()]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_lookup_with_no_hits() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/graphql");
            then.status(200)
                .json_body(json!({ "data": { "Get": { "Product": [] } } }));
        })
        .await;

    let client = WeaviateClient::new(&WeaviateSettings::new(server.base_url(), "k")).unwrap();
    assert!(client.find_ids_by_name(&widget_query()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lookup_surfaces_http_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/graphql");
            then.status(401).body("anonymous access not enabled");
        })
        .await;

    let client = WeaviateClient::new(&WeaviateSettings::new(server.base_url(), "bad")).unwrap();
    match client.find_ids_by_name(&widget_query()).await {
        Err(IndexError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("anonymous"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_lookup_surfaces_graphql_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/graphql");
            then.status(200).json_body(json!({
                "errors": [ { "message": "Cannot query field \"Product\" on type \"GetObjectsObj\"." } ]
            }));
        })
        .await;

    let client = WeaviateClient::new(&WeaviateSettings::new(server.base_url(), "k")).unwrap();
    assert!(matches!(
        client.find_ids_by_name(&widget_query()).await,
        Err(IndexError::Graphql(_))
    ));
}

#[test]
fn test_endpoint_for_bare_host() {
    let client = WeaviateClient::new(&WeaviateSettings::new("demo.weaviate.network", "k")).unwrap();
    assert_eq!(client.endpoint(), "https://demo.weaviate.network/v1/graphql");
}
