use super::common;

use channel_lister::adapters::amazon::{AmazonSpApiService, SpApiClient};
use channel_lister::adapters::cache::{Cache, FileCache, InMemoryCache, SharedCache, TieredCache};
use channel_lister::adapters::ServiceError;
use channel_lister::config::AmazonSettings;
use channel_lister::domain::{FieldKind, WidgetKind};
use common::mock_server::{MockServer, ACCESS_TOKEN};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn settings(server: &MockServer) -> AmazonSettings {
    let mut settings = AmazonSettings::for_marketplace("ATVPDBKIKQHOKH");
    settings.endpoint = Some(server.base_url.clone());
    settings.token_endpoint = server.url("/auth/o2/token");
    settings.client_id = Some("amzn1.application-oa2-client.test".to_string());
    settings.client_secret = Some("secret".to_string());
    settings.refresh_token = Some("Atzr|refresh".to_string());
    settings.seller_id = Some("A2SELLER".to_string());
    settings.requests_per_second = 100;
    settings.burst_size = 100;
    settings
}

fn service_with(server: &MockServer, cache: SharedCache) -> AmazonSpApiService {
    let client = SpApiClient::new(&settings(server), cache.clone()).unwrap();
    AmazonSpApiService::new(Arc::new(client), cache, Duration::from_secs(3600))
}

fn memory_service(server: &MockServer) -> AmazonSpApiService {
    service_with(server, Arc::new(InMemoryCache::new()))
}

fn disk_service(server: &MockServer, dir: &Path) -> AmazonSpApiService {
    service_with(server, Arc::new(TieredCache::new(FileCache::new(dir))))
}

#[tokio::test]
async fn test_linked_schema_is_fetched_and_mapped() {
    let server = MockServer::start().await;
    let service = memory_service(&server);

    let fields = service.product_type_fields("LUGGAGE").await.unwrap();
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "item_name",
            "item_package_weight_value",
            "item_package_weight_unit",
            "is_expiration_dated_product",
        ]
    );
    assert!(fields[0].required);
    assert_eq!(fields[3].widget_kind, WidgetKind::Select);
    assert_eq!(fields[3].widget_aux.as_deref(), Some("Yes==true||No==false"));

    assert_eq!(MockServer::count(&server.calls.definitions), 1);
    assert_eq!(MockServer::count(&server.calls.schema_documents), 1);
}

#[tokio::test]
async fn test_schema_is_served_from_cache_on_second_call() {
    let server = MockServer::start().await;
    let service = memory_service(&server);

    let first = service.product_type_schema("LUGGAGE").await.unwrap();
    let second = service.product_type_schema("LUGGAGE").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(MockServer::count(&server.calls.definitions), 1);
    assert_eq!(MockServer::count(&server.calls.schema_documents), 1);
}

#[tokio::test]
async fn test_disk_tier_outlives_the_process_cache() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    disk_service(&server, temp_dir.path())
        .product_type_schema("LUGGAGE")
        .await
        .unwrap();

    // A fresh memory tier, same directory
    let fields = disk_service(&server, temp_dir.path())
        .product_type_fields("LUGGAGE")
        .await
        .unwrap();

    assert_eq!(fields.len(), 4);
    assert_eq!(MockServer::count(&server.calls.definitions), 1);
    assert_eq!(MockServer::count(&server.calls.schema_documents), 1);
}

#[tokio::test]
async fn test_embedded_schema_skips_the_link_fetch() {
    let server = MockServer::start().await;
    let service = memory_service(&server);

    let fields = service.product_type_fields("SHIRT").await.unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "color");
    assert_eq!(fields[0].widget_aux.as_deref(), Some("red||blue"));
    assert_eq!(MockServer::count(&server.calls.schema_documents), 0);
}

#[tokio::test]
async fn test_definition_without_schema_is_a_parse_error() {
    let server = MockServer::start().await;
    let service = memory_service(&server);

    let err = service.product_type_schema("BROKEN").await.unwrap_err();
    assert!(matches!(err, ServiceError::Parse(_)), "unexpected error {:?}", err);
}

#[tokio::test]
async fn test_non_object_schema_document_is_not_cached() {
    let server = MockServer::start().await;
    let cache = Arc::new(InMemoryCache::new());
    let service = service_with(&server, cache.clone());

    for _ in 0..2 {
        let err = service.product_type_schema("NOT_OBJECT").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidSchema(_)), "unexpected error {:?}", err);
    }

    assert_eq!(MockServer::count(&server.calls.schema_documents), 2);
    assert!(cache.get("amazon_schema:ATVPDBKIKQHOKH:NOT_OBJECT").await.is_none());
}

#[tokio::test]
async fn test_unknown_product_type_is_an_api_error() {
    let server = MockServer::start().await;
    let service = memory_service(&server);

    match service.product_type_fields("SPACESHIP").await {
        Err(ServiceError::Api { status, message }) => {
            assert_eq!(status, 404);
            assert!(message.contains("NotFound"));
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn test_records_are_numbered_amazon_rows() {
    let server = MockServer::start().await;
    let service = memory_service(&server);

    let records = service.product_type_records("LUGGAGE").await.unwrap();
    let orderings: Vec<u32> = records.iter().map(|r| r.ordering).collect();
    assert_eq!(orderings, vec![1, 2, 3, 4]);
    assert!(records.iter().all(|r| r.marketplace == "amazon"));
    assert!(records.iter().all(|r| r.field_type == FieldKind::Amazon));
    assert_eq!(records[1].input_type, "decimal");
    assert_eq!(records[1].grouping, "Package Weight");
}

#[tokio::test]
async fn test_access_token_is_reused() {
    let server = MockServer::start().await;
    let service = memory_service(&server);

    service.product_type_schema("SHIRT").await.unwrap();
    let found = service
        .search_product_types(&["luggage".to_string()])
        .await
        .unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].name, "LUGGAGE");
    assert_eq!(MockServer::count(&server.calls.token), 1);
}

#[tokio::test]
async fn test_rejected_token_is_refreshed() {
    let server = MockServer::start().await;
    let service = memory_service(&server);

    match service.product_type_schema("REVOKED").await {
        Err(ServiceError::Api { status, .. }) => assert_eq!(status, 403),
        other => panic!("unexpected result {:?}", other),
    }

    // The revoked token was dropped, so this fetches a new one
    service.product_type_schema("SHIRT").await.unwrap();
    assert_eq!(MockServer::count(&server.calls.token), 2);
}

#[tokio::test]
async fn test_bad_refresh_token_is_an_authentication_error() {
    let server = MockServer::start().await;
    let mut settings = settings(&server);
    settings.refresh_token = Some("Atzr|wrong".to_string());

    let cache: SharedCache = Arc::new(InMemoryCache::new());
    let client = SpApiClient::new(&settings, cache.clone()).unwrap();
    let service = AmazonSpApiService::new(Arc::new(client), cache, Duration::from_secs(60));

    let err = service.product_type_schema("SHIRT").await.unwrap_err();
    assert!(matches!(err, ServiceError::Authentication(_)), "unexpected error {:?}", err);
}

#[tokio::test]
async fn test_token_lands_in_the_shared_cache() {
    let server = MockServer::start().await;
    let cache = Arc::new(InMemoryCache::new());
    let service = service_with(&server, cache.clone());

    service.product_type_schema("SHIRT").await.unwrap();

    assert_eq!(
        cache.get("amazon_lwa_token:amzn1.application-oa2-client.test").await,
        Some(json!(ACCESS_TOKEN))
    );
    assert!(cache.get("amazon_schema:ATVPDBKIKQHOKH:SHIRT").await.is_some());
}

#[tokio::test]
async fn test_submit_listing_sends_attribute_envelopes() {
    let server = MockServer::start().await;
    let service = memory_service(&server);

    let values: HashMap<String, String> = [
        ("item_name", "Carry-on Spinner"),
        ("item_package_weight_value", "7.5"),
        ("item_package_weight_unit", "pounds"),
        ("is_expiration_dated_product", "false"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let result = service
        .submit_listing("SKU-001", "LUGGAGE", &values)
        .await
        .unwrap();
    assert!(result.is_accepted());
    assert_eq!(result.sku, "SKU-001");

    let listings = server.listings.lock().unwrap();
    assert_eq!(listings.len(), 1);
    let body = &listings[0];
    assert_eq!(body["productType"], "LUGGAGE");
    assert_eq!(body["requirements"], "LISTING");
    assert_eq!(
        body["attributes"]["item_name"],
        json!([{ "value": "Carry-on Spinner", "language_tag": "en_US", "marketplace_id": "ATVPDBKIKQHOKH" }])
    );
    assert_eq!(
        body["attributes"]["item_package_weight"],
        json!([{ "marketplace_id": "ATVPDBKIKQHOKH", "value": 7.5, "unit": "pounds" }])
    );
    assert_eq!(
        body["attributes"]["is_expiration_dated_product"],
        json!([{ "value": false, "marketplace_id": "ATVPDBKIKQHOKH" }])
    );
}
