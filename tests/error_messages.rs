//! Tests that bootstrap failures surface as errors instead of panics.

#![allow(clippy::field_reassign_with_default)]

use geo_searcher::{run_ingestion, Config};

#[tokio::test]
async fn test_invalid_config_is_reported() {
    let mut config = Config::default();
    config.kafka_topic = String::new();

    let err = run_ingestion(config).await.expect_err("empty topic");
    let message = format!("{:#}", err);
    assert!(message.contains("kafka topic"), "{message}");
}

#[tokio::test]
async fn test_invalid_collection_is_reported() {
    let mut config = Config::default();
    config.store_collection = "places; DROP TABLE places".to_string();

    let err = run_ingestion(config).await.expect_err("bad collection");
    assert!(format!("{:#}", err).contains("store collection"));
}

#[tokio::test]
async fn test_unwritable_store_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = Config::default();
    config.store_database = dir.path().join("missing").join("places.db");

    let err = run_ingestion(config).await.expect_err("missing directory");
    let message = format!("{:#}", err);
    assert!(message.contains("Failed to open document store"), "{message}");
}

#[test]
fn test_default_config_is_valid() {
    assert!(Config::default().validate().is_ok());
}
