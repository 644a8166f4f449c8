//! End-to-end export against a mocked ScraperAPI.

use chrono::NaiveDate;
use serde_json::{json, Value};
use shopee_crawler::commands::ShopCommand;
use shopee_crawler::config::{Config, PollingConfig};
use shopee_crawler::jobs::ScraperApiClient;
use shopee_crawler::shopee::{Country, ShopQuery};
use shopee_crawler::storage::DataStore;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIRST_PAGE: &str = include_str!("fixtures/search_items_page.json");

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn make_config(dir: &TempDir) -> Config {
    Config {
        api_key: Some("integration-key".to_string()),
        country: Country::Malaysia,
        chunk_size: 2,
        data_dir: Some(dir.path().to_path_buf()),
        polling: PollingConfig::immediate(),
        ..Config::default()
    }
}

fn second_page() -> String {
    json!({
        "total_count": 3,
        "items": [{ "itemid": 3, "item_basic": { "name": "Glass Straw", "price": 990000 } }]
    })
    .to_string()
}

async fn mount_shop(server: &MockServer, query: &ShopQuery) {
    Mock::given(method("POST"))
        .and(path("/jobs"))
        .and(body_partial_json(json!({ "apiKey": "integration-key", "url": query.page_url(0) })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "first",
            "status": "running",
            "statusUrl": format!("{}/jobs/first", server.uri())
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs/first"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "first",
            "status": "finished",
            "response": { "statusCode": 200, "body": FIRST_PAGE }
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/batchjobs"))
        .and(body_partial_json(json!({ "urls": [query.page_url(2)] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "second",
            "status": "running",
            "statusUrl": format!("{}/jobs/second", server.uri())
        }])))
        .expect(1)
        .mount(server)
        .await;

    // First poll of the second page is still running
    Mock::given(method("GET"))
        .and(path("/jobs/second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "second", "status": "running" })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs/second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "second",
            "status": "finished",
            "response": { "statusCode": 200, "body": second_page() }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_shop_export_end_to_end() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = make_config(&dir);
    std::fs::write(config.rates_path(), r#"{"malaysia": 0.2}"#).unwrap();

    let query = ShopQuery::new(12345, Country::Malaysia, 2).unwrap();
    mount_shop(&server, &query).await;

    let client = ScraperApiClient::with_base_url(&config, Some(server.uri())).unwrap();
    let output = ShopCommand::new(config).execute_with_client(&client, "12345", day()).await.unwrap();

    assert!(output.contains("Stainless Steel Tumbler 500ml"));
    assert!(output.contains("Total: 3 items"));

    let store = DataStore::new(dir.path());

    let raw: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(store.raw_path(12345, Country::Malaysia, day())).unwrap())
            .unwrap();
    let ids: Vec<i64> = raw.iter().map(|item| item["itemid"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![2194830111, 2194830222, 3]);

    let csv = std::fs::read_to_string(store.parsed_path(12345, Country::Malaysia, day())).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Name,Price (MYR),Price (USD)",
            "Stainless Steel Tumbler 500ml,25.9,5.18",
            "\"Bamboo Cutlery Set, 4 pcs\",12,2.40",
            "Glass Straw,9.9,1.98",
        ]
    );
}

#[tokio::test]
async fn test_shop_export_times_out() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = make_config(&dir);
    config.convert_usd = false;
    config.polling.single_max_attempts = 3;

    Mock::given(method("POST"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "slow",
            "status": "running",
            "statusUrl": format!("{}/jobs/slow", server.uri())
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs/slow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "slow", "status": "running" })))
        .expect(3)
        .mount(&server)
        .await;

    let client = ScraperApiClient::with_base_url(&config, Some(server.uri())).unwrap();
    let err = ShopCommand::new(config).execute_with_client(&client, "12345", day()).await.unwrap_err();

    assert!(format!("{err:#}").contains("unfinished after 3 polling rounds"));
    assert!(!DataStore::new(dir.path()).raw_path(12345, Country::Malaysia, day()).exists());
}
