//! Mock matching, delay and capture tests.

use std::time::{Duration, Instant};

use mockgate::config::schema::{BasicMockConfig, MockRuleConfig};
use mockgate::AppConfig;

mod common;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

fn order_rule(payload: Option<&str>, response: &str, status: u16, delay_ms: u64) -> MockRuleConfig {
    MockRuleConfig {
        http_method: "POST".to_string(),
        url_pattern: "orders".to_string(),
        request_payload: payload.map(str::to_string),
        response_payload: response.to_string(),
        http_status_code: status,
        delay_ms,
    }
}

#[tokio::test]
async fn test_bodyless_rule_applies_delay_status_and_payload() {
    let mut config = AppConfig::default();
    config
        .mocks
        .push(order_rule(None, "{\"ok\":true}", 201, 50));
    let app = common::spawn_app(config).await;

    let started = Instant::now();
    let res = client().post(app.url("/mock/orders")).send().await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(50));
    assert_eq!(res.status(), 201);
    assert_eq!(res.text().await.unwrap(), "{\"ok\":true}");

    app.shutdown.trigger();
}

#[tokio::test]
async fn test_fingerprint_match_ignores_insignificant_whitespace() {
    let mut config = AppConfig::default();
    config.mocks.push(order_rule(
        Some("{\"item\": \"apple\", \"qty\": 2}"),
        "{\"matched\":\"apple\"}",
        200,
        0,
    ));
    config
        .mocks
        .push(order_rule(None, "{\"matched\":\"none\"}", 200, 0));
    let app = common::spawn_app(config).await;

    let raw = "{ \"item\": \"apple\",\n  \"qty\": 2 }";
    let res = client()
        .post(app.url("/mock/orders"))
        .header("content-type", "application/json")
        .body(raw)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "{\"matched\":\"apple\"}");

    // The raw body is captured back into the matched rule.
    let captured = app
        .store
        .mocks()
        .into_iter()
        .find_map(|r| r.captured_request_payload);
    assert_eq!(captured.as_deref(), Some(raw));

    app.shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_body_is_404_not_wildcarded() {
    let mut config = AppConfig::default();
    config.mocks.push(order_rule(
        Some("{\"item\": \"apple\"}"),
        "{\"matched\":\"apple\"}",
        200,
        0,
    ));
    let app = common::spawn_app(config).await;

    let res = client()
        .post(app.url("/mock/orders"))
        .body("{\"item\": \"pear\"}")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let body: serde_json::Value = res.json().await.unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("POST"));
    assert!(message.contains("orders"));

    app.shutdown.trigger();
}

#[tokio::test]
async fn test_mock2_ignores_the_request_body() {
    let mut config = AppConfig::default();
    config.basic_mocks.push(BasicMockConfig {
        http_method: "POST".to_string(),
        url_pattern: "sync/ping".to_string(),
        response_payload: "{\"pong\":true}".to_string(),
        http_status_code: 200,
        delay_ms: 0,
    });
    let app = common::spawn_app(config).await;

    // Whatever the body says, the (method, pattern) rule answers.
    let res = client()
        .post(app.url("/mock2/sync/ping"))
        .body("{\"totally\": \"irrelevant\"}")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "{\"pong\":true}");

    let res = client().post(app.url("/mock2/sync/ping")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    app.shutdown.trigger();
}

#[tokio::test]
async fn test_mock2_unknown_pattern_is_404() {
    let app = common::spawn_app(AppConfig::default()).await;

    let res = client().get(app.url("/mock2/sync/ping")).send().await.unwrap();
    assert_eq!(res.status(), 404);

    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("sync/ping"));

    app.shutdown.trigger();
}

#[tokio::test]
async fn test_method_mismatch_is_404() {
    let mut config = AppConfig::default();
    config
        .mocks
        .push(order_rule(None, "{\"ok\":true}", 200, 0));
    let app = common::spawn_app(config).await;

    let res = client().get(app.url("/mock/orders")).send().await.unwrap();
    assert_eq!(res.status(), 404);

    app.shutdown.trigger();
}
