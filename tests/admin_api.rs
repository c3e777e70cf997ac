//! Admin API tests: auth, CRUD, audit views.

use mockgate::config::schema::RouteConfig;
use mockgate::AppConfig;
use serde_json::json;

mod common;

const API_KEY: &str = "test-key";

fn admin_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.admin.enabled = true;
    config.admin.api_key = API_KEY.to_string();
    config
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_admin_requires_the_bearer_token() {
    let app = common::spawn_app(admin_config()).await;

    let res = client().get(app.url("/admin/status")).send().await.unwrap();
    assert_eq!(res.status(), 401);

    let res = client()
        .get(app.url("/admin/status"))
        .bearer_auth("wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = client()
        .get(app.url("/admin/status"))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "operational");

    app.shutdown.trigger();
}

#[tokio::test]
async fn test_route_crud_roundtrip() {
    let app = common::spawn_app(admin_config()).await;
    let client = client();

    let res = client
        .post(app.url("/admin/routes"))
        .bearer_auth(API_KEY)
        .json(&json!({
            "source_pattern": "users",
            "target_base_url": "http://api.internal/v1/",
            "description": "user service"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_u64().unwrap();
    assert_eq!(created["enabled"], true);

    // Duplicate pattern is a conflict, not an upsert.
    let res = client
        .post(app.url("/admin/routes"))
        .bearer_auth(API_KEY)
        .json(&json!({
            "source_pattern": "users",
            "target_base_url": "http://other.internal/"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);

    let res = client
        .put(app.url(&format!("/admin/routes/{id}")))
        .bearer_auth(API_KEY)
        .json(&RouteConfig {
            source_pattern: "users".to_string(),
            target_base_url: "http://api.internal/v2/".to_string(),
            enabled: false,
            description: None,
        })
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(app.store.find_enabled_route("users").is_none());

    let res = client
        .delete(app.url(&format!("/admin/routes/{id}")))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(app.store.routes().is_empty());

    app.shutdown.trigger();
}

#[tokio::test]
async fn test_mock_crud_conflicts_and_validation() {
    let app = common::spawn_app(admin_config()).await;
    let client = client();

    let rule = json!({
        "http_method": "POST",
        "url_pattern": "orders",
        "request_payload": "{\"a\": 1}",
        "response_payload": "{\"ok\": true}",
        "http_status_code": 201
    });

    let res = client
        .post(app.url("/admin/mocks"))
        .bearer_auth(API_KEY)
        .json(&rule)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    // Same key (after canonicalization) conflicts.
    let res = client
        .post(app.url("/admin/mocks"))
        .bearer_auth(API_KEY)
        .json(&json!({
            "http_method": "POST",
            "url_pattern": "orders",
            "request_payload": "{ \"a\":1 }",
            "response_payload": "{}"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);

    let res = client
        .post(app.url("/admin/mocks"))
        .bearer_auth(API_KEY)
        .json(&json!({
            "http_method": "GET",
            "url_pattern": "orders",
            "response_payload": "{}",
            "http_status_code": 99
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 422);

    let res = client
        .get(app.url("/admin/mocks"))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    let rules: serde_json::Value = res.json().await.unwrap();
    assert_eq!(rules.as_array().unwrap().len(), 1);
    let rule_id = rules[0]["id"].as_u64().unwrap();

    let res = client
        .delete(app.url(&format!("/admin/mocks/{rule_id}")))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(app.store.mocks().is_empty());

    app.shutdown.trigger();
}

#[tokio::test]
async fn test_log_views_and_scoped_clear() {
    let backend = common::start_mock_backend(200, "ok").await;

    let mut config = admin_config();
    config.routes.push(RouteConfig {
        source_pattern: "users".to_string(),
        target_base_url: format!("http://{}", backend),
        enabled: true,
        description: None,
    });
    let app = common::spawn_app(config).await;
    let client = client();
    let route_id = app.store.routes()[0].id;

    for _ in 0..2 {
        let res = client
            .get(app.url("/gateway/users/42"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }

    let res = client
        .get(app.url(&format!("/admin/routes/{route_id}/logs")))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let summaries: serde_json::Value = res.json().await.unwrap();
    assert_eq!(summaries.as_array().unwrap().len(), 2);
    // Summaries carry no body columns.
    assert!(summaries[0].get("response_body").is_none());
    let record_id = summaries[0]["id"].as_u64().unwrap();

    let res = client
        .get(app.url(&format!("/admin/routes/{route_id}/logs?limit=1")))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    let limited: serde_json::Value = res.json().await.unwrap();
    assert_eq!(limited.as_array().unwrap().len(), 1);

    let res = client
        .get(app.url(&format!("/admin/logs/{record_id}")))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let record: serde_json::Value = res.json().await.unwrap();
    assert_eq!(record["response_body"], "ok");
    assert!(record["request_url"].as_str().unwrap().contains("/42"));

    let res = client
        .delete(app.url(&format!("/admin/routes/{route_id}/logs")))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let cleared: serde_json::Value = res.json().await.unwrap();
    assert_eq!(cleared["cleared"], 2);
    assert!(app.sink.records_for_route(route_id).is_empty());

    app.shutdown.trigger();
}

#[tokio::test]
async fn test_admin_disabled_by_default() {
    let app = common::spawn_app(AppConfig::default()).await;

    let res = client()
        .get(app.url("/admin/status"))
        .bearer_auth("CHANGE_ME_IN_PRODUCTION")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    app.shutdown.trigger();
}
