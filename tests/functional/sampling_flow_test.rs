//! End-to-end: HTTP sample request -> sampler -> Earth Engine REST (mocked)

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use phantasm_api::config::Settings;
use phantasm_api::imagery::EarthEngineClient;
use phantasm_api::{api, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn app_against(server: &MockServer) -> Router {
    let mut settings = Settings::default();
    settings.earth_engine.base_url = server.uri();
    settings.earth_engine.project_id = Some("routes-dev".to_string());
    settings.earth_engine.access_token = Some("dev-token".to_string());

    let client = Arc::new(EarthEngineClient::new(&settings.earth_engine).unwrap());
    let state = Arc::new(AppState::new(settings, client));
    api::routes::create_router(state).await
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_ndvi_sample_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/routes-dev/value:compute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": { "NDVI": 0.71 } })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_against(&server).await;
    let (status, body) = post(
        app,
        "/api/test/ndvi",
        json!({ "lat": 52.5145, "lon": 13.3501, "date": "2024-06-15" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ndvi"], 0.71);
    assert_eq!(body["interpretation"], "High vegetation");

    let requests = server.received_requests().await.unwrap();
    let sent = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(sent.contains("COPERNICUS/S2_SR_HARMONIZED"));
    assert!(sent.contains("2024-06-08"));
    assert!(sent.contains("2024-06-23"));
    assert!(sent.contains("[13.3501,52.5145]"));
}

#[tokio::test]
async fn test_nightlight_sample_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/routes-dev/value:compute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": { "avg_rad": 4.2 } })))
        .mount(&server)
        .await;

    let app = app_against(&server).await;
    let (status, body) = post(
        app,
        "/api/test/nightlight",
        json!({ "lat": 52.4537, "lon": 13.2911, "date": "2024-03-01" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nightlight"], 4.2);
    assert_eq!(body["interpretation"], "Dark area");

    let requests = server.received_requests().await.unwrap();
    let sent = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(sent.contains("NOAA/VIIRS/DNB/MONTHLY_V1/VCMSLCFG"));
    assert!(sent.contains("2024-01-31"));
}

#[tokio::test]
async fn test_platform_outage_yields_null_sample() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let app = app_against(&server).await;
    let (status, body) = post(app, "/api/test/nightlight", json!({ "lat": 52.52, "lon": 13.40 })).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["nightlight"].is_null());
    assert_eq!(body["interpretation"], "Bright area");
}
