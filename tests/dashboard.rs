//! End-to-end tests for the dashboard page and JSON API

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use weatherwiz::config::{ModelConfig, WeatherConfig};
use weatherwiz::dashboard::{DashboardRenderer, SUCCESS_STATUS};
use weatherwiz::{AppState, Predictor, WeatherClient, web};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn write_artifacts(dir: &Path) -> ModelConfig {
    let classifier_path = dir.join("random_forest_model.json");
    let label_encoder_path = dir.join("label_encoder.json");
    std::fs::write(
        &classifier_path,
        serde_json::json!({
            "n_features": 4,
            "n_classes": 3,
            "trees": [
                { "nodes": [
                    { "feature": 0, "threshold": 0.5, "left": 1, "right": 2 },
                    { "value": [2.0, 9.0, 1.0] },
                    { "value": [6.0, 0.0, 3.0] }
                ] },
                { "nodes": [{ "value": [1.0, 3.0, 2.0] }] }
            ]
        })
        .to_string(),
    )
    .unwrap();
    std::fs::write(
        &label_encoder_path,
        serde_json::json!({ "classes": ["Clear", "Clouds", "Rain"] }).to_string(),
    )
    .unwrap();
    ModelConfig {
        classifier_path,
        label_encoder_path,
    }
}

async fn provider() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "main": {"temp": 15.0, "humidity": 0.8, "pressure": 1012},
            "wind": {"speed": 3.0}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", ""))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"cod": "400", "message": "Nothing to geocode"})),
        )
        .mount(&server)
        .await;
    server
}

fn app(server: &MockServer, model: &ModelConfig) -> axum::Router {
    app_with_limit(server, model, 16 * 1024)
}

fn app_with_limit(server: &MockServer, model: &ModelConfig, max_body_bytes: usize) -> axum::Router {
    let weather = WeatherClient::new(&WeatherConfig {
        api_key: Some("test_api_key_123".to_string()),
        base_url: server.uri(),
        ..WeatherConfig::default()
    })
    .unwrap();
    let state = AppState {
        weather: Arc::new(weather),
        predictor: Predictor::new(model),
        renderer: Arc::new(DashboardRenderer::new("bG9nbw==".to_string()).unwrap()),
    };
    web::router(state, max_body_bytes)
}

fn submit(city: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("city={}", urlencoding::encode(city))))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_initial_page_is_blank() {
    let server = provider().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&server, &write_artifacts(dir.path()));

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Input Options"));
    assert!(html.contains("placeholder=\"For example London...\""));
    assert!(html.contains("data:image/png;base64,bG9nbw=="));
    assert!(html.contains("Temperature (🌡):  °C"));
    assert!(html.contains("Humidity:(🌥️)  %"));
    assert!(html.contains("Windspeed:(💨)  km/hr"));
    assert!(html.contains("Pressure:(🕧)  millibars"));
    assert!(!html.contains(SUCCESS_STATUS));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_london_submission_shows_readings_and_label() {
    let server = provider().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&server, &write_artifacts(dir.path()));

    let response = app.oneshot(submit("London")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains(SUCCESS_STATUS));
    assert!(html.contains("Temperature (🌡): 15.0 °C"));
    assert!(html.contains("Humidity:(🌥️) 0.8 %"));
    assert!(html.contains("Windspeed:(💨) 10.8 km/hr"));
    assert!(html.contains("Pressure:(🕧) 1012 millibars"));
    // Scaled input is all zeros: tree 1 goes left, so "Clouds" wins
    assert!(html.contains("Current Weather expected to be: Clouds"));
    assert!(html.contains("value=\"London\""));
}

#[tokio::test]
async fn test_empty_city_shows_error_in_sidebar() {
    let server = provider().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&server, &write_artifacts(dir.path()));

    let response = app.oneshot(submit("")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<div class=\"error\">Nothing to geocode</div>"));
    assert!(html.contains("Temperature (🌡):  °C"));
    assert!(html.contains("Current Weather expected to be: </p>"));
    assert!(!html.contains(SUCCESS_STATUS));
}

#[tokio::test]
async fn test_missing_model_fails_request() {
    let server = provider().await;
    let dir = tempfile::tempdir().unwrap();
    let model = ModelConfig {
        classifier_path: dir.path().join("missing.json"),
        label_encoder_path: dir.path().join("missing_labels.json"),
    };
    let app = app(&server, &model);

    let response = app.oneshot(submit("London")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = body_text(response).await;
    assert!(html.contains("Weather prediction failed"));
}

#[tokio::test]
async fn test_api_report() {
    let server = provider().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&server, &write_artifacts(dir.path()));

    let response = app
        .oneshot(
            Request::get("/api/report?city=London")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(report["city"], "London");
    assert_eq!(report["prediction"], "Clouds");
    assert_eq!(report["reading"]["temperature_c"], 15.0);
    assert_eq!(report["reading"]["humidity_pct"], 0.8);
    assert_eq!(report["reading"]["wind_speed_kmh"], 10.8);
    assert_eq!(report["reading"]["pressure_mb"], 1012.0);
    assert!(report["generated_at"].is_string());
}

#[tokio::test]
async fn test_api_report_upstream_error() {
    let server = provider().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&server, &write_artifacts(dir.path()));

    let response = app
        .oneshot(Request::get("/api/report?city=").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "Nothing to geocode");
}

#[tokio::test]
async fn test_health() {
    let server = provider().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&server, &write_artifacts(dir.path()));

    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_oversized_form_is_rejected() {
    let server = provider().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_limit(&server, &write_artifacts(dir.path()), 64);

    let response = app.oneshot(submit(&"a".repeat(200))).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cors_headers_on_api() {
    let server = provider().await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&server, &write_artifacts(dir.path()));

    let response = app
        .oneshot(
            Request::get("/api/health")
                .header(header::ORIGIN, "http://example.test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_unreachable_provider_keeps_api_key_off_the_page() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let weather = WeatherClient::new(&WeatherConfig {
        api_key: Some("test_api_key_123".to_string()),
        base_url,
        timeout_seconds: 5,
        ..WeatherConfig::default()
    })
    .unwrap();
    let state = AppState {
        weather: Arc::new(weather),
        predictor: Predictor::new(&write_artifacts(dir.path())),
        renderer: Arc::new(DashboardRenderer::new(String::new()).unwrap()),
    };

    let response = web::router(state.clone(), 16 * 1024)
        .oneshot(submit("London"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<div class=\"error\">error sending request"));
    assert!(!html.contains("test_api_key_123"));

    let response = web::router(state, 16 * 1024)
        .oneshot(
            Request::get("/api/report?city=London")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(!body_text(response).await.contains("test_api_key_123"));
}
