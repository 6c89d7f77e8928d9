//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! the /api/v1/* endpoints using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port.

use blendiq::api::{create_app, ApiState};
use blendiq::config::{BlendiqConfig, ReferenceData, SolverSettings};
use blendiq::BlendOptimizer;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn create_test_state() -> ApiState {
    ApiState::from_config(&BlendiqConfig::default())
}

async fn body_json(resp: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).expect("response should be valid JSON")
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn lead_request() -> Value {
    json!({
        "materials": [
            {"id": "m1", "name": "Made ground", "availableTonnage": 500,
             "parameters": {"Lead": {"value": 600, "unit": "mg/kg"}}},
            {"id": "m2", "name": "Screened topsoil", "availableTonnage": 300,
             "parameters": {"Lead": {"value": 100, "unit": "mg/kg"}}}
        ],
        "config": {"selectedParameters": ["Lead"], "tolerance": 30, "autoRelax": true}
    })
}

/// All GET endpoints should return 200.
#[tokio::test]
async fn test_get_endpoints_return_200() {
    let endpoints = ["/api/v1/health", "/api/v1/reference", "/health"];

    for endpoint in &endpoints {
        let app = create_app(create_test_state());
        let resp = app
            .oneshot(Request::builder().uri(*endpoint).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(
            resp.status().is_success(),
            "GET {endpoint} returned status {}",
            resp.status()
        );
    }
}

#[tokio::test]
async fn test_health_envelope() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["data"]["status"], "ok");
    assert_eq!(v["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(v["meta"]["version"], "1");
}

#[tokio::test]
async fn test_reference_lists_standard_tables() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(Request::builder().uri("/api/v1/reference").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let v = body_json(resp).await;
    let data = &v["data"];
    assert_eq!(data["limits"]["Lead"]["upper"], 450.0);
    assert!(data["limits"]["Lead"].get("lower").is_none());
    assert!(data["zero_seeking"]
        .as_array()
        .unwrap()
        .contains(&json!("Arsenic")));
    assert_eq!(data["categories"]["Zinc"], "heavy_metals");
    assert_eq!(data["soil_texture"]["clay"], json!([8.0, 35.0]));
}

#[tokio::test]
async fn test_optimize_returns_result() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(post_json("/api/v1/optimize", &lead_request()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    let data = &v["data"];

    assert_eq!(data["success"], true);
    let ratios = data["blendRatios"].as_object().unwrap();
    let sum: f64 = ratios.values().map(|r| r.as_f64().unwrap()).sum();
    assert!((sum - 1.0).abs() < 1e-6);

    let rows = data["tonnageBreakdown"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["materialName"], "Made ground");
    assert!(rows[0].get("remaining").is_some());

    assert_eq!(data["residuals"][0]["parameter"], "Lead");
    assert!(data["compliance"].get("meanResidual").is_some());
    assert_eq!(data["optimizationDetails"]["method"], "projected-gradient");
    assert!(data["optimizationDetails"].get("relaxedTolerance").is_none());
    assert!(data.get("soilTexture").is_none());
}

#[tokio::test]
async fn test_optimize_rejects_single_material() {
    let mut body = lead_request();
    body["materials"].as_array_mut().unwrap().truncate(1);

    let app = create_app(create_test_state());
    let resp = app.oneshot(post_json("/api/v1/optimize", &body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v = body_json(resp).await;
    assert_eq!(v["error"]["code"], "BAD_REQUEST");
    assert!(v["error"]["message"]
        .as_str()
        .unwrap()
        .contains("At least 2 materials"));
}

#[tokio::test]
async fn test_optimize_rejects_unknown_constraint_material() {
    let mut body = lead_request();
    body["config"]["materialConstraints"] = json!([{"materialId": "ghost", "maxPercentage": 20}]);

    let app = create_app(create_test_state());
    let resp = app.oneshot(post_json("/api/v1/optimize", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_optimize_rejects_malformed_json() {
    let app = create_app(create_test_state());
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/optimize")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"materials\": ["))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v = body_json(resp).await;
    assert_eq!(v["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_optimize_rejects_missing_config() {
    let mut body = lead_request();
    body.as_object_mut().unwrap().remove("config");

    let app = create_app(create_test_state());
    let resp = app.oneshot(post_json("/api/v1/optimize", &body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_optimize_rejects_oversized_body() {
    let mut state = create_test_state();
    state.max_body_bytes = 64;

    let app = create_app(state);
    let resp = app
        .oneshot(post_json("/api/v1/optimize", &lead_request()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_optimize_times_out() {
    // Stagnation never stops an attempt, so every relax level runs the full cap
    let settings = SolverSettings {
        max_iterations: 5_000,
        stagnation_window: usize::MAX,
        ..SolverSettings::default()
    };
    let mut state = create_test_state();
    state.optimizer = Arc::new(BlendOptimizer::new(ReferenceData::bs3882(), settings));
    state.optimize_timeout = Duration::ZERO;

    let materials: Vec<Value> = (0..40)
        .map(|i| {
            json!({
                "id": format!("m{i}"),
                "name": format!("Stockpile {i}"),
                "availableTonnage": 100,
                "parameters": {
                    "Lead": {"value": 900 + i},
                    "Zinc": {"value": 900 + i},
                    "Nickel": {"value": 400 + i},
                    "Copper": {"value": 900 + i}
                }
            })
        })
        .collect();
    let body = json!({
        "materials": materials,
        "config": {"selectedParameters": ["Lead", "Zinc", "Nickel", "Copper"]}
    });

    let app = create_app(state);
    let resp = app.oneshot(post_json("/api/v1/optimize", &body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    let v = body_json(resp).await;
    assert_eq!(v["error"]["code"], "TIMEOUT");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = create_app(create_test_state());
    let resp = app
        .oneshot(Request::builder().uri("/api/v1/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
