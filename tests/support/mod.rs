//! 検出サービスのローカル代役

#![allow(dead_code)]

use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use car_inspector::config::Config;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

pub fn sample_response() -> Value {
    json!({
        "image_path": "/srv/uploads/car.jpg",
        "car_condition": "damaged",
        "has_damages": true,
        "total_damages": 2,
        "damage_stats": {"scratch": 1, "dent": 1},
        "detections": [
            {"class": "scratch", "class_id": 0, "confidence": 0.8,
             "bbox": {"x1": 10, "y1": 20, "x2": 110, "y2": 70, "width": 100, "height": 50}},
            {"class": "dent", "class_id": 1, "confidence": 0.6,
             "bbox": {"x1": 200, "y1": 150, "x2": 260, "y2": 230, "width": 60, "height": 80}}
        ],
        "filename": "car.jpg",
        "file_size": 1024,
        "conf_threshold": 0.25,
        "visualization": "aGVsbG8="
    })
}

/// 期待するフォーム項目が揃っているときだけ本物と同じ応答を返す
async fn detect(mut multipart: Multipart) -> Result<Json<Value>, StatusCode> {
    let mut fields: HashMap<String, Vec<u8>> = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        fields.insert(name, data.to_vec());
    }

    let ok = fields.get("file").is_some_and(|f| !f.is_empty())
        && fields.get("conf_threshold").map(Vec::as_slice) == Some(b"0.25".as_slice())
        && fields.get("include_visualization").map(Vec::as_slice) == Some(b"true".as_slice());
    if !ok {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    Ok(Json(sample_response()))
}

pub fn healthy_service() -> Router {
    Router::new()
        .route("/detect", post(detect))
        .route(
            "/health",
            get(|| async { Json(json!({"status": "ok", "device": "cpu", "damage_classes": ["scratch", "dent", "rust", "crack"]})) }),
        )
        .route(
            "/model_info",
            get(|| async { Json(json!({"model": "yolov8n-damage", "classes": 4})) }),
        )
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
}

pub fn broken_service() -> Router {
    Router::new()
        .route("/detect", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/health", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .route("/model_info", get(|| async { StatusCode::NOT_FOUND }))
}

pub fn garbled_service() -> Router {
    Router::new()
        .route("/detect", post(|| async { "<html>gateway error</html>" }))
        .route("/health", get(|| async { "up" }))
}

/// 200応答だが `/health` のフィールド型が想定外
pub fn odd_health_service() -> Router {
    Router::new().route(
        "/health",
        get(|| async {
            Json(json!({
                "status": "healthy",
                "device": {"name": "cuda", "index": 0},
                "damage_classes": {"0": "scratch", "1": "dent"}
            }))
        }),
    )
}

pub fn slow_service(delay: Duration) -> Router {
    Router::new()
        .route(
            "/detect",
            post(move || async move {
                tokio::time::sleep(delay).await;
                Json(sample_response())
            }),
        )
        .layer(DefaultBodyLimit::disable())
}

/// `app` を空きポートで起動してベースURLを返す
pub async fn spawn_service(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind failed");
    let addr = listener.local_addr().expect("no local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server failed");
    });
    format!("http://{}", addr)
}

pub fn test_config(api_url: &str) -> Config {
    Config {
        api_url: api_url.to_string(),
        request_timeout_seconds: 5,
        fallback_delay_min_ms: 0,
        fallback_delay_max_ms: 0,
        ..Default::default()
    }
}
