//! Local stand-ins for the external APIs

#![allow(dead_code)]

use std::time::Duration;

use axum::{Json, Router, extract::Path, http::StatusCode, routing::get};
use daybrief::DaybriefConfig;
use serde_json::{Value, json};

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Never answers within any test budget
pub async fn hang() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(3600)).await;
    StatusCode::OK
}

pub async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap()
}

pub fn open_meteo_body() -> Value {
    json!({
        "latitude": 52.52,
        "longitude": 13.41,
        "current_weather": {"temperature": 12.6, "windspeed": 9.4, "winddirection": 250, "weathercode": 61},
        "hourly": {"time": ["2024-10-18T00:00"], "relative_humidity_2m": [87]}
    })
}

pub fn posts_body() -> Value {
    let posts: Vec<Value> = (1..=10)
        .map(|id| json!({"userId": 1, "id": id, "title": format!("post {id}"), "body": "b".repeat(200)}))
        .collect();
    Value::Array(posts)
}

/// Every external API answering the way the keyless tiers expect, with the
/// keyed tiers rejecting the key
pub fn healthy_apis() -> Router {
    Router::new()
        .route("/owm", get(|| async { StatusCode::UNAUTHORIZED }))
        .route("/meteo", get(|| async { Json(open_meteo_body()) }))
        .route("/news", get(|| async { StatusCode::TOO_MANY_REQUESTS }))
        .route("/posts", get(|| async { Json(posts_body()) }))
        .route(
            "/quote",
            get(|| async { Json(json!({"_id": "x", "content": "Simplicity is the soul of efficiency.", "author": "Austin Freeman"})) }),
        )
        .route(
            "/activity",
            get(|| async {
                Json(json!({"activity": "Learn to juggle", "type": "recreational", "participants": 1, "price": 0.1, "link": "", "key": "1"}))
            }),
        )
        .route("/hang", get(hang))
        .route("/status/{code}", get(status))
}

/// Configuration pointing every source at `base`, with keys configured
pub fn config_for(base: &str) -> DaybriefConfig {
    let mut config = DaybriefConfig::default();
    config.http.timeout_seconds = 1;
    config.weather.api_key = Some("test-key".to_string());
    config.weather.base_url = format!("{base}/owm");
    config.weather.fallback_url = format!("{base}/meteo");
    config.news.api_key = Some("test-key".to_string());
    config.news.base_url = format!("{base}/news");
    config.news.fallback_url = format!("{base}/posts");
    config.quote.base_url = format!("{base}/quote");
    config.quote.timeout_seconds = 1;
    config.activity.base_url = format!("{base}/activity");
    config
}
