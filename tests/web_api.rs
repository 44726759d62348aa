//! Integration tests for the dashboard web surface

mod common;

use daybrief::api::AppState;
use daybrief::dashboard::{Connectivity, PanelContent, PanelSink};
use daybrief::models::Quote;
use daybrief::{DashboardEvent, DashboardState, Location, NewsCategory, PanelKind, Tier, web};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::sync::mpsc;

struct Harness {
    base: String,
    state: DashboardState,
    events: mpsc::Receiver<DashboardEvent>,
    client: reqwest::Client,
}

async fn start() -> Harness {
    let state = DashboardState::new();
    let (tx, rx) = mpsc::channel(8);
    let base = common::spawn(web::router(AppState {
        dashboard: state.clone(),
        events: tx,
    }))
    .await;
    Harness {
        base,
        state,
        events: rx,
        client: reqwest::Client::new(),
    }
}

impl Harness {
    async fn post(&self, path: &str) -> StatusCode {
        self.client
            .post(format!("{}{path}", self.base))
            .send()
            .await
            .unwrap()
            .status()
    }
}

#[tokio::test]
async fn test_refresh_endpoints_forward_events() {
    let mut h = start().await;

    assert_eq!(h.post("/api/refresh").await, StatusCode::ACCEPTED);
    assert_eq!(h.events.recv().await, Some(DashboardEvent::RefreshAll));

    assert_eq!(h.post("/api/refresh/quote").await, StatusCode::ACCEPTED);
    assert_eq!(
        h.events.recv().await,
        Some(DashboardEvent::RefreshPanel(PanelKind::Quote))
    );
}

#[tokio::test]
async fn test_unknown_panel_is_not_found() {
    let mut h = start().await;
    assert_eq!(h.post("/api/refresh/stocks").await, StatusCode::NOT_FOUND);
    assert!(h.events.try_recv().is_err());
}

#[tokio::test]
async fn test_news_category_selection() {
    let mut h = start().await;

    assert_eq!(h.post("/api/news?category=science").await, StatusCode::ACCEPTED);
    assert_eq!(
        h.events.recv().await,
        Some(DashboardEvent::NewsCategory(NewsCategory::Science))
    );

    assert_eq!(h.post("/api/news?category=celebrity").await, StatusCode::ACCEPTED);
    assert_eq!(
        h.events.recv().await,
        Some(DashboardEvent::NewsCategory(NewsCategory::General))
    );
}

#[tokio::test]
async fn test_connectivity_events() {
    let mut h = start().await;

    let status = h
        .client
        .post(format!("{}/api/connectivity", h.base))
        .json(&json!({"online": false}))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(
        h.events.recv().await,
        Some(DashboardEvent::Connectivity(Connectivity::Offline))
    );
}

#[tokio::test]
async fn test_browser_position_refreshes_weather() {
    let mut h = start().await;

    assert_eq!(
        h.post("/api/weather?lat=48.14&lon=11.58").await,
        StatusCode::ACCEPTED
    );
    assert_eq!(
        h.events.recv().await,
        Some(DashboardEvent::WeatherAt(Location::new(
            48.14,
            11.58,
            "Your Location"
        )))
    );

    assert_eq!(
        h.post("/api/weather?lat=123&lon=0").await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_stopped_orchestrator_returns_unavailable() {
    let h = start().await;
    let Harness { base, events, client, .. } = h;
    drop(events);

    let status = client
        .post(format!("{base}/api/refresh"))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_snapshot_and_page() {
    let h = start().await;
    h.state.render(
        Tier::Secondary,
        PanelContent::Quote(Quote::new("Keep going.", Some("Anon".to_string()))),
    );
    h.state.set_loading(PanelKind::News);

    let snapshot: Value = h
        .client
        .get(format!("{}/api/dashboard", h.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(snapshot["quote"]["state"], "rendered");
    assert_eq!(snapshot["quote"]["tier"], "secondary");
    assert_eq!(snapshot["news"]["state"], "loading");
    assert_eq!(snapshot["weather"]["state"], "idle");

    let page = h
        .client
        .get(format!("{}/", h.base))
        .header("origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(
        page.headers()["access-control-allow-origin"],
        "*",
        "CORS header missing"
    );
    let html = page.text().await.unwrap();
    assert!(html.contains("Keep going."));
    assert!(html.contains("news-category"));
}
