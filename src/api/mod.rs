use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::dashboard::{Connectivity, DashboardEvent, DashboardState, PanelKind, Snapshot};
use crate::models::{Location, NewsCategory};

/// Shared handler state: the snapshot to read and the refresh loop to poke
#[derive(Clone)]
pub struct AppState {
    pub dashboard: DashboardState,
    pub events: mpsc::Sender<DashboardEvent>,
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConnectivityBody {
    pub online: bool,
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lon: f64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/refresh", post(refresh_all))
        .route("/refresh/{panel}", post(refresh_panel))
        .route("/news", post(select_news))
        .route("/connectivity", post(set_connectivity))
        .route("/weather", post(weather_at))
}

async fn get_dashboard(State(app): State<AppState>) -> Json<Snapshot> {
    Json(app.dashboard.snapshot())
}

async fn refresh_all(State(app): State<AppState>) -> Result<StatusCode, StatusCode> {
    dispatch(&app, DashboardEvent::RefreshAll).await
}

async fn refresh_panel(
    State(app): State<AppState>,
    Path(panel): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let kind = PanelKind::parse(&panel).ok_or(StatusCode::NOT_FOUND)?;
    dispatch(&app, DashboardEvent::RefreshPanel(kind)).await
}

async fn select_news(
    State(app): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> Result<StatusCode, StatusCode> {
    let category = query
        .category
        .as_deref()
        .map(NewsCategory::parse_or_default)
        .unwrap_or_default();
    dispatch(&app, DashboardEvent::NewsCategory(category)).await
}

async fn set_connectivity(
    State(app): State<AppState>,
    Json(body): Json<ConnectivityBody>,
) -> Result<StatusCode, StatusCode> {
    let status = if body.online {
        Connectivity::Online
    } else {
        Connectivity::Offline
    };
    dispatch(&app, DashboardEvent::Connectivity(status)).await
}

async fn weather_at(
    State(app): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<StatusCode, StatusCode> {
    let location = Location::new(query.lat, query.lon, "Your Location");
    if !location.is_valid() {
        return Err(StatusCode::BAD_REQUEST);
    }
    dispatch(&app, DashboardEvent::WeatherAt(location)).await
}

/// Hand an event to the refresh loop; 503 once the loop has stopped
async fn dispatch(app: &AppState, event: DashboardEvent) -> Result<StatusCode, StatusCode> {
    debug!(?event, "Dispatching dashboard event");
    app.events.send(event).await.map_err(|_| {
        warn!("Refresh loop is not running");
        StatusCode::SERVICE_UNAVAILABLE
    })?;
    Ok(StatusCode::ACCEPTED)
}
