use std::time::Duration;

use axum::{Router, extract::State, http::StatusCode, response::Html, routing::get};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::api::{self, AppState};
use crate::config::ServerConfig;
use crate::error::DaybriefError;
use crate::render;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn router(app: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .nest("/api", api::router())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(cors)
        .with_state(app)
}

async fn index(State(app): State<AppState>) -> Html<String> {
    Html(render::page(&app.dashboard.snapshot(), Utc::now()))
}

pub async fn run(config: &ServerConfig, app: AppState) -> Result<(), DaybriefError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DaybriefError::server(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, router(app))
        .await
        .map_err(|e| DaybriefError::server(e.to_string()))
}
