//! Dashboard: Axum web server for the hub's JSON API.
//!
//! Serves a REST API and a small self-contained HTML landing page.
//! CORS enabled for local development. Page widgets (carousel, demo
//! player, builder) live per visitor, keyed by the `viewerId` query
//! parameter the first response hands out.

pub mod clients;
pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    response::Html,
    routing::{delete, get, post, put},
    Router,
};
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

pub use routes::{AppState, HubState};

/// The embedded landing page (compiled into the binary).
const DASHBOARD_HTML: &str = include_str!("templates/index.html");

/// Bind the port and serve in a background task.
pub async fn spawn_dashboard(state: AppState, port: u16) -> Result<JoinHandle<()>> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {port}"))?;
    info!(port, "Dashboard server starting on http://localhost:{port}");

    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Dashboard server error");
        }
    }))
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        // Catalog
        .route("/api/workflows", get(routes::list_workflows))
        .route("/api/workflows/facets", get(routes::workflow_facets))
        .route("/api/workflows/:id", get(routes::get_workflow))
        .route("/api/integrations", get(routes::list_integrations))
        .route(
            "/api/integrations/compatibility",
            post(routes::integration_compatibility),
        )
        .route("/api/demos", get(routes::list_demos))
        .route("/api/demos/:index/play", post(routes::demo_play))
        .route("/api/demos/:index/pause", post(routes::demo_pause))
        .route("/api/demos/:index/reset", post(routes::demo_reset))
        .route("/api/demo-player", get(routes::get_demo_player))
        .route("/api/demo-player/speed", post(routes::demo_speed))
        .route("/api/builder", get(routes::get_builder))
        .route("/api/builder/name", put(routes::rename_builder))
        .route("/api/builder/steps", post(routes::add_builder_step))
        .route("/api/builder/steps/:id", delete(routes::remove_builder_step))
        .route("/api/builder/save", post(routes::save_builder))
        // Engines
        .route("/api/roi", post(routes::compute_roi))
        .route("/api/carousel", get(routes::get_carousel))
        .route("/api/carousel/next", post(routes::carousel_next))
        .route("/api/carousel/prev", post(routes::carousel_prev))
        .route("/api/carousel/goto/:slide", post(routes::carousel_go_to))
        .route("/api/carousel/viewport", post(routes::carousel_viewport))
        .route("/api/chat", post(routes::chat))
        // Auth
        .route("/api/auth/login", post(routes::login))
        .route("/api/auth/signup", post(routes::signup))
        .route("/api/auth/logout", post(routes::logout))
        .route("/api/auth/me", get(routes::me))
        .route("/api/auth/password-strength", post(routes::password_strength))
        .route("/api/admin/login", post(routes::admin_login))
        // Requests
        .route("/api/requests/custom", post(routes::submit_custom_request))
        .route(
            "/api/requests/modification",
            post(routes::submit_modification_request),
        )
        .route("/api/admin/requests", get(routes::admin_requests))
        .route("/api/admin/requests/:id", delete(routes::delete_request))
        .route(
            "/api/admin/requests/:id/status",
            put(routes::update_request_status),
        )
        .route("/health", get(routes::health))
        // Landing page
        .route("/", get(serve_dashboard))
        .layer(cors)
        .with_state(state)
}

/// Serve the embedded HTML page.
async fn serve_dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
