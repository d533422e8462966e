//! HTTP/WebSocket server
//!
//! `/api/invoke` proxies every catalog and wizard command, `/ws/events`
//! streams wizard and catalog events, and the tutorial edge function is
//! served at `/functions/v1/generate-tutorial` with open CORS.

mod auth;
mod events;
mod proxy;
pub mod routes;
pub mod state;
mod tutorial;

pub use auth::{generate_auth_token, AuthLayer};
pub use proxy::{invoke_handler, InvokeRequest, InvokeResponse};
pub use state::ServerAppState;
pub use tutorial::TUTORIAL_PATH;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Version information for the server
#[derive(serde::Serialize)]
struct VersionInfo {
    version: String,
    name: String,
}

fn api_cors(cors_origins: &[String]) -> CorsLayer {
    // Explicit headers instead of Any: browsers reject a wildcard alongside Authorization
    if cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
    } else {
        let allowed_origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
    }
}

fn tutorial_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

/// Build the full application router
///
/// Layer order for the API: cors (outer) -> auth -> handler, so preflight
/// requests are answered before the token check. The tutorial function sits
/// outside the auth layer and resolves its own bearer token.
pub fn build_router(state: ServerAppState, cors_origins: &[String]) -> Router {
    let api = Router::new()
        .route("/api/invoke", post(proxy::invoke_handler))
        .route("/api/export/:session_id", get(proxy::export_download_handler))
        .route("/api/version", get(version_handler))
        .route("/ws/events", get(events::ws_handler))
        .route("/health", get(health_handler))
        .layer(AuthLayer::new(state.auth_token.clone()))
        .layer(api_cors(cors_origins));

    let functions = Router::new()
        .route(
            TUTORIAL_PATH,
            post(tutorial::generate_tutorial_handler)
                .options(tutorial::tutorial_preflight_handler),
        )
        .layer(tutorial_cors());

    api.merge(functions).with_state(state)
}

/// Run the HTTP/WebSocket server until shutdown is requested
pub async fn run_server(
    port: u16,
    bind: &str,
    state: ServerAppState,
    cors_origins: Vec<String>,
) -> Result<(), String> {
    let app = build_router(state.clone(), &cors_origins);

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let cors_display = if cors_origins.is_empty() {
        "*".to_string()
    } else {
        cors_origins.join(", ")
    };
    let tutorial_status = if state.tutor.is_some() {
        "Enabled"
    } else {
        "Not configured"
    };

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Mental Model Wizard Server                   ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║                                                               ║");
    println!("║  Server URL: http://{}:{:<24}  ║", bind, port);
    println!("║                                                               ║");
    println!("║  Auth Token: {}  ║", state.auth_token);
    println!("║                                                               ║");
    println!("║  CORS Origins: {:<45}║", cors_display);
    println!("║  Analyzer: {:<49}║", state.wizard.analyzer_name());
    println!("║  Tutorials: {:<48}║", tutorial_status);
    println!("║                                                               ║");
    println!("║  Endpoints:                                                   ║");
    println!("║    POST /api/invoke              - Command proxy             ║");
    println!("║    GET  /api/export/:session     - Export download           ║");
    println!("║    GET  /api/version             - Server version info       ║");
    println!("║    GET  /ws/events               - WebSocket events          ║");
    println!("║    POST {}  ║", TUTORIAL_PATH);
    println!("║    GET  /health                  - Health check              ║");
    println!("║                                                               ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Server listening on http://{}", addr);

    let shutdown_state = state.shutdown_state.clone();
    let shutdown_signal = async move {
        shutdown_state.wait(Duration::from_millis(100)).await;
        log::info!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

async fn version_handler() -> Json<VersionInfo> {
    Json(VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
    })
}
