//! HTTP API for DocChat.
//!
//! Exposes a health check and the v1 session API: create a session, upload
//! its reference document, exchange messages, and inspect the assembled
//! context.
//!
//! Built on Axum for high performance async HTTP.

pub mod api_v1;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, response::Json, routing::get};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use docchat_config::AppConfig;
use docchat_core::extract::DocumentExtractor;
use docchat_core::gateway::CompletionGateway;
use docchat_extract::KindExtractor;
use docchat_session::{ContextAssembler, SessionController, SessionRegistry};

/// Shared application state.
pub struct ServerState {
    pub controller: SessionController,
    pub registry: SessionRegistry,
    pub config: AppConfig,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

pub type SharedState = Arc<ServerState>;

impl ServerState {
    /// Wire state from explicit collaborators.
    pub fn new(
        config: AppConfig,
        gateway: Arc<dyn CompletionGateway>,
        extractor: Arc<dyn DocumentExtractor>,
    ) -> Self {
        let assembler = ContextAssembler::from_config(&config.session);
        Self {
            controller: SessionController::new(assembler, gateway, extractor),
            registry: SessionRegistry::from_config(&config.session),
            config,
            start_time: chrono::Utc::now(),
        }
    }

    /// Wire state from configuration: the default provider and the
    /// kind-dispatching extractor.
    pub fn from_config(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let router = docchat_providers::build_from_config(&config);
        let gateway = router.default().ok_or_else(|| {
            format!(
                "No default provider '{}' configured. Set an API key or run `docchat onboard`",
                config.default_provider
            )
        })?;
        Ok(Self::new(config, gateway, Arc::new(KindExtractor::new())))
    }
}

/// Build the full router: health, v1 API, and the HTTP layers.
///
/// Layers applied:
/// - CORS restricted to the configured origins
/// - Request body size limit (`session.max_upload_bytes`)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.server.allowed_origins);
    let body_limit = state.config.session.max_upload_bytes;

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static(api_v1::FILENAME_HEADER),
        ])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the HTTP server and serve until the process exits.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(ServerState::from_config(config)?);

    info!(
        provider = %state.config.default_provider,
        model = %state.config.default_model,
        max_document_length = state.config.session.max_document_length,
        "Session controller ready"
    );

    let app = build_router(state);

    info!(addr = %addr, "DocChat server starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}
