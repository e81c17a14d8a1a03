//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, a request body limit,
//! and all endpoint handlers under the `/ai` prefix.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS middleware: allow the local dashboard origins.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([
            "http://localhost:3000".parse::<HeaderValue>().unwrap(),
            "http://localhost:8000".parse::<HeaderValue>().unwrap(),
        ]))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let ai_routes = Router::new()
        .route("/analyze-text", post(handlers::analyze_text))
        .route("/chat", post(handlers::chat))
        .route(
            "/chat/history",
            get(handlers::chat_history).delete(handlers::clear_chat_history),
        )
        .route("/sentiment", post(handlers::sentiment))
        .route("/translate", post(handlers::translate))
        .route("/summarize", post(handlers::summarize))
        .route("/grammar-check", post(handlers::grammar_check))
        .route("/analyze-image", post(handlers::analyze_image))
        .route("/compare-images", post(handlers::compare_images))
        .route(
            "/extract-structured-data",
            post(handlers::extract_structured_data),
        )
        .route("/analyze-document", post(handlers::analyze_document))
        .route("/analyze-csv", post(handlers::analyze_csv))
        .route("/generate-content", post(handlers::generate_content))
        .route("/embeddings", post(handlers::embeddings))
        .route("/models", get(handlers::models))
        .route("/status", get(handlers::status));

    let body_limit = state.config.server.max_body_bytes;

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/ai", ai_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured address.
pub async fn start_server(state: AppState) -> Result<(), nimbus_core::error::NimbusError> {
    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );

    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| nimbus_core::error::NimbusError::Api(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| nimbus_core::error::NimbusError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
