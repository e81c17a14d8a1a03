//! Nimbus API crate - axum HTTP server and route handlers.
//!
//! Thin plumbing over the AI orchestration core: decodes JSON request
//! bodies (file payloads arrive base64-encoded with a declared MIME type),
//! maps typed core errors onto HTTP status codes, and serves info/health
//! endpoints.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
