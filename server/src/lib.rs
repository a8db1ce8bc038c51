//! Axum HTTP/WebSocket shell for the FraudGuard marketplace fraud-detection
//! decisioning platform.
//!
//! This crate is the imperative edge: it owns nothing about fraud
//! decisioning itself, only the wiring that turns HTTP requests and
//! WebSocket connections into calls against the engines defined in
//! `fraudguard-risk`, `fraudguard-streaming`, `fraudguard-features`,
//! `fraudguard-graph`, `fraudguard-knowledge`, `fraudguard-agent`,
//! `fraudguard-scheduler`, and `fraudguard-orchestrator`.
//!
//! # Request flow
//!
//! 1. **HTTP request** arrives at an Axum handler.
//! 2. **Extract** the request body/path/query into a typed request.
//! 3. **Call** the relevant engine directly (no intermediate action/effect
//!    layer: the engines are already the testable, in-process core).
//! 4. **Map** the engine's `Result` into a JSON response or an [`AppError`].
//!
//! # Example
//!
//! ```ignore
//! use fraudguard_server::{AppState, AppError};
//! use axum::{Router, routing::post, extract::State, Json};
//!
//! async fn emit_event(
//!     State(state): State<AppState>,
//!     Json(request): Json<EmitEventRequest>,
//! ) -> Result<Json<SellerProfile>, AppError> {
//!     let profile = state.risk.emit_risk_event(
//!         &request.seller_id, request.domain, &request.event_type, request.risk_score, request.metadata,
//!     );
//!     Ok(Json(profile))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod startup;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{ClientIp, CorrelationId, UserAgent};
pub use middleware::{correlation_id_layer, CorrelationIdExt, CORRELATION_ID_HEADER};
pub use routes::build_router;
pub use startup::run;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
