//! # pairing-gateway
//!
//! WebSocket signaling and session-pairing broker.
//!
//! Two clients, each holding a short numeric code, find each other through
//! the broker, agree to pair, and then exchange the opaque handshake and
//! control messages their direct peer transport needs. The broker never
//! looks inside those payloads; it only routes them.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket /ws, REST /api/v1)
//!     │
//!     ├── WS connection loop (ws/)      REST handlers (api/)
//!     │
//!     ├── Broker (service/)
//!     │     register · pairing · relay · lifecycle
//!     │
//!     └── one lock around
//!           ConnectionRegistry · PairTable · Mailboxes (domain/)
//! ```

use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;

use app_state::AppState;

/// Assembles the full application: REST routes, the `/ws` endpoint, and
/// the tracing and CORS layers.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .merge(api::build_router(request_timeout))
        .route("/ws", get(ws::handler::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
