//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::CodeGenerator;
use crate::service::Broker;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The signaling broker shared by every WebSocket connection.
    pub broker: Arc<Broker>,
    /// Issuer for `POST /api/v1/session`.
    pub codes: CodeGenerator,
}
