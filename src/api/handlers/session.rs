//! Code issuer: hands out fresh pairing codes.
//!
//! Issued codes are not reserved; a client becomes reachable only after it
//! registers the code over the WebSocket.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{SessionRequest, SessionResponse};
use crate::app_state::AppState;
use crate::error::{BrokerError, ErrorResponse};

/// Action name accepted by [`session_handler`].
pub const GENERATE_NUMBER: &str = "generateNumber";

/// `POST /session` — Issue a fresh code.
///
/// # Errors
///
/// Returns [`BrokerError::InvalidAction`] for any action other than
/// `generateNumber`.
#[utoipa::path(
    post,
    path = "/api/v1/session",
    tag = "Session",
    summary = "Issue a pairing code",
    description = "Returns a uniformly random fixed-width numeric code. The code is not reserved; register it over `/ws` to become reachable.",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Code issued", body = SessionResponse),
        (status = 400, description = "Unsupported action", body = ErrorResponse),
    )
)]
pub async fn session_handler(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> Result<impl IntoResponse, BrokerError> {
    if req.action != GENERATE_NUMBER {
        return Err(BrokerError::InvalidAction(req.action));
    }

    let code = state.codes.generate();
    tracing::debug!(%code, "code issued");

    Ok((
        StatusCode::OK,
        Json(SessionResponse {
            success: true,
            request_number: code.into(),
        }),
    ))
}

/// Session routes, nested under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/session", post(session_handler))
}
