//! Broker error types with HTTP and WebSocket mappings.
//!
//! [`BrokerError`] is the central error type. REST handlers turn it into a
//! structured JSON response; the WebSocket layer turns it into a
//! [`ServerEvent`] sent back to the offending client only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::ServerEvent;

/// Structured JSON error response body.
///
/// All REST error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1005,
///     "message": "invalid action: deleteNumber",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`BrokerError::error_code`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Broker error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// A code was empty or blank.
    #[error("invalid code: {0:?}")]
    InvalidCode(String),

    /// A client frame could not be decoded.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// The sender code in a pairing request is not the caller's own code.
    #[error("sender code {claimed} does not match registered code {registered}")]
    SenderMismatch {
        /// Code the client claimed.
        claimed: String,
        /// Code the client actually registered.
        registered: String,
    },

    /// A client tried to pair with its own code.
    #[error("cannot pair code {0} with itself")]
    SelfPairing(String),

    /// A paired client addressed a code other than its peer.
    #[error("code {0} is not your active peer")]
    NotYourPeer(String),

    /// Unsupported REST action.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// No live client holds the requested code.
    #[error("invalid target: no client registered with code {0}")]
    TargetNotFound(String),

    /// The caller has not registered a code yet.
    #[error("register a code before pairing")]
    NotRegistered,

    /// The caller has no active pair.
    #[error("no active pair")]
    NotPaired,

    /// Another live connection holds the code and the conflict policy
    /// forbids taking it over.
    #[error("code {0} is already in use")]
    CodeInUse(String),

    /// A code is already bridged to a different peer.
    #[error("code {0} is already paired")]
    AlreadyPaired(String),

    /// The requester disconnected before its request was answered.
    #[error("requester no longer connected")]
    RequesterGone,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BrokerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidCode(_) => 1001,
            Self::MalformedMessage(_) => 1002,
            Self::SenderMismatch { .. } => 1003,
            Self::SelfPairing(_) => 1004,
            Self::InvalidAction(_) => 1005,
            Self::NotYourPeer(_) => 1006,
            Self::TargetNotFound(_) => 2001,
            Self::NotRegistered => 2002,
            Self::NotPaired => 2003,
            Self::CodeInUse(_) => 2004,
            Self::AlreadyPaired(_) => 2005,
            Self::RequesterGone => 2006,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCode(_)
            | Self::MalformedMessage(_)
            | Self::SenderMismatch { .. }
            | Self::SelfPairing(_)
            | Self::InvalidAction(_)
            | Self::NotYourPeer(_) => StatusCode::BAD_REQUEST,
            Self::TargetNotFound(_) | Self::NotRegistered | Self::RequesterGone => {
                StatusCode::NOT_FOUND
            }
            Self::NotPaired | Self::CodeInUse(_) | Self::AlreadyPaired(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into the event reported to the client whose
    /// frame caused it.
    ///
    /// Routing and pairing failures become `pairingError`; frame-level
    /// misuse becomes `error`.
    #[must_use]
    pub fn to_event(&self) -> ServerEvent {
        match self {
            Self::SelfPairing(_)
            | Self::TargetNotFound(_)
            | Self::NotRegistered
            | Self::AlreadyPaired(_)
            | Self::RequesterGone
            | Self::SenderMismatch { .. } => ServerEvent::PairingError {
                reason: self.to_string(),
                code: self.error_code(),
            },
            _ => ServerEvent::Error {
                code: self.error_code(),
                message: self.to_string(),
            },
        }
    }
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
