//! DTOs for the code issuer endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /session`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SessionRequest {
    /// Requested action. Only `"generateNumber"` is supported.
    pub action: String,
}

/// Response body carrying a freshly issued code.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Always `true` for a 200 response.
    pub success: bool,
    /// The issued code, e.g. `"483920175"`.
    pub request_number: String,
}
