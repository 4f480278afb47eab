//! REST API layer: route handlers, DTOs, router composition, and the
//! OpenAPI document.
//!
//! Resource endpoints are mounted under `/api/v1`; `/health` sits at the
//! root.

pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "pairing-gateway",
        description = "Code issuer and health endpoints. Pairing and relay traffic uses the `/ws` WebSocket."
    ),
    paths(
        handlers::session::session_handler,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::SessionRequest,
        dto::SessionResponse,
        handlers::system::HealthResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Session", description = "Pairing code issuance"),
        (name = "System", description = "Health and diagnostics"),
    )
)]
pub struct ApiDoc;

/// Builds the complete REST router with every endpoint.
///
/// `request_timeout` bounds each REST request.
pub fn build_router(request_timeout: Duration) -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
        .layer(TimeoutLayer::new(request_timeout));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::CodeGenerator;
    use crate::service::Broker;

    fn app() -> Router {
        build_router(Duration::from_secs(5)).with_state(AppState {
            broker: Arc::new(Broker::default()),
            codes: CodeGenerator::new(6),
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), 64 * 1024).await else {
            panic!("body read failed");
        };
        let Ok(value) = serde_json::from_slice(&bytes) else {
            panic!("body is not JSON");
        };
        value
    }

    fn post_session(body: &str) -> Request<Body> {
        let Ok(request) = Request::post("/api/v1/session")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
        else {
            panic!("request build failed");
        };
        request
    }

    #[tokio::test]
    async fn generate_number_issues_code_of_configured_width() {
        let Ok(response) = app()
            .oneshot(post_session(r#"{"action":"generateNumber"}"#))
            .await
        else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        let Some(number) = json["requestNumber"].as_str() else {
            panic!("requestNumber missing");
        };
        assert_eq!(number.len(), 6);
        assert!(number.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn unknown_action_is_bad_request() {
        let Ok(response) = app()
            .oneshot(post_session(r#"{"action":"deleteNumber"}"#))
            .await
        else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], 1005);
    }

    #[tokio::test]
    async fn health_reports_counters() {
        let Ok(request) = Request::get("/health").body(Body::empty()) else {
            panic!("request build failed");
        };
        let Ok(response) = app().oneshot(request).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["connections"], 0);
        assert_eq!(json["active_pairs"], 0);
    }

    #[test]
    fn openapi_lists_rest_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/session"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
