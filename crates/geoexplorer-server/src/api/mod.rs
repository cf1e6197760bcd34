mod location_info;
mod locations;

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, State},
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use geoexplorer_core::LocationDataset;
use geoexplorer_upstream::{LookupError, LookupProxy};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, REQUEST_ID_HEADER};

pub const INVALID_QUERY_MESSAGE: &str = "Invalid query parameters";

#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<LookupProxy>,
    pub dataset: Arc<LocationDataset>,
}

/// JSON envelope shared by every endpoint.
///
/// Success carries `data`; failure carries `message`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Malformed query strings get the JSON envelope instead of axum's
    /// plain-text rejection.
    pub fn from_query_rejection(rejection: &QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected query string");
        Self::new(StatusCode::BAD_REQUEST, INVALID_QUERY_MESSAGE)
    }

    /// Maps a lookup failure to its HTTP status and public message.
    ///
    /// Internal detail never reaches the body.
    pub fn from_lookup(error: &LookupError) -> Self {
        let status = StatusCode::from_u16(error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, error.public_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: ApiResponse<()> = ApiResponse {
            success: false,
            message: Some(self.message),
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    upstream: &'static str,
    locations: usize,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/location-info", get(location_info::get_location_info))
        .route("/api/locations", get(locations::list_locations))
        .route("/api/departments", get(locations::list_departments))
        .route(
            "/api/departments/{department}/municipalities",
            get(locations::list_municipalities),
        )
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let upstream = if state.proxy.is_configured() {
        "configured"
    } else {
        "unconfigured"
    };
    Json(ApiResponse::ok(HealthData {
        status: "ok",
        upstream,
        locations: state.dataset.len(),
    }))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
