use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use geoexplorer_upstream::LocationDetail;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct LocationInfoQuery {
    #[serde(default)]
    pub id: Option<String>,
}

/// `GET /api/location-info?id=<code>`
///
/// A missing `id` is treated like a blank one and rejected by the proxy.
pub(super) async fn get_location_info(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<LocationInfoQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<LocationDetail>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::from_query_rejection(&e))?;
    let code = query.id.unwrap_or_default();

    match state.proxy.lookup(&code).await {
        Ok(detail) => Ok(Json(ApiResponse::ok(detail))),
        Err(error) => {
            tracing::info!(
                request_id = %req_id.0,
                code = %code,
                reason = ?error.reason(),
                status = error.status_code(),
                "location lookup failed"
            );
            Err(ApiError::from_lookup(&error))
        }
    }
}
