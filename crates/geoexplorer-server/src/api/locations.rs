use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use geoexplorer_core::{selection, Selection};

use super::{ApiError, ApiResponse, AppState};

/// `GET /api/locations?department=&municipality=`
///
/// Points for the current selection plus the viewport to show them in.
pub(super) async fn list_locations(
    State(state): State<AppState>,
    query: Result<Query<Selection>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return ApiError::from_query_rejection(&rejection).into_response(),
    };
    let view = selection::select(&state.dataset, &query);
    Json(ApiResponse::ok(view)).into_response()
}

pub(super) async fn list_departments(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<String>>> {
    let names = selection::departments(&state.dataset)
        .into_iter()
        .map(ToOwned::to_owned)
        .collect();
    Json(ApiResponse::ok(names))
}

/// Municipalities of one department, sorted by name. An unknown department
/// yields an empty list.
pub(super) async fn list_municipalities(
    State(state): State<AppState>,
    Path(department): Path<String>,
) -> Response {
    let points = selection::municipalities(&state.dataset, &department);
    Json(ApiResponse::ok(points)).into_response()
}
