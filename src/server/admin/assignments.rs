use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::dto::AssignFormRequest;
use crate::server::response::{ApiError, ApiResponse};

pub async fn list_assignees(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let assignees = state.service.list_assignees(id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(assignees)))
}

pub async fn assign_form(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<AssignFormRequest>,
) -> impl IntoResponse {
    let caller = admin.caller();
    let assignment = state
        .service
        .assign_form(id, req.user_id, caller.user_id)?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(assignment))))
}

pub async fn remove_assignment(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    if !state.service.remove_assignment(id, user_id)? {
        return Err(ApiError::not_found("Assignment not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
