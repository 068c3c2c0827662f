use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::dto::{DecisionRequest, ListResponsesParams, ResponseDetail};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt};
use crate::types::{ApprovalState, Decision, DecisionStatus};

pub async fn list_responses(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListResponsesParams>,
) -> impl IntoResponse {
    let responses = state.service.list_responses(params.spam)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(responses)))
}

pub async fn get_response(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let response = state
        .service
        .get_response(id)?
        .or_not_found("Response not found")?;
    let approval = state.service.get_approval(id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(ResponseDetail {
        response,
        status: ApprovalState::derive(approval.as_ref().map(|a| a.status)),
        approval,
    })))
}

pub async fn download_file(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let response = state
        .service
        .get_response(id)?
        .or_not_found("Response not found")?;
    let reference = response
        .file_path
        .or_not_found("Response has no attachment")?;

    let path = state.uploads.resolve(&reference)?;
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        tracing::error!("Failed to read attachment {}: {e}", path.display());
        ApiError::not_found("Attachment missing from storage")
    })?;

    let file_name = reference.rsplit('/').next().unwrap_or("attachment");
    let disposition = format!("attachment; filename=\"{file_name}\"");

    Ok::<_, ApiError>((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

pub async fn decide(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<DecisionRequest>,
) -> impl IntoResponse {
    let status: DecisionStatus = req.status.parse()?;
    let caller = admin.caller();

    let approval = state.service.decide(
        id,
        Decision {
            status,
            comment: req.comment,
            decided_by: caller.user_id,
        },
    )?;

    Ok::<_, ApiError>(Json(ApiResponse::success(approval)))
}
