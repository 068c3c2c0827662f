use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::dto::RecentParams;
use crate::server::response::{ApiError, ApiResponse};

pub async fn metrics(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let metrics = state.service.dashboard_metrics()?;

    Ok::<_, ApiError>(Json(ApiResponse::success(metrics)))
}

pub async fn bar_chart(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    Json(ApiResponse::success(state.service.bar_chart_data()))
}

pub async fn recent(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecentParams>,
) -> impl IntoResponse {
    let recent = state.service.top_recent_responses(params.limit)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(recent)))
}
