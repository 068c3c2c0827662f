use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::dto::{ActivateFormResponse, CreateFormRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt};
use crate::types::NewForm;

pub async fn create_form(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateFormRequest>,
) -> impl IntoResponse {
    let form = state.service.create_form(NewForm {
        name: req.name,
        schema: req.schema,
        url: req.url,
        description: req.description,
    })?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(form))))
}

pub async fn list_forms(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let forms = state.service.list_forms_with_submission_counts()?;

    Ok::<_, ApiError>(Json(ApiResponse::success(forms)))
}

pub async fn get_form(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let form = state
        .service
        .get_form(id)?
        .or_not_found("Form not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(form)))
}

pub async fn activate_form(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    if !state.service.activate_form(id)? {
        return Err(ApiError::conflict("Form is not eligible for activation"));
    }

    Ok(Json(ApiResponse::success(ActivateFormResponse {
        id,
        activated: true,
    })))
}
