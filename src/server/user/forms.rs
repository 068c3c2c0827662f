use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::dto::SubmitResponseRequest;
use crate::server::response::{ApiError, ApiResponse};
use crate::types::{Attachment, Response, Submission};

const NOT_ASSIGNED: &str = "Form not found or not assigned to you";

/// Keeps the status multer reports, so an oversized upload is a 413.
fn multipart_error(e: MultipartError) -> ApiError {
    ApiError {
        status: e.status(),
        message: e.body_text(),
    }
}

pub async fn list_assigned_forms(
    user: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let forms = state
        .service
        .assigned_forms_for_user(user.caller().user_id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(forms)))
}

fn record(
    state: &AppState,
    submission: Submission,
) -> Result<(StatusCode, Json<ApiResponse<Response>>), ApiError> {
    let response = state
        .service
        .submit(submission)?
        .ok_or_else(|| ApiError::not_found(NOT_ASSIGNED))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn submit_response(
    user: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<SubmitResponseRequest>,
) -> impl IntoResponse {
    record(
        &state,
        Submission {
            form_id: id,
            user_id: user.caller().user_id,
            data: req.data,
            file: None,
            is_spam: req.is_spam,
            assigned_by: req.assigned_by,
        },
    )
}

/// Multipart variant: a `data` field holding JSON, optional `is_spam` and
/// `assigned_by` text fields, and an optional `file` part.
pub async fn submit_with_file(
    user: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut data: Option<Value> = None;
    let mut is_spam = false;
    let mut assigned_by = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "data" => {
                let text = field
                    .text()
                    .await
                    .map_err(multipart_error)?;
                data = Some(
                    serde_json::from_str(&text)
                        .map_err(|e| ApiError::bad_request(format!("Data is not JSON: {e}")))?,
                );
            }
            "is_spam" => {
                let text = field
                    .text()
                    .await
                    .map_err(multipart_error)?;
                is_spam = text
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::bad_request("is_spam must be true or false"))?;
            }
            "assigned_by" => {
                let text = field.text().await.map_err(multipart_error)?;
                assigned_by = Some(
                    text.trim()
                        .parse::<i64>()
                        .map_err(|_| ApiError::bad_request("assigned_by must be a user id"))?,
                );
            }
            "file" => {
                let original_name = field.file_name().unwrap_or("attachment").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(multipart_error)?;
                file = Some(Attachment {
                    original_name,
                    bytes: bytes.to_vec(),
                });
            }
            other => {
                tracing::debug!("Ignoring multipart field '{other}'");
            }
        }
    }

    let data = data.ok_or_else(|| ApiError::bad_request("Missing data field"))?;

    record(
        &state,
        Submission {
            form_id: id,
            user_id: user.caller().user_id,
            data,
            file,
            is_spam,
            assigned_by,
        },
    )
}
