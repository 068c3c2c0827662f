mod forms;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::server::AppState;

pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/forms/assigned", get(forms::list_assigned_forms))
        .route("/forms/{id}/responses", post(forms::submit_response))
        .route("/forms/{id}/responses/upload", post(forms::submit_with_file))
}
