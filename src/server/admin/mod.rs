mod assignments;
mod dashboard;
mod forms;
mod responses;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::server::AppState;

pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        // Form routes
        .route("/forms", post(forms::create_form))
        .route("/forms", get(forms::list_forms))
        .route("/forms/{id}", get(forms::get_form))
        .route("/forms/{id}/activate", post(forms::activate_form))
        // Assignment routes
        .route("/forms/{id}/assignees", get(assignments::list_assignees))
        .route("/forms/{id}/assignees", post(assignments::assign_form))
        .route(
            "/forms/{id}/assignees/{user_id}",
            delete(assignments::remove_assignment),
        )
        // Response and approval routes
        .route("/responses", get(responses::list_responses))
        .route("/responses/{id}", get(responses::get_response))
        .route("/responses/{id}/file", get(responses::download_file))
        .route("/responses/{id}/approval", put(responses::decide))
        // Dashboard routes
        .route("/dashboard/metrics", get(dashboard::metrics))
        .route("/dashboard/forms", get(dashboard::bar_chart))
        .route("/dashboard/recent", get(dashboard::recent))
        // Users
        .route("/users", get(users::list_users))
}
