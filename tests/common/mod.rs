use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use formflow::clock::OrgClock;
use formflow::files::LocalFileStore;
use formflow::notify::NoopNotifier;
use formflow::server::{AppState, create_router};
use formflow::store::{SqliteStore, Store};
use formflow::types::{NewUser, Role, User};
use formflow::workflow::FormService;

pub const MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// An in-process router over an in-memory database seeded with one admin and
/// one normal user.
pub struct TestApp {
    pub router: Router,
    pub service: Arc<FormService>,
    pub admin: User,
    pub user: User,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = SqliteStore::in_memory().expect("open store");
        store.initialize().expect("initialize store");

        let admin = store
            .create_user(&NewUser {
                name: "Ada Admin".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "!".to_string(),
                role: Role::Admin,
            })
            .expect("create admin");
        let user = store
            .create_user(&NewUser {
                name: "Uma User".to_string(),
                email: "uma@example.com".to_string(),
                password_hash: "!".to_string(),
                role: Role::NormalUser,
            })
            .expect("create user");

        let uploads = Arc::new(LocalFileStore::new(temp_dir.path()));
        let service = FormService::new(
            Arc::new(store),
            Arc::new(NoopNotifier),
            uploads.clone(),
            Arc::new(OrgClock::from_offset_minutes(-240).expect("offset")),
        )
        .with_public_base_url(Some("https://forms.example.com/".to_string()));

        let service = Arc::new(service);
        let state = Arc::new(AppState {
            service: service.clone(),
            uploads,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        });

        Self {
            router: create_router(state),
            service,
            admin,
            user,
            temp_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, body)
    }

    /// Sends a JSON request as `caller` and parses the JSON reply.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        caller: Option<i64>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = caller {
            builder = builder.header("x-user-id", id.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let (status, bytes) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response is JSON")
        };
        (status, value)
    }

    pub async fn admin_call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.call(method, uri, Some(self.admin.id), body).await
    }

    pub async fn user_call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.call(method, uri, Some(self.user.id), body).await
    }
}
