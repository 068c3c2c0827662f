use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{DecisionStatus, FormStatus, Role, UserStatus};

/// Timestamps are kept in organization time, not raw UTC.
pub type Timestamp = DateTime<FixedOffset>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: Value,
    pub status: FormStatus,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Input for creating a form. Ids and timestamps are assigned on insert.
#[derive(Debug, Clone, Deserialize)]
pub struct NewForm {
    pub name: String,
    pub schema: Value,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub form_id: i64,
    pub user_id: i64,
    pub assigned_by: i64,
    pub assigned_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: i64,
    pub form_id: i64,
    pub user_id: i64,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub is_spam: bool,
    pub submitted_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Approval {
    pub id: i64,
    pub response_id: i64,
    pub status: DecisionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub decided_by: i64,
    pub decided_at: Timestamp,
}

/// An uploaded attachment travelling with a submission.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub form_id: i64,
    pub user_id: i64,
    pub data: Value,
    pub file: Option<Attachment>,
    pub is_spam: bool,
    /// Admin to notify. Defaults to whoever made the assignment.
    pub assigned_by: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct Decision {
    pub status: DecisionStatus,
    pub comment: Option<String>,
    pub decided_by: i64,
}
