//! Read-only projections handed to the presentation layer.

use serde::Serialize;
use serde_json::Value;

use super::{ApprovalState, Form, FormStatus, SubmissionStatus, Timestamp};

#[derive(Debug, Clone, Serialize)]
pub struct FormListItem {
    #[serde(flatten)]
    pub form: Form,
    pub submission_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    pub assignment_id: i64,
    pub form_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub assigned_by: i64,
    pub assigned_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseView {
    pub response_id: i64,
    pub form_id: i64,
    pub form_name: Option<String>,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub is_spam: bool,
    pub submitted_at: Timestamp,
    pub status: ApprovalState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignedFormView {
    pub assignment_id: i64,
    pub form_id: i64,
    pub form_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub form_status: FormStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub assigned_by: i64,
    pub assigned_at: Timestamp,
    pub submission_status: SubmissionStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Percentages {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardMetrics {
    pub total_forms: i64,
    pub total_submissions: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub percentages: Percentages,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormBar {
    pub form_id: i64,
    pub form_name: String,
    pub total_assigned: i64,
    pub submitted: i64,
    pub not_submitted: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentView {
    pub response_id: i64,
    pub form_id: i64,
    pub form_name: Option<String>,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub submitted_at: Timestamp,
    pub status: ApprovalState,
}
