use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Approval, ApprovalState, Response};
use crate::workflow::DEFAULT_RECENT_LIMIT;

#[derive(Debug, Deserialize)]
pub struct CreateFormRequest {
    pub name: String,
    pub schema: Value,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActivateFormResponse {
    pub id: i64,
    pub activated: bool,
}

#[derive(Debug, Deserialize)]
pub struct AssignFormRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    /// "approved" or "rejected"; anything else is rejected at this boundary.
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponseRequest {
    pub data: Value,
    #[serde(default)]
    pub is_spam: bool,
    #[serde(default)]
    pub assigned_by: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListResponsesParams {
    #[serde(default)]
    pub spam: bool,
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    #[serde(default = "default_recent_limit")]
    pub limit: i64,
}

impl Default for RecentParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

fn default_recent_limit() -> i64 {
    DEFAULT_RECENT_LIMIT
}

/// A single response together with its decision, if any.
#[derive(Debug, Serialize)]
pub struct ResponseDetail {
    #[serde(flatten)]
    pub response: Response,
    pub status: ApprovalState,
    pub approval: Option<Approval>,
}
