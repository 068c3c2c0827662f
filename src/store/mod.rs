mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use serde_json::Value;

use crate::error::Result;
use crate::types::*;

/// Per-form counters read by the dashboard. Split from [`Store`] so the
/// aggregation code can run against anything that can count.
pub trait FormStats {
    fn list_active_forms(&self) -> Result<Vec<Form>>;
    fn count_form_assignments(&self, form_id: i64) -> Result<i64>;
    fn count_form_responses(&self, form_id: i64) -> Result<i64>;
}

/// Store defines the database interface.
///
/// Uniqueness (form names, assignments per form and user, approvals per
/// response) is enforced by the storage layer. Violations surface as
/// [`crate::error::Error::Conflict`].
pub trait Store: FormStats + Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Form operations
    /// Inserts a draft form. When `url_base` is given and the form has no
    /// URL, `{url_base}/forms/{id}` is stored in the same transaction.
    fn create_form(
        &self,
        form: &NewForm,
        created_at: &Timestamp,
        url_base: Option<&str>,
    ) -> Result<Form>;
    fn get_form(&self, id: i64) -> Result<Option<Form>>;
    /// Moves a draft form to active. Returns false when the form is missing
    /// or not a draft.
    fn activate_form(&self, id: i64) -> Result<bool>;
    fn count_forms(&self) -> Result<i64>;
    fn list_forms_with_submission_counts(&self) -> Result<Vec<FormListItem>>;

    // User operations
    fn create_user(&self, user: &NewUser) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn has_admin_user(&self) -> Result<bool>;
    /// Returns false when no such user exists.
    fn set_user_status(&self, id: i64, status: UserStatus) -> Result<bool>;

    // Assignment operations
    fn create_assignment(
        &self,
        form_id: i64,
        user_id: i64,
        assigned_by: i64,
        assigned_at: &Timestamp,
    ) -> Result<Assignment>;
    fn get_assignment(&self, form_id: i64, user_id: i64) -> Result<Option<Assignment>>;
    fn delete_assignment(&self, form_id: i64, user_id: i64) -> Result<bool>;
    fn list_assignees(&self, form_id: i64) -> Result<Vec<AssignmentView>>;
    fn list_user_assignments(&self, user_id: i64) -> Result<Vec<AssignedFormView>>;

    // Response operations
    fn create_response(
        &self,
        form_id: i64,
        user_id: i64,
        data: &Value,
        file_path: Option<&str>,
        is_spam: bool,
        submitted_at: &Timestamp,
    ) -> Result<Response>;
    fn get_response(&self, id: i64) -> Result<Option<Response>>;
    fn list_responses(&self, is_spam: bool) -> Result<Vec<ResponseView>>;
    fn recent_responses(&self, limit: i64) -> Result<Vec<RecentView>>;
    fn count_responses(&self) -> Result<i64>;
    fn count_undecided_responses(&self) -> Result<i64>;

    // Approval operations
    /// Inserts or overwrites the single approval row of a response.
    fn upsert_approval(
        &self,
        response_id: i64,
        decision: &Decision,
        decided_at: &Timestamp,
    ) -> Result<Approval>;
    fn get_approval_for_response(&self, response_id: i64) -> Result<Option<Approval>>;
    fn count_approvals(&self, status: DecisionStatus) -> Result<i64>;
}
