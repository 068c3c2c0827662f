use super::FormService;
use crate::error::Result;
use crate::types::{AssignedFormView, FormListItem, Response, ResponseView, User};

impl FormService {
    pub fn list_forms_with_submission_counts(&self) -> Result<Vec<FormListItem>> {
        self.store.list_forms_with_submission_counts()
    }

    /// Responses with their owner, form and derived approval state, newest
    /// first.
    pub fn list_responses(&self, is_spam: bool) -> Result<Vec<ResponseView>> {
        self.store.list_responses(is_spam)
    }

    /// Every assignment of the user with a derived submission status.
    pub fn assigned_forms_for_user(&self, user_id: i64) -> Result<Vec<AssignedFormView>> {
        self.store.list_user_assignments(user_id)
    }

    pub fn get_response(&self, response_id: i64) -> Result<Option<Response>> {
        self.store.get_response(response_id)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.store.list_users()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::types::{
        ApprovalState, Decision, DecisionStatus, FormStatus, Submission, SubmissionStatus,
    };
    use crate::workflow::testing::{Harness, new_form};

    fn submit(h: &Harness, form_id: i64, is_spam: bool) -> i64 {
        h.service
            .submit(Submission {
                form_id,
                user_id: h.user.id,
                data: json!({"n": 1}),
                file: None,
                is_spam,
                assigned_by: None,
            })
            .unwrap()
            .unwrap()
            .id
    }

    #[test]
    fn test_assigned_forms_status_is_existence_based() {
        let h = Harness::new();
        let done = h.service.create_form(new_form("Done")).unwrap();
        let open = h.service.create_form(new_form("Open")).unwrap();
        h.service.assign_form(done.id, h.user.id, h.admin.id).unwrap();
        h.service.assign_form(open.id, h.user.id, h.admin.id).unwrap();

        submit(&h, done.id, false);
        submit(&h, done.id, false);

        let views = h.service.assigned_forms_for_user(h.user.id).unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].form_name, "Done");
        assert_eq!(views[0].submission_status, SubmissionStatus::Complete);
        assert_eq!(views[0].form_status, FormStatus::Draft);
        assert_eq!(views[1].submission_status, SubmissionStatus::Pending);

        assert!(h.service.assigned_forms_for_user(h.admin.id).unwrap().is_empty());
    }

    #[test]
    fn test_list_responses_filters_spam_and_derives_status() {
        let h = Harness::new();
        let form = h.service.create_form(new_form("Survey")).unwrap();
        h.service.assign_form(form.id, h.user.id, h.admin.id).unwrap();

        let ham = submit(&h, form.id, false);
        let spam = submit(&h, form.id, true);
        h.service
            .decide(
                ham,
                Decision {
                    status: DecisionStatus::Rejected,
                    comment: Some("no".to_string()),
                    decided_by: h.admin.id,
                },
            )
            .unwrap();

        let clean = h.service.list_responses(false).unwrap();
        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].response_id, ham);
        assert_eq!(clean[0].status, ApprovalState::Rejected);
        assert_eq!(clean[0].comment.as_deref(), Some("no"));
        assert_eq!(clean[0].form_name.as_deref(), Some("Survey"));

        let flagged = h.service.list_responses(true).unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].response_id, spam);
        assert_eq!(flagged[0].status, ApprovalState::Pending);
        assert!(flagged[0].decided_at.is_none());
    }

    #[test]
    fn test_submission_counts_per_form() {
        let h = Harness::new();
        let a = h.service.create_form(new_form("A")).unwrap();
        let b = h.service.create_form(new_form("B")).unwrap();
        h.service.assign_form(a.id, h.user.id, h.admin.id).unwrap();
        submit(&h, a.id, false);
        submit(&h, a.id, true);

        let items = h.service.list_forms_with_submission_counts().unwrap();
        let count_for = |id| {
            items
                .iter()
                .find(|i| i.form.id == id)
                .map(|i| i.submission_count)
                .unwrap()
        };
        assert_eq!(count_for(a.id), 2);
        assert_eq!(count_for(b.id), 0);
    }
}
