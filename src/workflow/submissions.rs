use super::FormService;
use crate::error::Result;
use crate::notify::{Notification, NotificationKind};
use crate::types::{Response, Submission};
use crate::validation::validate_response_data;

impl FormService {
    /// Records a response from an assigned user.
    ///
    /// Returns `Ok(None)` when the form does not exist or the user holds no
    /// assignment for it. `is_spam` is stored as given.
    pub fn submit(&self, submission: Submission) -> Result<Option<Response>> {
        validate_response_data(&submission.data)?;

        let Some(form) = self.store.get_form(submission.form_id)? else {
            tracing::debug!(form_id = submission.form_id, "Submission for unknown form");
            return Ok(None);
        };

        let Some(assignment) = self
            .store
            .get_assignment(submission.form_id, submission.user_id)?
        else {
            tracing::debug!(
                form_id = submission.form_id,
                user_id = submission.user_id,
                "Submission without assignment"
            );
            return Ok(None);
        };

        let file_path = match &submission.file {
            Some(file) => Some(self.files.store(&file.bytes, &file.original_name)?),
            None => None,
        };

        let response = self.store.create_response(
            form.id,
            submission.user_id,
            &submission.data,
            file_path.as_deref(),
            submission.is_spam,
            &self.clock.now(),
        )?;

        tracing::info!(
            form_id = form.id,
            user_id = submission.user_id,
            response_id = response.id,
            is_spam = response.is_spam,
            "Recorded response"
        );

        let admin_id = submission.assigned_by.unwrap_or(assignment.assigned_by);
        if let (Some(admin), Some(submitter)) = (
            self.notification_user(admin_id, "assigner"),
            self.notification_user(submission.user_id, "submitter"),
        ) {
            self.emit(Notification::new(
                NotificationKind::FormSubmitted,
                &admin,
                &form,
                &submitter,
            ));
        }

        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::notify::NotificationKind;
    use crate::types::{Attachment, Submission};
    use crate::workflow::testing::{Harness, new_form};

    fn submission(form_id: i64, user_id: i64) -> Submission {
        Submission {
            form_id,
            user_id,
            data: json!({"company": "Acme"}),
            file: None,
            is_spam: false,
            assigned_by: None,
        }
    }

    #[test]
    fn test_submit_requires_assignment() {
        let h = Harness::new();
        let form = h.service.create_form(new_form("Survey")).unwrap();

        assert!(h.service.submit(submission(form.id, h.user.id)).unwrap().is_none());
        assert!(h.service.submit(submission(form.id + 50, h.user.id)).unwrap().is_none());
        assert_eq!(h.service.store().count_responses().unwrap(), 0);
    }

    #[test]
    fn test_submit_notifies_assigner() {
        let h = Harness::new();
        let form = h.service.create_form(new_form("Survey")).unwrap();
        h.service.assign_form(form.id, h.user.id, h.admin.id).unwrap();

        let response = h
            .service
            .submit(submission(form.id, h.user.id))
            .unwrap()
            .unwrap();
        assert_eq!(response.data["company"], "Acme");
        assert!(!response.is_spam);

        let sent = h.notifier.sent();
        let submitted = sent
            .iter()
            .find(|n| n.kind == NotificationKind::FormSubmitted)
            .unwrap();
        assert_eq!(submitted.recipient.user_id, h.admin.id);
        assert_eq!(submitted.actor_name, "Uma User");
    }

    #[test]
    fn test_explicit_assigned_by_overrides_recipient() {
        let h = Harness::new();
        let other_admin = h.add_user("Oscar");
        let form = h.service.create_form(new_form("Survey")).unwrap();
        h.service.assign_form(form.id, h.user.id, h.admin.id).unwrap();

        let mut sub = submission(form.id, h.user.id);
        sub.assigned_by = Some(other_admin.id);
        h.service.submit(sub).unwrap().unwrap();

        let last = h.notifier.sent().pop().unwrap();
        assert_eq!(last.kind, NotificationKind::FormSubmitted);
        assert_eq!(last.recipient.user_id, other_admin.id);
    }

    #[test]
    fn test_spam_flag_and_attachment_stored() {
        let h = Harness::new();
        let form = h.service.create_form(new_form("Survey")).unwrap();
        h.service.assign_form(form.id, h.user.id, h.admin.id).unwrap();

        let mut sub = submission(form.id, h.user.id);
        sub.is_spam = true;
        sub.file = Some(Attachment {
            original_name: "w9.pdf".to_string(),
            bytes: b"%PDF-1.4".to_vec(),
        });

        let response = h.service.submit(sub).unwrap().unwrap();
        assert!(response.is_spam);
        let reference = response.file_path.unwrap();
        assert!(reference.ends_with("/w9.pdf"));

        let stored = h.temp.path().join("uploads").join(&reference);
        assert_eq!(std::fs::read(stored).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_resubmission_allowed_and_survives_unassignment() {
        let h = Harness::new();
        let form = h.service.create_form(new_form("Survey")).unwrap();
        h.service.assign_form(form.id, h.user.id, h.admin.id).unwrap();

        h.service.submit(submission(form.id, h.user.id)).unwrap().unwrap();
        h.service.submit(submission(form.id, h.user.id)).unwrap().unwrap();
        assert_eq!(h.service.store().count_responses().unwrap(), 2);

        h.service.remove_assignment(form.id, h.user.id).unwrap();
        assert_eq!(h.service.store().count_responses().unwrap(), 2);
        assert!(h.service.submit(submission(form.id, h.user.id)).unwrap().is_none());
    }
}
