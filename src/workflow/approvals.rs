use super::FormService;
use crate::error::Result;
use crate::notify::{Notification, NotificationKind};
use crate::types::{Approval, Decision, DecisionStatus};
use crate::validation::validate_comment;

impl FormService {
    /// Records a decision on a response, replacing any earlier one.
    ///
    /// Decisions are not terminal: an approved response can be rejected later
    /// and vice versa. The owner is notified when every party can be found.
    pub fn decide(&self, response_id: i64, decision: Decision) -> Result<Approval> {
        validate_comment(decision.comment.as_deref())?;

        let approval = self
            .store
            .upsert_approval(response_id, &decision, &self.clock.now())?;

        tracing::info!(
            response_id,
            decided_by = approval.decided_by,
            status = approval.status.as_str(),
            "Recorded decision"
        );

        self.notify_decision(&approval);
        Ok(approval)
    }

    pub fn get_approval(&self, response_id: i64) -> Result<Option<Approval>> {
        self.store.get_approval_for_response(response_id)
    }

    fn notify_decision(&self, approval: &Approval) {
        let response = match self.store.get_response(approval.response_id) {
            Ok(Some(response)) => response,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("Skipping notification: failed to load response: {e}");
                return;
            }
        };
        let form = match self.store.get_form(response.form_id) {
            Ok(Some(form)) => form,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("Skipping notification: failed to load form: {e}");
                return;
            }
        };
        let Some(owner) = self.notification_user(response.user_id, "response owner") else {
            return;
        };
        let Some(decider) = self.notification_user(approval.decided_by, "decider") else {
            return;
        };

        let kind = match approval.status {
            DecisionStatus::Approved => NotificationKind::FormApproved,
            DecisionStatus::Rejected => NotificationKind::FormRejected,
        };
        self.emit(
            Notification::new(kind, &owner, &form, &decider).with_comment(approval.comment.clone()),
        );
    }
}
