use super::FormService;
use crate::error::{Error, Result};
use crate::notify::{Notification, NotificationKind};
use crate::types::{Assignment, AssignmentView};

impl FormService {
    /// Assigns a form to a user. The store's unique index on the pair decides
    /// duplicates, so concurrent callers see exactly one success and one
    /// `Conflict`.
    pub fn assign_form(&self, form_id: i64, user_id: i64, assigned_by: i64) -> Result<Assignment> {
        let form = self
            .store
            .get_form(form_id)?
            .ok_or(Error::NotFound("form"))?;
        let user = self
            .store
            .get_user(user_id)?
            .ok_or(Error::NotFound("user"))?;

        let assignment =
            self.store
                .create_assignment(form_id, user_id, assigned_by, &self.clock.now())?;

        tracing::info!(
            form_id,
            user_id,
            assigned_by,
            "Assigned form '{}'",
            form.name
        );

        if let Some(assigner) = self.notification_user(assigned_by, "assigner") {
            self.emit(Notification::new(
                NotificationKind::FormAssigned,
                &user,
                &form,
                &assigner,
            ));
        }

        Ok(assignment)
    }

    /// Deletes the assignment for the pair. Responses already submitted under
    /// it are kept.
    pub fn remove_assignment(&self, form_id: i64, user_id: i64) -> Result<bool> {
        let removed = self.store.delete_assignment(form_id, user_id)?;
        if removed {
            tracing::info!(form_id, user_id, "Removed assignment");
        }
        Ok(removed)
    }

    pub fn list_assignees(&self, form_id: i64) -> Result<Vec<AssignmentView>> {
        self.store.list_assignees(form_id)
    }
}
