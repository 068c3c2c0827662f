//! Form lifecycle, assignment, submission and approval workflow, plus the
//! read-side projections and dashboard aggregation built on top of it.
//!
//! Every operation is a short request against the [`Store`]. Invariants that
//! need atomicity live in the store's constraints; this layer sequences the
//! calls, stamps organization time and hands events to the [`Notifier`].

mod approvals;
mod assignments;
pub mod dashboard;
mod forms;
mod submissions;
mod views;

use std::sync::Arc;

use crate::clock::Clock;
use crate::files::FileStore;
use crate::notify::{Notification, Notifier};
use crate::store::Store;
use crate::types::User;

pub use dashboard::{DEFAULT_RECENT_LIMIT, UNKNOWN_FORM_NAME, build_bar_chart, percent};

pub struct FormService {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    files: Arc<dyn FileStore>,
    clock: Arc<dyn Clock>,
    public_base_url: Option<String>,
}

impl FormService {
    pub fn new(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        files: Arc<dyn FileStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            notifier,
            files,
            clock,
            public_base_url: None,
        }
    }

    /// Base used to derive a form's URL when it is created without one.
    #[must_use]
    pub fn with_public_base_url(mut self, base: Option<String>) -> Self {
        self.public_base_url = base.map(|b| b.trim_end_matches('/').to_string());
        self
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Hands a notification to the sink. Failures are logged and dropped.
    fn emit(&self, notification: Notification) {
        if let Err(e) = self.notifier.notify(&notification) {
            tracing::warn!(
                kind = notification.kind.as_str(),
                form_id = notification.form_id,
                "Failed to send notification to {}: {e}",
                notification.recipient.email
            );
        }
    }

    /// Looks up a user for a notification, logging instead of failing.
    fn notification_user(&self, id: i64, role: &str) -> Option<User> {
        match self.store.get_user(id) {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                tracing::debug!("Skipping notification: {role} {id} not found");
                None
            }
            Err(e) => {
                tracing::warn!("Skipping notification: failed to load {role} {id}: {e}");
                None
            }
        }
    }
}
