//! Outbound notifications about workflow events.
//!
//! Delivery is best effort. The workflow hands each event to a [`Notifier`]
//! after its own write has landed and only logs a failed hand-off.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::types::{Form, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    FormAssigned,
    FormSubmitted,
    FormApproved,
    FormRejected,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FormAssigned => "form_assigned",
            Self::FormSubmitted => "form_submitted",
            Self::FormApproved => "form_approved",
            Self::FormRejected => "form_rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub user_id: i64,
    pub name: String,
    pub email: String,
}

impl From<&User> for Recipient {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub recipient: Recipient,
    pub form_id: i64,
    pub form_name: String,
    /// Display name of whoever triggered the event.
    pub actor_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Notification {
    pub fn new(kind: NotificationKind, recipient: &User, form: &Form, actor: &User) -> Self {
        Self {
            kind,
            recipient: Recipient::from(recipient),
            form_id: form.id,
            form_name: form.name.clone(),
            actor_name: actor.name.clone(),
            comment: None,
            url: form.url.clone(),
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    #[must_use]
    pub fn subject(&self) -> String {
        match self.kind {
            NotificationKind::FormAssigned => format!("New form assigned: {}", self.form_name),
            NotificationKind::FormSubmitted => format!("Form submitted: {}", self.form_name),
            NotificationKind::FormApproved => format!("Response approved: {}", self.form_name),
            NotificationKind::FormRejected => format!("Response rejected: {}", self.form_name),
        }
    }

    #[must_use]
    pub fn body(&self) -> String {
        let mut body = match self.kind {
            NotificationKind::FormAssigned => format!(
                "Hello {}, {} assigned you the form '{}'.",
                self.recipient.name, self.actor_name, self.form_name
            ),
            NotificationKind::FormSubmitted => format!(
                "Hello {}, {} submitted a response to '{}'.",
                self.recipient.name, self.actor_name, self.form_name
            ),
            NotificationKind::FormApproved => format!(
                "Hello {}, {} approved your response to '{}'.",
                self.recipient.name, self.actor_name, self.form_name
            ),
            NotificationKind::FormRejected => format!(
                "Hello {}, {} rejected your response to '{}'.",
                self.recipient.name, self.actor_name, self.form_name
            ),
        };
        if let Some(comment) = &self.comment {
            body.push_str(&format!(" Comment: {comment}"));
        }
        if let Some(url) = &self.url {
            body.push_str(&format!(" Open: {url}"));
        }
        body
    }
}

/// Sink for workflow notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Writes each notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            kind = notification.kind.as_str(),
            to = %notification.recipient.email,
            form_id = notification.form_id,
            body = %notification.body(),
            "{}",
            notification.subject()
        );
        Ok(())
    }
}

/// Drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: &Notification) -> Result<()> {
        Ok(())
    }
}

/// Pushes notifications onto an in-process outbox. A delivery task owns the
/// receiving end.
#[derive(Debug, Clone)]
pub struct QueueNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl QueueNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for QueueNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        self.tx
            .send(notification.clone())
            .map_err(|_| Error::Unavailable("notification outbox closed".to_string()))
    }
}

/// Drains an outbox into another notifier until every sender is gone.
pub async fn deliver_outbox(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    sink: impl Notifier,
) {
    while let Some(notification) = rx.recv().await {
        if let Err(e) = sink.notify(&notification) {
            tracing::warn!(
                "Failed to deliver {} notification to {}: {e}",
                notification.kind.as_str(),
                notification.recipient.email
            );
        }
    }
}
