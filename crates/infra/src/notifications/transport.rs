use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The message could not be built (bad address, empty recipients, ...).
    #[error("invalid notification: {0}")]
    Invalid(String),

    /// The transport refused or failed to deliver.
    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Delivery transport for broadcast notifications.
///
/// One call sends one message to every recipient.
pub trait Notifier: Send + Sync {
    fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<(), NotifyError>;

    fn name(&self) -> &'static str;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(recipients = recipients.len(), subject, body, "notification");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Records every notification; for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    sent: Mutex<Vec<SentNotification>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl Notifier for InMemoryNotifier {
    fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<(), NotifyError> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| NotifyError::Transport("lock poisoned".to_string()))?;
        sent.push(SentNotification {
            recipients: recipients.to_vec(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_notifier_records_broadcasts() {
        let notifier = InMemoryNotifier::new();
        let to = vec!["a@b.com".to_string(), "c@d.com".to_string()];
        notifier.send(&to, "subject", "body").unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipients, to);
        assert_eq!(sent[0].subject, "subject");
    }
}
