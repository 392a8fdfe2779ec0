//! SMTP transport built on lettre's blocking `SmtpTransport`.

use std::time::Duration;

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use super::transport::{Notifier, NotifyError};

const SEND_TIMEOUT: Duration = Duration::from_secs(3);

/// SMTP settings, usually read from the environment.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub from: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Implicit TLS (`smtps`). Off for local dev servers such as Mailpit.
    pub use_tls: bool,
}

impl SmtpConfig {
    /// `None` unless `SMTP_HOST` and `SMTP_FROM` are both set.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;
        let from = std::env::var("SMTP_FROM").ok()?;
        let use_tls = std::env::var("SMTP_USE_TLS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);
        let default_port = if use_tls { 465 } else { 25 };

        Some(Self {
            host,
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(default_port),
            from,
            username: std::env::var("SMTP_USERNAME").ok(),
            password: std::env::var("SMTP_PASSWORD").ok(),
            use_tls,
        })
    }
}

pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
}

impl core::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| NotifyError::Invalid(format!("invalid from address: {e}")))?;

        let base = if config.use_tls {
            SmtpTransport::relay(&config.host)
                .map_err(|e| NotifyError::Transport(format!("failed to create SMTP relay: {e}")))?
        } else {
            SmtpTransport::builder_dangerous(&config.host)
        };
        let mut builder = base.port(config.port).timeout(Some(SEND_TIMEOUT));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, recipients: &[String], subject: &str, body: &str) -> Result<Message, NotifyError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);

        for recipient in recipients {
            let to: Mailbox = recipient
                .parse()
                .map_err(|e| NotifyError::Invalid(format!("invalid recipient '{recipient}': {e}")))?;
            builder = builder.to(to);
        }

        builder
            .body(body.to_string())
            .map_err(|e| NotifyError::Invalid(e.to_string()))
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, recipients: &[String], subject: &str, body: &str) -> Result<(), NotifyError> {
        if recipients.is_empty() {
            return Err(NotifyError::Invalid("no recipients".to_string()));
        }
        let message = self.build_message(recipients, subject, body)?;
        self.transport
            .send(&message)
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        tracing::debug!(recipients = recipients.len(), subject, "email sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
