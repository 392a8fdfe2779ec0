//! Product-change notifications: message composition + delivery transports.

pub mod message;
pub mod smtp;
pub mod transport;

pub use message::{
    MessageStrategy, Notification, ProductCreatedStrategy, ProductDeletedStrategy,
    ProductModifiedStrategy, strategy_for,
};
pub use smtp::{SmtpConfig, SmtpNotifier};
pub use transport::{InMemoryNotifier, LogNotifier, Notifier, NotifyError, SentNotification};
