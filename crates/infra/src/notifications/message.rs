use serde_json::Value as JsonValue;

use catalog_events::{DomainEvent, EventKind};

/// Subject + body of one broadcast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// Builds the human-readable notification for one kind of product change.
pub trait MessageStrategy: Send + Sync {
    fn compose(&self, event: &DomainEvent) -> Notification;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductCreatedStrategy;

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductModifiedStrategy;

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductDeletedStrategy;

impl MessageStrategy for ProductCreatedStrategy {
    fn compose(&self, event: &DomainEvent) -> Notification {
        let sku = event.sku();
        Notification {
            subject: format!("Product {sku} has been created"),
            body: format!(
                "The product with sku: {sku} has been created with the following fields: {}",
                event.payload()
            ),
        }
    }
}

impl MessageStrategy for ProductModifiedStrategy {
    fn compose(&self, event: &DomainEvent) -> Notification {
        let sku = event.sku();
        Notification {
            subject: format!("Product {sku} has been modified"),
            body: format!(
                "The product with sku: {sku} has been modified with the following fields: {}",
                without_nulls(event.payload())
            ),
        }
    }
}

impl MessageStrategy for ProductDeletedStrategy {
    fn compose(&self, event: &DomainEvent) -> Notification {
        let sku = event.sku();
        Notification {
            subject: format!("Product {sku} has been deleted"),
            body: format!("The product with sku: {sku} has been deleted"),
        }
    }
}

/// Strategy keyed by event kind; `None` for kinds that do not notify.
pub fn strategy_for(kind: EventKind) -> Option<&'static dyn MessageStrategy> {
    match kind {
        EventKind::ProductCreated => Some(&ProductCreatedStrategy),
        EventKind::ProductModified => Some(&ProductModifiedStrategy),
        EventKind::ProductDeleted => Some(&ProductDeletedStrategy),
        EventKind::ProductViewed => None,
    }
}

fn without_nulls(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            JsonValue::Object(map.into_iter().filter(|(_, v)| !v.is_null()).collect())
        }
        other => other,
    }
}
