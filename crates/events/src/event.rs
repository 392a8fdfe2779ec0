use serde::{Deserialize, Serialize};

/// An event is a fact: something already happened.
///
/// Events may have zero, one or many handlers. Each handler runs on its own
/// and a failing handler never blocks its siblings or later messages.
pub trait EventMessage: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "products.product.created").
    fn event_type(&self) -> &'static str;
}

/// Event: ProductCreated (carries every field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub sku: String,
    pub name: String,
    pub price: f64,
    pub brand: String,
    pub quantity: f64,
}

/// Event: ProductModified.
///
/// `sku` identifies the product; every other field is `None` when the update
/// left it unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductModified {
    pub sku: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub brand: Option<String>,
    pub quantity: Option<f64>,
}

impl ProductModified {
    /// True when no business field changed.
    pub fn is_noop(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.brand.is_none() && self.quantity.is_none()
    }
}

/// Event: ProductDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDeleted {
    pub sku: String,
}

/// Event: ProductViewed. `user_email` is `None` for anonymous viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductViewed {
    pub sku: String,
    pub user_email: Option<String>,
}

/// Discriminant of [`DomainEvent`], used as the handler registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    ProductCreated,
    ProductModified,
    ProductDeleted,
    ProductViewed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    ProductCreated(ProductCreated),
    ProductModified(ProductModified),
    ProductDeleted(ProductDeleted),
    ProductViewed(ProductViewed),
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::ProductCreated(_) => EventKind::ProductCreated,
            DomainEvent::ProductModified(_) => EventKind::ProductModified,
            DomainEvent::ProductDeleted(_) => EventKind::ProductDeleted,
            DomainEvent::ProductViewed(_) => EventKind::ProductViewed,
        }
    }

    /// Sku of the product the event is about.
    pub fn sku(&self) -> &str {
        match self {
            DomainEvent::ProductCreated(e) => &e.sku,
            DomainEvent::ProductModified(e) => &e.sku,
            DomainEvent::ProductDeleted(e) => &e.sku,
            DomainEvent::ProductViewed(e) => &e.sku,
        }
    }

    /// Payload as JSON (the event record without the enum tag).
    pub fn payload(&self) -> serde_json::Value {
        let value = match self {
            DomainEvent::ProductCreated(e) => serde_json::to_value(e),
            DomainEvent::ProductModified(e) => serde_json::to_value(e),
            DomainEvent::ProductDeleted(e) => serde_json::to_value(e),
            DomainEvent::ProductViewed(e) => serde_json::to_value(e),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

impl EventMessage for DomainEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::ProductCreated(_) => "products.product.created",
            DomainEvent::ProductModified(_) => "products.product.modified",
            DomainEvent::ProductDeleted(_) => "products.product.deleted",
            DomainEvent::ProductViewed(_) => "products.product.viewed",
        }
    }
}

macro_rules! impl_into_event {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for DomainEvent {
                fn from(value: $variant) -> Self {
                    DomainEvent::$variant(value)
                }
            }
        )*
    };
}

impl_into_event!(ProductCreated, ProductModified, ProductDeleted, ProductViewed);
