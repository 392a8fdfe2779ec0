use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_auth::{Actor, Role};
use catalog_core::{Entity, EventQueue, ViewId};
use catalog_events::DomainEvent;

/// Entity: ProductSeen, one row per product view.
///
/// Links the product, the viewer (or `"anonymous"`) and the viewer's role at
/// the time of viewing. Views have no natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSeen {
    pub id: ViewId,
    pub product_sku: String,
    pub user_email: String,
    pub role: Role,
    pub date: DateTime<Utc>,
    #[serde(skip)]
    events: EventQueue<DomainEvent>,
}

impl ProductSeen {
    pub fn record(product_sku: impl Into<String>, viewer: &Actor, date: DateTime<Utc>) -> Self {
        Self {
            id: ViewId::new(),
            product_sku: product_sku.into(),
            user_email: viewer.email.clone(),
            role: viewer.role,
            date,
            events: EventQueue::new(),
        }
    }
}

impl Entity for ProductSeen {
    type Event = DomainEvent;

    const NATURAL_KEY: Option<&'static str> = None;

    fn natural_key(&self) -> Option<&str> {
        None
    }

    fn events(&self) -> &EventQueue<DomainEvent> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut EventQueue<DomainEvent> {
        &mut self.events
    }
}
