use serde::Serialize;
use serde_json::Value as JsonValue;

use catalog_core::{Entity, EventQueue};
use catalog_events::DomainEvent;
use catalog_products::{Product, ProductSeen};
use catalog_users::User;

/// Tables known to the catalog store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Products,
    Users,
    ProductSeen,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Users => "users",
            Table::ProductSeen => "product_seen",
        }
    }

    /// Serialized field holding the table's unique natural key.
    pub fn natural_key_field(&self) -> Option<&'static str> {
        match self {
            Table::Products => Product::NATURAL_KEY,
            Table::Users => User::NATURAL_KEY,
            Table::ProductSeen => ProductSeen::NATURAL_KEY,
        }
    }
}

impl core::fmt::Display for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored row: one of the catalog entities.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Product(Product),
    User(User),
    ProductSeen(ProductSeen),
}

impl Record {
    pub fn table(&self) -> Table {
        match self {
            Record::Product(_) => Table::Products,
            Record::User(_) => Table::Users,
            Record::ProductSeen(_) => Table::ProductSeen,
        }
    }

    /// Natural key field name + value, for tables that have one.
    pub fn natural_key(&self) -> Option<(&'static str, &str)> {
        match self {
            Record::Product(p) => key_of(p),
            Record::User(u) => key_of(u),
            Record::ProductSeen(s) => key_of(s),
        }
    }

    /// Serde JSON form used for filter evaluation.
    pub fn to_json(&self) -> JsonValue {
        let value = match self {
            Record::Product(p) => serde_json::to_value(p),
            Record::User(u) => serde_json::to_value(u),
            Record::ProductSeen(s) => serde_json::to_value(s),
        };
        value.unwrap_or(JsonValue::Null)
    }

    pub fn events_mut(&mut self) -> &mut EventQueue<DomainEvent> {
        match self {
            Record::Product(p) => p.events_mut(),
            Record::User(u) => u.events_mut(),
            Record::ProductSeen(s) => s.events_mut(),
        }
    }
}

fn key_of<E: Entity>(entity: &E) -> Option<(&'static str, &str)> {
    Some((E::NATURAL_KEY?, entity.natural_key()?))
}

/// An entity that maps onto a [`Table`].
pub trait Stored: Entity<Event = DomainEvent> + Serialize + Clone + Sized {
    const TABLE: Table;

    fn into_record(self) -> Record;

    fn from_record(record: &Record) -> Option<&Self>;

    fn from_record_mut(record: &mut Record) -> Option<&mut Self>;
}

macro_rules! impl_stored {
    ($t:ty, $variant:ident, $table:expr) => {
        impl Stored for $t {
            const TABLE: Table = $table;

            fn into_record(self) -> Record {
                Record::$variant(self)
            }

            fn from_record(record: &Record) -> Option<&Self> {
                match record {
                    Record::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_record_mut(record: &mut Record) -> Option<&mut Self> {
                match record {
                    Record::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_stored!(Product, Product, Table::Products);
impl_stored!(User, User, Table::Users);
impl_stored!(ProductSeen, ProductSeen, Table::ProductSeen);

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_auth::Actor;

    #[test]
    fn natural_keys_per_table() {
        let product = Product::new("X1", "Widget", 9.99, "Acme", 5.0).into_record();
        assert_eq!(product.natural_key(), Some(("sku", "X1")));
        assert_eq!(product.table(), Table::Products);

        let seen = ProductSeen::record("X1", &Actor::anonymous(), chrono::Utc::now()).into_record();
        assert_eq!(seen.natural_key(), None);
        assert!(Product::from_record(&seen).is_none());
    }

    #[test]
    fn key_field_matches_record_keys() {
        let product = Product::new("X1", "Widget", 9.99, "Acme", 5.0).into_record();
        let field = product.natural_key().map(|(f, _)| f);
        assert_eq!(Table::Products.natural_key_field(), field);
        assert_eq!(Table::Users.natural_key_field(), Some("email"));
        assert_eq!(Table::ProductSeen.natural_key_field(), None);
    }
}
