use serde::{Deserialize, Serialize};

use catalog_core::{Entity, EventQueue};
use catalog_events::{
    CreateProduct, DomainEvent, ProductCreated, ProductDeleted, ProductFields, ProductModified,
};

/// Entity: Product, identified by its `sku`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub name: String,
    pub price: f64,
    pub brand: String,
    pub quantity: f64,
    #[serde(skip)]
    events: EventQueue<DomainEvent>,
}

impl Product {
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        brand: impl Into<String>,
        quantity: f64,
    ) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            price,
            brand: brand.into(),
            quantity,
            events: EventQueue::new(),
        }
    }

    /// Build a new product and raise `ProductCreated` with every field.
    pub fn create(cmd: &CreateProduct) -> Self {
        let mut product = Self::new(
            cmd.sku.clone(),
            cmd.name.clone(),
            cmd.price,
            cmd.brand.clone(),
            cmd.quantity,
        );
        product.events.push(
            ProductCreated {
                sku: cmd.sku.clone(),
                name: cmd.name.clone(),
                price: cmd.price,
                brand: cmd.brand.clone(),
                quantity: cmd.quantity,
            }
            .into(),
        );
        product
    }

    pub fn fields(&self) -> ProductFields {
        ProductFields {
            sku: self.sku.clone(),
            name: self.name.clone(),
            price: self.price,
            brand: self.brand.clone(),
            quantity: self.quantity,
        }
    }

    /// Describe an update: changed fields are `Some`, unchanged ones `None`.
    pub fn modifications(&self, update: &ProductFields) -> ProductModified {
        ProductModified {
            sku: update.sku.clone(),
            name: (update.name != self.name).then(|| update.name.clone()),
            price: (update.price != self.price).then_some(update.price),
            brand: (update.brand != self.brand).then(|| update.brand.clone()),
            quantity: (update.quantity != self.quantity).then_some(update.quantity),
        }
    }

    /// Overwrite every field and raise `ProductModified` for what changed.
    pub fn apply_update(&mut self, update: ProductFields) -> ProductModified {
        let modified = self.modifications(&update);

        self.sku = update.sku;
        self.name = update.name;
        self.price = update.price;
        self.brand = update.brand;
        self.quantity = update.quantity;

        self.events.push(modified.clone().into());
        modified
    }

    /// Raise `ProductDeleted`; the row itself is removed by the repository.
    pub fn mark_deleted(&mut self) {
        self.events.push(
            ProductDeleted {
                sku: self.sku.clone(),
            }
            .into(),
        );
    }
}

impl Entity for Product {
    type Event = DomainEvent;

    const NATURAL_KEY: Option<&'static str> = Some("sku");

    fn natural_key(&self) -> Option<&str> {
        Some(&self.sku)
    }

    fn events(&self) -> &EventQueue<DomainEvent> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut EventQueue<DomainEvent> {
        &mut self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn widget() -> Product {
        Product::new("X1", "Widget", 9.99, "Acme", 5.0)
    }

    #[test]
    fn create_raises_product_created_with_all_fields() {
        let cmd = CreateProduct {
            sku: "X1".into(),
            name: "Widget".into(),
            price: 9.99,
            brand: "Acme".into(),
            quantity: 5.0,
        };
        let product = Product::create(&cmd);

        let events: Vec<_> = product.events().iter().cloned().collect();
        assert_eq!(
            events,
            vec![DomainEvent::ProductCreated(ProductCreated {
                sku: "X1".into(),
                name: "Widget".into(),
                price: 9.99,
                brand: "Acme".into(),
                quantity: 5.0,
            })]
        );
    }

    #[test]
    fn update_suppresses_unchanged_fields() {
        let mut product = widget();
        let mut update = product.fields();
        update.name = "Widget2".into();

        let modified = product.apply_update(update);

        assert_eq!(
            modified,
            ProductModified {
                sku: "X1".into(),
                name: Some("Widget2".into()),
                price: None,
                brand: None,
                quantity: None,
            }
        );
        assert_eq!(product.name, "Widget2");
        assert_eq!(product.events().len(), 1);
    }

    #[test]
    fn delete_raises_product_deleted() {
        let mut product = widget();
        product.mark_deleted();
        assert_eq!(
            product.events_mut().pop(),
            Some(DomainEvent::ProductDeleted(ProductDeleted { sku: "X1".into() }))
        );
    }

    #[test]
    fn events_are_not_serialized() {
        let product = Product::create(&CreateProduct {
            sku: "X1".into(),
            name: "Widget".into(),
            price: 1.0,
            brand: "Acme".into(),
            quantity: 1.0,
        });
        let json = serde_json::to_value(&product).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["brand", "name", "price", "quantity", "sku"]);
    }

    proptest! {
        #[test]
        fn modified_event_reports_exactly_the_changed_fields(
            name in "[a-z]{1,6}",
            new_name in "[a-z]{1,6}",
            price in 0u32..50,
            new_price in 0u32..50,
            quantity in 0u32..50,
            new_quantity in 0u32..50,
        ) {
            let mut product = Product::new("SKU", name.clone(), price as f64, "Acme", quantity as f64);
            let update = ProductFields {
                sku: "SKU".into(),
                name: new_name.clone(),
                price: new_price as f64,
                brand: "Acme".into(),
                quantity: new_quantity as f64,
            };

            let modified = product.apply_update(update.clone());

            prop_assert_eq!(modified.name.is_some(), name != new_name);
            prop_assert_eq!(modified.price.is_some(), price != new_price);
            prop_assert_eq!(modified.quantity.is_some(), quantity != new_quantity);
            prop_assert!(modified.brand.is_none());
            prop_assert_eq!(product.fields(), update);
        }
    }
}
