//! End-to-end tests of the dispatch pipeline.
//!
//! Tests: Command → UnitOfWork → Repository → collected events → event handlers
//!
//! Verifies:
//! - Failed commands leave no partial state
//! - Event handler failures are isolated from siblings and from the caller
//! - Cascades are processed breadth-first
//! - Catalog scenarios through the production registry

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use catalog_auth::Role;
    use catalog_core::{DomainError, DomainResult};
    use catalog_events::{
        Command, CommandKind, CreateProduct, DeleteProduct, DomainEvent, EventKind, EventMessage,
        ProductFields, ProductModified, RegisterUser, UpdateProduct,
    };
    use catalog_products::{Product, ProductSeen};
    use catalog_users::User;

    use crate::db::{Filter, Table};
    use crate::handlers::{bootstrap, products};
    use crate::message_bus::{DispatchError, MessageBus};
    use crate::notifications::{InMemoryNotifier, Notifier, NotifyError};
    use crate::unit_of_work::{InMemoryUnitOfWorkFactory, UnitOfWork, UnitOfWorkFactory};
    use crate::views;

    fn widget(sku: &str) -> CreateProduct {
        CreateProduct {
            sku: sku.into(),
            name: "Widget".into(),
            price: 9.99,
            brand: "Acme".into(),
            quantity: 5.0,
        }
    }

    fn admin(email: &str) -> RegisterUser {
        RegisterUser {
            email: email.into(),
            password: "plaintext-secret".into(),
            username: "admin".into(),
            role: Role::Admin,
        }
    }

    struct Catalog {
        factory: Arc<InMemoryUnitOfWorkFactory>,
        notifier: Arc<InMemoryNotifier>,
        bus: MessageBus,
    }

    fn catalog() -> Catalog {
        let factory = Arc::new(InMemoryUnitOfWorkFactory::default());
        let notifier = Arc::new(InMemoryNotifier::new());
        let bus = bootstrap(factory.clone(), notifier.clone()).unwrap();
        Catalog {
            factory,
            notifier,
            bus,
        }
    }

    fn stored_product(factory: &InMemoryUnitOfWorkFactory, sku: &str) -> Option<Product> {
        let mut uow = factory.begin().unwrap();
        let product = uow
            .repository()
            .get::<Product>(&Filter::by("sku", sku))
            .ok()
            .cloned();
        uow.rollback();
        product
    }

    fn recorder(
        log: &Arc<Mutex<Vec<String>>>,
    ) -> impl Fn(&DomainEvent, &mut UnitOfWork) -> DomainResult<()> + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |event, _| {
            log.lock()
                .unwrap()
                .push(format!("{} {}", event.event_type(), event.sku()));
            Ok(())
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Dispatch properties
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn failed_command_rolls_back_its_writes() {
        let factory = Arc::new(InMemoryUnitOfWorkFactory::default());
        let bus = MessageBus::builder(factory.clone())
            .on_command(CommandKind::CreateProduct, "create_then_fail", |cmd, uow| {
                if let Command::CreateProduct(c) = cmd {
                    products::create_product(c, uow)?;
                }
                Err(DomainError::validation("rejected after write"))
            })
            .unwrap()
            .build();

        let err = bus.handle(Command::from(widget("X1"))).unwrap_err();

        assert!(matches!(err, DispatchError::Handler(DomainError::Validation(_))));
        assert_eq!(factory.database().count(Table::Products).unwrap(), 0);
        assert_eq!(factory.database().version().unwrap(), 0);
    }

    #[test]
    fn failing_event_handler_does_not_block_siblings() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen_by_second = calls.clone();

        let factory = Arc::new(InMemoryUnitOfWorkFactory::default());
        let bus = MessageBus::builder(factory.clone())
            .on_command(CommandKind::CreateProduct, "create", |cmd, uow| match cmd {
                Command::CreateProduct(c) => products::create_product(c, uow),
                _ => Ok(()),
            })
            .unwrap()
            .on_event(EventKind::ProductCreated, "fails", |_, _| {
                Err(DomainError::internal("smtp down"))
            })
            .on_event(EventKind::ProductCreated, "counts", move |_, _| {
                seen_by_second.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build();

        bus.handle(Command::from(widget("X1"))).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(stored_product(&factory, "X1").is_some());
    }

    #[test]
    fn cascades_are_breadth_first() {
        let log: Arc<Mutex<Vec<String>>> = Arc::default();

        let factory = Arc::new(InMemoryUnitOfWorkFactory::default());
        let bus = MessageBus::builder(factory)
            .on_command(CommandKind::CreateProduct, "create_a_and_b", |_, uow| {
                products::create_product(&widget("A"), uow)?;
                products::create_product(&widget("B"), uow)
            })
            .unwrap()
            .on_event(EventKind::ProductCreated, "record", recorder(&log))
            .on_event(EventKind::ProductCreated, "rename_a", |event, uow| {
                if event.sku() == "A" {
                    let product = uow
                        .repository()
                        .get_mut::<Product>(&Filter::by("sku", "A"))?;
                    let mut fields = product.fields();
                    fields.name = "Renamed".into();
                    product.apply_update(fields);
                }
                Ok(())
            })
            .on_event(EventKind::ProductModified, "record", recorder(&log))
            .build();

        bus.handle(Command::from(widget("ignored"))).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "products.product.created A",
                "products.product.created B",
                "products.product.modified A",
            ]
        );
    }

    #[test]
    fn every_touched_entity_is_in_the_seen_set() {
        let factory = InMemoryUnitOfWorkFactory::default();
        let mut uow = factory.begin().unwrap();
        uow.repository()
            .add(User::register(&admin("a@b.com")).unwrap())
            .unwrap();
        uow.commit().unwrap();

        let mut uow = factory.begin().unwrap();
        uow.repository()
            .add(Product::new("QUIET", "No events", 1.0, "Acme", 1.0))
            .unwrap();
        uow.repository()
            .get::<User>(&Filter::by("email", "a@b.com"))
            .unwrap();
        products::create_product(&widget("LOUD"), &mut uow).unwrap();

        assert_eq!(uow.repository().seen_len(), 3);
        let events: Vec<_> = uow.collect_new_events().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sku(), "LOUD");
    }

    #[test]
    fn second_drain_is_empty() {
        let factory = InMemoryUnitOfWorkFactory::default();
        let mut uow = factory.begin().unwrap();
        products::create_product(&widget("X1"), &mut uow).unwrap();

        assert_eq!(uow.collect_new_events().count(), 1);
        assert_eq!(uow.collect_new_events().count(), 0);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Catalog scenarios
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn create_product_notifies_every_user() {
        let c = catalog();
        c.bus.handle(Command::from(admin("a@b.com"))).unwrap();
        c.bus.handle(Command::from(admin("c@d.com"))).unwrap();

        c.bus.handle(Command::from(widget("X1"))).unwrap();

        let product = stored_product(&c.factory, "X1").unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price, 9.99);

        let sent = c.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Product X1 has been created");
        assert_eq!(sent[0].recipients, vec!["a@b.com".to_string(), "c@d.com".to_string()]);
    }

    #[test]
    fn duplicate_product_is_rejected_and_original_kept() {
        let c = catalog();
        c.bus.handle(Command::from(widget("X1"))).unwrap();

        let mut again = widget("X1");
        again.name = "Impostor".into();
        let err = c.bus.handle(Command::from(again)).unwrap_err();

        match err {
            DispatchError::Handler(DomainError::DuplicateKey(msg)) => {
                assert_eq!(msg, "Product already exists")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stored_product(&c.factory, "X1").unwrap().name, "Widget");
    }

    #[test]
    fn update_reports_only_changed_fields() {
        let c = catalog();
        c.bus.handle(Command::from(admin("a@b.com"))).unwrap();
        c.bus.handle(Command::from(widget("X1"))).unwrap();

        let mut uow = c.factory.begin().unwrap();
        products::update_product(
            &UpdateProduct {
                sku: "X1".into(),
                product: ProductFields {
                    sku: "X1".into(),
                    name: "Widget2".into(),
                    price: 9.99,
                    brand: "Acme".into(),
                    quantity: 5.0,
                },
            },
            &mut uow,
        )
        .unwrap();
        let events: Vec<_> = uow.collect_new_events().collect();
        uow.rollback();

        assert_eq!(
            events,
            vec![DomainEvent::ProductModified(ProductModified {
                sku: "X1".into(),
                name: Some("Widget2".into()),
                price: None,
                brand: None,
                quantity: None,
            })]
        );
    }

    #[test]
    fn update_through_bus_persists_and_notifies() {
        let c = catalog();
        c.bus.handle(Command::from(admin("a@b.com"))).unwrap();
        c.bus.handle(Command::from(widget("X1"))).unwrap();

        let mut fields = stored_product(&c.factory, "X1").unwrap().fields();
        fields.name = "Widget2".into();
        c.bus
            .handle(Command::from(UpdateProduct {
                sku: "X1".into(),
                product: fields,
            }))
            .unwrap();

        assert_eq!(stored_product(&c.factory, "X1").unwrap().name, "Widget2");
        let sent = c.notifier.sent();
        let modified = sent.last().unwrap();
        assert_eq!(modified.subject, "Product X1 has been modified");
        assert!(modified.body.contains("Widget2"));
        assert!(!modified.body.contains("price"));
    }

    #[test]
    fn deleting_unknown_product_is_not_found_and_silent() {
        let c = catalog();
        c.bus.handle(Command::from(admin("a@b.com"))).unwrap();

        let err = c
            .bus
            .handle(Command::from(DeleteProduct {
                sku: "does-not-exist".into(),
            }))
            .unwrap_err();

        assert!(matches!(err, DispatchError::Handler(DomainError::NotFound(_))));
        assert!(c.notifier.sent().is_empty());
    }

    #[test]
    fn delete_product_removes_and_notifies() {
        let c = catalog();
        c.bus.handle(Command::from(admin("a@b.com"))).unwrap();
        c.bus.handle(Command::from(widget("X1"))).unwrap();

        c.bus
            .handle(Command::from(DeleteProduct { sku: "X1".into() }))
            .unwrap();

        assert!(stored_product(&c.factory, "X1").is_none());
        assert_eq!(
            c.notifier.sent().last().unwrap().subject,
            "Product X1 has been deleted"
        );
    }

    #[test]
    fn duplicate_user_is_rejected_and_password_hashed() {
        let c = catalog();
        c.bus.handle(Command::from(admin("a@b.com"))).unwrap();

        let err = c.bus.handle(Command::from(admin("a@b.com"))).unwrap_err();
        assert_eq!(err.to_string(), "User already exists");

        let mut uow = c.factory.begin().unwrap();
        let user = uow
            .repository()
            .get::<User>(&Filter::by("email", "a@b.com"))
            .unwrap();
        assert_ne!(user.password, "plaintext-secret");
        assert!(user.check_password("plaintext-secret").unwrap());
    }

    #[test]
    fn viewing_a_product_records_the_view() {
        let c = catalog();
        c.bus.handle(Command::from(admin("a@b.com"))).unwrap();
        c.bus.handle(Command::from(widget("X1"))).unwrap();

        views::get_product(&c.bus, "X1", None).unwrap();
        views::get_product(&c.bus, "X1", Some("a@b.com")).unwrap();
        // Unknown viewer: the view handler fails, the read still succeeds.
        views::get_product(&c.bus, "X1", Some("ghost@b.com")).unwrap();

        let mut uow = c.factory.begin().unwrap();
        let seen = uow
            .repository()
            .list::<ProductSeen>(&Filter::by("product_sku", "X1"));
        let roles: Vec<_> = seen.iter().map(|s| s.role).collect();
        assert_eq!(roles, vec![Role::Anonymous, Role::Admin]);
    }

    #[test]
    fn slow_write_survives_unrelated_commits() {
        let c = catalog();
        c.bus.handle(Command::from(widget("Y1"))).unwrap();

        let mut slow = c.factory.begin().unwrap();
        products::create_product(&widget("X1"), &mut slow).unwrap();

        c.bus.handle(Command::from(admin("a@b.com"))).unwrap();
        views::get_product(&c.bus, "Y1", None).unwrap();

        slow.commit().unwrap();
        assert!(stored_product(&c.factory, "X1").is_some());
        assert!(stored_product(&c.factory, "Y1").is_some());
    }

    #[test]
    fn product_views_do_not_conflict_with_an_open_update() {
        let c = catalog();
        c.bus.handle(Command::from(widget("X1"))).unwrap();

        let mut update = c.factory.begin().unwrap();
        let mut fields = widget("X1");
        fields.name = "Widget2".into();
        products::update_product(
            &UpdateProduct {
                sku: "X1".into(),
                product: ProductFields {
                    sku: fields.sku,
                    name: fields.name,
                    price: fields.price,
                    brand: fields.brand,
                    quantity: fields.quantity,
                },
            },
            &mut update,
        )
        .unwrap();

        views::get_product(&c.bus, "X1", None).unwrap();
        update.commit().unwrap();

        assert_eq!(stored_product(&c.factory, "X1").unwrap().name, "Widget2");
        assert_eq!(c.factory.database().count(Table::ProductSeen).unwrap(), 1);
    }

    struct Unreachable;

    impl Notifier for Unreachable {
        fn send(&self, _: &[String], _: &str, _: &str) -> Result<(), NotifyError> {
            Err(NotifyError::Transport("connection refused".into()))
        }

        fn name(&self) -> &'static str {
            "unreachable"
        }
    }

    #[test]
    fn notification_failure_never_fails_the_write() {
        let factory = Arc::new(InMemoryUnitOfWorkFactory::default());
        let bus = bootstrap(factory.clone(), Arc::new(Unreachable)).unwrap();
        bus.handle(Command::from(admin("a@b.com"))).unwrap();

        bus.handle(Command::from(widget("X1"))).unwrap();
        assert!(stored_product(&factory, "X1").is_some());
    }
}
