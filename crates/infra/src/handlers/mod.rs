//! Command and event handlers, plus the production handler registry.
//!
//! Handlers are plain functions over a [`UnitOfWork`]. They never open,
//! commit or roll back a scope themselves; the bus owns that lifecycle.

pub mod notify;
pub mod products;
pub mod users;

use std::sync::Arc;

use catalog_core::DomainError;
use catalog_events::{Command, CommandKind, CommandMessage, EventKind};

use crate::message_bus::{DispatchError, MessageBus};
use crate::notifications::Notifier;
use crate::unit_of_work::{UnitOfWork, UnitOfWorkFactory};

/// Replace a `DuplicateKey` with a caller-facing message.
pub(crate) fn on_duplicate(message: &'static str) -> impl Fn(DomainError) -> DomainError {
    move |err| match err {
        DomainError::DuplicateKey(_) => DomainError::duplicate_key(message),
        other => other,
    }
}

macro_rules! command_route {
    ($builder:expr, $variant:ident, $handler:path) => {
        $builder.on_command(
            CommandKind::$variant,
            stringify!($handler),
            |command: &Command, uow: &mut UnitOfWork| match command {
                Command::$variant(inner) => $handler(inner, uow),
                other => Err(DomainError::internal(format!(
                    "{} routed to {}",
                    other.command_type(),
                    stringify!($handler)
                ))),
            },
        )
    };
}

/// Wire every catalog command and event handler.
pub fn bootstrap(
    uow: Arc<dyn UnitOfWorkFactory>,
    notifier: Arc<dyn Notifier>,
) -> Result<MessageBus, DispatchError> {
    let mut builder = MessageBus::builder(uow);

    builder = command_route!(builder, CreateProduct, products::create_product)?;
    builder = command_route!(builder, UpdateProduct, products::update_product)?;
    builder = command_route!(builder, DeleteProduct, products::delete_product)?;
    builder = command_route!(builder, RegisterUser, users::register_user)?;
    builder = command_route!(builder, UpdateUser, users::update_user)?;
    builder = command_route!(builder, DeleteUser, users::delete_user)?;
    builder = command_route!(builder, MakeUserSuperAdmin, users::make_super_admin)?;

    builder = builder.on_event(EventKind::ProductViewed, "users::register_view", users::register_view);

    for kind in [
        EventKind::ProductCreated,
        EventKind::ProductModified,
        EventKind::ProductDeleted,
    ] {
        let notifier = Arc::clone(&notifier);
        builder = builder.on_event(kind, "notify::notify_product_change", move |event, uow| {
            notify::notify_product_change(event, uow, notifier.as_ref())
        });
    }

    tracing::info!("message bus ready");
    Ok(builder.build())
}
