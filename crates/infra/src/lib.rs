//! Infrastructure layer: persistence, unit of work, message bus, handlers,
//! notification transports and read-side views.

pub mod db;
pub mod handlers;
pub mod message_bus;
pub mod notifications;
pub mod repository;
pub mod unit_of_work;
pub mod views;

mod integration_tests;

pub use handlers::bootstrap;
pub use message_bus::{DispatchError, MessageBus, MessageBusBuilder};
pub use unit_of_work::{InMemoryUnitOfWorkFactory, UnitOfWork, UnitOfWorkFactory};
