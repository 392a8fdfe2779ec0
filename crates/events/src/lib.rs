//! Messages handled by the catalog's in-process bus.
//!
//! Commands and events are plain data records; the bus in `catalog-infra`
//! routes them to handlers by their kind.

pub mod command;
pub mod event;
pub mod message;

pub use command::{
    Command, CommandKind, CommandMessage, CreateProduct, DeleteProduct, DeleteUser,
    MakeUserSuperAdmin, ProductFields, RegisterUser, UpdateProduct, UpdateUser, UserFields,
};
pub use event::{
    DomainEvent, EventKind, EventMessage, ProductCreated, ProductDeleted, ProductModified,
    ProductViewed,
};
pub use message::{FailurePolicy, Message};
