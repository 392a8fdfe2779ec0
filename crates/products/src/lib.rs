//! Products domain module.
//!
//! Catalog entities and their business rules (no IO, no HTTP, no storage).
//! Entities raise events into their own queue; the unit of work drains them.

pub mod product;
pub mod view;

pub use product::Product;
pub use view::ProductSeen;
