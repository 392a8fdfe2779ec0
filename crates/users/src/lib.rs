//! Users domain module: catalog operators and their roles.

pub mod user;

pub use user::{User, UserProfile};
