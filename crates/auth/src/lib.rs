//! `catalog-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. It answers
//! "who is acting" and "may they"; the message bus never authorizes.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, require_admin_or_super_admin, require_super_admin};
pub use claims::{TokenClaims, TokenError, TokenIssuer, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use principal::{ANONYMOUS_EMAIL, Actor};
pub use roles::Role;
