//! Read side: queries that bypass command handlers.
//!
//! Reads run in their own scope and never write. `get_product` additionally
//! dispatches `ProductViewed` once the read succeeded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_auth::{Role, TokenIssuer};
use catalog_core::{DomainError, DomainResult};
use catalog_events::{DomainEvent, ProductFields, ProductViewed};
use catalog_products::Product;
use catalog_users::{User, UserProfile};

use crate::db::Filter;
use crate::message_bus::{DispatchError, MessageBus};
use crate::unit_of_work::UnitOfWorkFactory;

/// Successful login: bearer token + the user's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOutcome {
    pub token: String,
    pub role: Role,
}

/// Fetch a product and record the view.
///
/// `viewer_email` is `None` for anonymous callers.
pub fn get_product(
    bus: &MessageBus,
    sku: &str,
    viewer_email: Option<&str>,
) -> Result<ProductFields, DispatchError> {
    tracing::info!(sku, "getting product");
    let product = find_one::<Product, _>(bus.uow_factory().as_ref(), "sku", sku, |p| p.fields())
        .map_err(|err| {
            tracing::error!(sku, "product not found");
            not_found_as(err, "Product not found")
        })?;

    bus.handle(DomainEvent::from(ProductViewed {
        sku: sku.to_string(),
        user_email: viewer_email.map(str::to_string),
    }))?;
    Ok(product)
}

pub fn get_user(uow: &dyn UnitOfWorkFactory, email: &str) -> DomainResult<UserProfile> {
    tracing::info!("getting user by email");
    find_one::<User, _>(uow, "email", email, User::profile)
        .map_err(|err| not_found_as(err, "User not found"))
}

/// Check credentials and issue a token. Unknown email and wrong password
/// are indistinguishable to the caller.
pub fn login(
    uow: &dyn UnitOfWorkFactory,
    issuer: &TokenIssuer,
    email: &str,
    password: &str,
    now: DateTime<Utc>,
) -> DomainResult<LoginOutcome> {
    tracing::info!("logging in user");
    let user = find_one::<User, _>(uow, "email", email, User::clone).map_err(|err| match err {
        DomainError::NotFound(_) => DomainError::InvalidCredentials,
        other => other,
    })?;

    let verified = user
        .check_password(password)
        .map_err(|e| DomainError::internal(e.to_string()))?;
    if !verified {
        tracing::error!("wrong password");
        return Err(DomainError::InvalidCredentials);
    }

    let token = issuer
        .issue(&user.email, user.role, now)
        .map_err(|e| DomainError::internal(e.to_string()))?;
    Ok(LoginOutcome {
        token,
        role: user.role,
    })
}

fn find_one<E, T>(
    uow: &dyn UnitOfWorkFactory,
    field: &str,
    value: &str,
    project: impl FnOnce(&E) -> T,
) -> DomainResult<T>
where
    E: crate::db::Stored,
{
    let mut scope = uow.begin()?;
    let found = scope
        .repository()
        .get::<E>(&Filter::by(field, value))
        .map(project);
    scope.commit()?;
    found
}

fn not_found_as(err: DomainError, message: &str) -> DomainError {
    match err {
        DomainError::NotFound(_) => DomainError::not_found(message),
        other => other,
    }
}
