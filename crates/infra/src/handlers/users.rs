use chrono::Utc;

use catalog_auth::{Actor, PasswordError};
use catalog_core::{DomainError, DomainResult};
use catalog_events::{DeleteUser, DomainEvent, MakeUserSuperAdmin, RegisterUser, UpdateUser};
use catalog_products::ProductSeen;
use catalog_users::User;

use super::on_duplicate;
use crate::db::Filter;
use crate::unit_of_work::UnitOfWork;

fn hashing_failed(err: PasswordError) -> DomainError {
    DomainError::internal(err.to_string())
}

pub fn register_user(cmd: &RegisterUser, uow: &mut UnitOfWork) -> DomainResult<()> {
    tracing::info!(role = %cmd.role, "creating user");
    let user = User::register(cmd).map_err(hashing_failed)?;
    uow.repository()
        .add(user)
        .map_err(on_duplicate("User already exists"))
}

pub fn update_user(cmd: &UpdateUser, uow: &mut UnitOfWork) -> DomainResult<()> {
    tracing::info!("updating user");
    uow.repository()
        .get_mut::<User>(&Filter::by("email", cmd.email.as_str()))?
        .apply_update(&cmd.new_user)
        .map_err(hashing_failed)?;

    uow.flush().map_err(on_duplicate(
        "Bad request, check the parameters, remember that email must be unique",
    ))
}

pub fn delete_user(cmd: &DeleteUser, uow: &mut UnitOfWork) -> DomainResult<()> {
    tracing::info!("deleting user");
    if uow.repository().delete::<User>("email", &cmd.email) == 0 {
        tracing::error!("user not found");
        return Err(DomainError::not_found("User not found"));
    }
    Ok(())
}

pub fn make_super_admin(cmd: &MakeUserSuperAdmin, uow: &mut UnitOfWork) -> DomainResult<()> {
    tracing::info!("changing user role");
    uow.repository()
        .get_mut::<User>(&Filter::by("email", cmd.email.as_str()))?
        .promote_to_super_admin();
    Ok(())
}

/// Record who viewed a product. Viewers without an email are anonymous.
pub fn register_view(event: &DomainEvent, uow: &mut UnitOfWork) -> DomainResult<()> {
    let DomainEvent::ProductViewed(viewed) = event else {
        return Err(DomainError::internal(format!(
            "register_view cannot handle {:?}",
            event.kind()
        )));
    };

    let viewer = match &viewed.user_email {
        None => Actor::anonymous(),
        Some(email) => {
            let user = uow
                .repository()
                .get::<User>(&Filter::by("email", email.as_str()))?;
            Actor::new(user.email.clone(), user.role)
        }
    };

    tracing::info!(sku = %viewed.sku, role = %viewer.role, "creating view");
    uow.repository()
        .add(ProductSeen::record(&viewed.sku, &viewer, Utc::now()))
}
