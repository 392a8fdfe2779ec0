use serde::{Deserialize, Serialize};

use catalog_auth::Role;

/// A command is an imperative request with exactly one handler.
///
/// Commands are rejected loudly: a handler failure propagates to whoever
/// called the bus. They are transient (never persisted) and own all their
/// data so they can cross thread boundaries.
pub trait CommandMessage: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn command_type(&self) -> &'static str;
}

/// Full set of product business fields, as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
    pub sku: String,
    pub name: String,
    pub price: f64,
    pub brand: String,
    pub quantity: f64,
}

/// Full set of user fields, as supplied by a caller. `password` is plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFields {
    pub email: String,
    pub password: String,
    pub username: String,
    pub role: Role,
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub sku: String,
    pub name: String,
    pub price: f64,
    pub brand: String,
    pub quantity: f64,
}

impl From<ProductFields> for CreateProduct {
    fn from(f: ProductFields) -> Self {
        Self {
            sku: f.sku,
            name: f.name,
            price: f.price,
            brand: f.brand,
            quantity: f.quantity,
        }
    }
}

/// Command: UpdateProduct (overwrite every field of the product at `sku`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub sku: String,
    pub product: ProductFields,
}

/// Command: DeleteProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteProduct {
    pub sku: String,
}

/// Command: RegisterUser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    pub username: String,
    pub role: Role,
}

impl From<UserFields> for RegisterUser {
    fn from(f: UserFields) -> Self {
        Self {
            email: f.email,
            password: f.password,
            username: f.username,
            role: f.role,
        }
    }
}

/// Command: UpdateUser (overwrite every field of the user at `email`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUser {
    pub email: String,
    pub new_user: UserFields,
}

/// Command: DeleteUser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteUser {
    pub email: String,
}

/// Command: MakeUserSuperAdmin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeUserSuperAdmin {
    pub email: String,
}

/// Discriminant of [`Command`], used as the handler registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    RegisterUser,
    UpdateUser,
    DeleteUser,
    MakeUserSuperAdmin,
}

impl CommandKind {
    pub const ALL: [CommandKind; 7] = [
        CommandKind::CreateProduct,
        CommandKind::UpdateProduct,
        CommandKind::DeleteProduct,
        CommandKind::RegisterUser,
        CommandKind::UpdateUser,
        CommandKind::DeleteUser,
        CommandKind::MakeUserSuperAdmin,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    CreateProduct(CreateProduct),
    UpdateProduct(UpdateProduct),
    DeleteProduct(DeleteProduct),
    RegisterUser(RegisterUser),
    UpdateUser(UpdateUser),
    DeleteUser(DeleteUser),
    MakeUserSuperAdmin(MakeUserSuperAdmin),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::CreateProduct(_) => CommandKind::CreateProduct,
            Command::UpdateProduct(_) => CommandKind::UpdateProduct,
            Command::DeleteProduct(_) => CommandKind::DeleteProduct,
            Command::RegisterUser(_) => CommandKind::RegisterUser,
            Command::UpdateUser(_) => CommandKind::UpdateUser,
            Command::DeleteUser(_) => CommandKind::DeleteUser,
            Command::MakeUserSuperAdmin(_) => CommandKind::MakeUserSuperAdmin,
        }
    }
}

impl CommandMessage for Command {
    fn command_type(&self) -> &'static str {
        match self {
            Command::CreateProduct(_) => "products.product.create",
            Command::UpdateProduct(_) => "products.product.update",
            Command::DeleteProduct(_) => "products.product.delete",
            Command::RegisterUser(_) => "users.user.register",
            Command::UpdateUser(_) => "users.user.update",
            Command::DeleteUser(_) => "users.user.delete",
            Command::MakeUserSuperAdmin(_) => "users.user.make_super_admin",
        }
    }
}

macro_rules! impl_into_command {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Command {
                fn from(value: $variant) -> Self {
                    Command::$variant(value)
                }
            }
        )*
    };
}

impl_into_command!(
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    RegisterUser,
    UpdateUser,
    DeleteUser,
    MakeUserSuperAdmin,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_reports_its_kind_and_type() {
        let cmd: Command = DeleteProduct { sku: "X1".into() }.into();
        assert_eq!(cmd.kind(), CommandKind::DeleteProduct);
        assert_eq!(cmd.command_type(), "products.product.delete");

        let kinds: std::collections::HashSet<_> = CommandKind::ALL.into_iter().collect();
        assert_eq!(kinds.len(), CommandKind::ALL.len());
    }

    #[test]
    fn create_product_from_fields_keeps_values() {
        let cmd = CreateProduct::from(ProductFields {
            sku: "X1".into(),
            name: "Widget".into(),
            price: 9.99,
            brand: "Acme".into(),
            quantity: 5.0,
        });
        assert_eq!(cmd.sku, "X1");
        assert_eq!(cmd.price, 9.99);
    }
}
