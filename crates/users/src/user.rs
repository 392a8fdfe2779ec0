use serde::{Deserialize, Serialize};

use catalog_auth::{PasswordError, Role, hash_password, verify_password};
use catalog_core::{Entity, EventQueue};
use catalog_events::{DomainEvent, RegisterUser, UserFields};

/// Entity: User, identified by its `email`.
///
/// `password` always holds an Argon2 hash, never the plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(skip)]
    events: EventQueue<DomainEvent>,
}

impl User {
    /// Build a user from a registration, hashing the password.
    pub fn register(cmd: &RegisterUser) -> Result<Self, PasswordError> {
        Ok(Self {
            email: cmd.email.clone(),
            username: cmd.username.clone(),
            password: hash_password(&cmd.password)?,
            role: cmd.role,
            events: EventQueue::new(),
        })
    }

    /// Overwrite every field; the new password is hashed again.
    pub fn apply_update(&mut self, update: &UserFields) -> Result<(), PasswordError> {
        let password = hash_password(&update.password)?;
        self.email = update.email.clone();
        self.username = update.username.clone();
        self.role = update.role;
        self.password = password;
        Ok(())
    }

    pub fn promote_to_super_admin(&mut self) {
        self.role = Role::SuperAdmin;
    }

    pub fn check_password(&self, password: &str) -> Result<bool, PasswordError> {
        verify_password(password, &self.password)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
            username: self.username.clone(),
            role: self.role,
        }
    }
}

impl Entity for User {
    type Event = DomainEvent;

    const NATURAL_KEY: Option<&'static str> = Some("email");

    fn natural_key(&self) -> Option<&str> {
        Some(&self.email)
    }

    fn events(&self) -> &EventQueue<DomainEvent> {
        &self.events
    }

    fn events_mut(&mut self) -> &mut EventQueue<DomainEvent> {
        &mut self.events
    }
}

/// Public view of a user (no password).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub username: String,
    pub role: Role,
}
