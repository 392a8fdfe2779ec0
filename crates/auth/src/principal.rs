use serde::{Deserialize, Serialize};

use crate::Role;

/// Email used for viewers that did not authenticate.
pub const ANONYMOUS_EMAIL: &str = "anonymous";

/// The current actor of a request (authenticated user or anonymous viewer).
///
/// Resolved upstream of the message bus; the bus itself never authorizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub email: String,
    pub role: Role,
}

impl Actor {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }

    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_EMAIL, Role::Anonymous)
    }

    pub fn is_anonymous(&self) -> bool {
        self.role == Role::Anonymous
    }

    /// Email to attribute actions to, `None` for anonymous viewers.
    pub fn identified_email(&self) -> Option<&str> {
        if self.is_anonymous() {
            None
        } else {
            Some(&self.email)
        }
    }
}
