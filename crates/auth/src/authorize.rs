use thiserror::Error;

use crate::{Actor, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Forbidden")]
    Forbidden { required: &'static str, actual: Role },
}

/// Allow admins and super admins.
///
/// - No IO
/// - No panics
pub fn require_admin_or_super_admin(actor: &Actor) -> Result<(), AuthzError> {
    if actor.role.is_admin_or_super_admin() {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            required: "admin or super_admin",
            actual: actor.role,
        })
    }
}

/// Allow super admins only.
pub fn require_super_admin(actor: &Actor) -> Result<(), AuthzError> {
    if actor.role == Role::SuperAdmin {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            required: "super_admin",
            actual: actor.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_admin_guard_but_not_super_admin_guard() {
        let admin = Actor::new("admin@test.com", Role::Admin);
        assert!(require_admin_or_super_admin(&admin).is_ok());
        assert_eq!(
            require_super_admin(&admin),
            Err(AuthzError::Forbidden {
                required: "super_admin",
                actual: Role::Admin
            })
        );
    }

    #[test]
    fn anonymous_is_rejected_everywhere() {
        let anon = Actor::anonymous();
        assert!(require_admin_or_super_admin(&anon).is_err());
        assert!(require_super_admin(&anon).is_err());
    }

    #[test]
    fn super_admin_passes_both_guards() {
        let sa = Actor::new("super@test.com", Role::SuperAdmin);
        assert!(require_admin_or_super_admin(&sa).is_ok());
        assert!(require_super_admin(&sa).is_ok());
    }
}
