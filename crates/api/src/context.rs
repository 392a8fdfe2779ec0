use catalog_auth::{Actor, Role};

/// Who is calling, resolved once per request by the auth middleware.
///
/// Requests without a bearer token carry the anonymous actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    actor: Actor,
}

impl ActorContext {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }

    pub fn anonymous() -> Self {
        Self::new(Actor::anonymous())
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn role(&self) -> Role {
        self.actor.role
    }

    /// Email to attribute a product view to (`None` when anonymous).
    pub fn viewer_email(&self) -> Option<&str> {
        self.actor.identified_email()
    }
}
