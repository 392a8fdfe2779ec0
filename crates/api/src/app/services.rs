use std::sync::Arc;

use chrono::Utc;

use catalog_auth::{Role, TokenIssuer};
use catalog_core::DomainError;
use catalog_events::{Command, ProductFields, RegisterUser};
use catalog_infra::notifications::Notifier;
use catalog_infra::views::{self, LoginOutcome};
use catalog_infra::{DispatchError, InMemoryUnitOfWorkFactory, MessageBus, bootstrap};
use catalog_users::UserProfile;

/// Shared services behind every route.
///
/// The message bus is synchronous; every call is moved onto tokio's
/// blocking pool so request handlers never block the runtime.
pub struct AppServices {
    bus: Arc<MessageBus>,
    tokens: Arc<TokenIssuer>,
}

impl AppServices {
    pub fn new(bus: Arc<MessageBus>, tokens: Arc<TokenIssuer>) -> Self {
        Self { bus, tokens }
    }

    /// In-memory persistence with the given notification transport.
    pub fn in_memory(
        notifier: Arc<dyn Notifier>,
        tokens: Arc<TokenIssuer>,
    ) -> Result<Self, DispatchError> {
        let uow = Arc::new(InMemoryUnitOfWorkFactory::default());
        let bus = bootstrap(uow, notifier)?;
        Ok(Self::new(Arc::new(bus), tokens))
    }

    pub fn tokens(&self) -> &Arc<TokenIssuer> {
        &self.tokens
    }

    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    pub async fn dispatch(&self, command: impl Into<Command>) -> Result<(), DispatchError> {
        let command = command.into();
        self.blocking(move |bus| bus.handle(command)).await
    }

    pub async fn get_product(
        &self,
        sku: String,
        viewer_email: Option<String>,
    ) -> Result<ProductFields, DispatchError> {
        self.blocking(move |bus| views::get_product(bus, &sku, viewer_email.as_deref()))
            .await
    }

    pub async fn get_user(&self, email: String) -> Result<UserProfile, DomainError> {
        self.blocking(move |bus| views::get_user(bus.uow_factory().as_ref(), &email))
            .await
    }

    pub async fn login(&self, email: String, password: String) -> Result<LoginOutcome, DomainError> {
        let tokens = Arc::clone(&self.tokens);
        self.blocking(move |bus| {
            views::login(bus.uow_factory().as_ref(), &tokens, &email, &password, Utc::now())
        })
        .await
    }

    /// Register the bootstrap super admin unless that email already exists.
    pub async fn seed_super_admin(&self, email: &str, password: &str) -> Result<(), DispatchError> {
        let result = self
            .dispatch(RegisterUser {
                email: email.to_string(),
                password: password.to_string(),
                username: "super_admin".to_string(),
                role: Role::SuperAdmin,
            })
            .await;

        match result {
            Ok(()) => {
                tracing::info!(email, "seeded super admin");
                Ok(())
            }
            Err(DispatchError::Handler(DomainError::DuplicateKey(_))) => {
                tracing::info!(email, "super admin already present");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn blocking<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&MessageBus) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<DomainError> + Send + 'static,
    {
        let bus = Arc::clone(&self.bus);
        tokio::task::spawn_blocking(move || f(&bus))
            .await
            .map_err(|e| E::from(DomainError::internal(format!("blocking task failed: {e}"))))?
    }
}
