use std::sync::Arc;

use catalog_api::app::{AppServices, build_app};
use catalog_api::config::AppConfig;
use catalog_auth::TokenIssuer;
use catalog_infra::notifications::{LogNotifier, Notifier, SmtpNotifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    catalog_observability::init();

    let config = AppConfig::from_env();

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpNotifier::new(smtp)?),
        None => {
            tracing::warn!("SMTP not configured; notifications are only logged");
            Arc::new(LogNotifier)
        }
    };
    let tokens = Arc::new(TokenIssuer::new(&config.jwt_secret, config.token_ttl()));
    let services = Arc::new(AppServices::in_memory(notifier, tokens)?);

    if let Some(seed) = &config.seed_super_admin {
        services.seed_super_admin(&seed.email, &seed.password).await?;
    }

    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
