use catalog_core::DomainResult;
use catalog_events::DomainEvent;
use catalog_users::User;

use crate::db::Filter;
use crate::notifications::{Notification, Notifier, strategy_for};
use crate::unit_of_work::UnitOfWork;

/// Broadcast one notification about a product change to every user.
///
/// Transport failures are logged here and never returned.
pub fn notify_product_change(
    event: &DomainEvent,
    uow: &mut UnitOfWork,
    notifier: &dyn Notifier,
) -> DomainResult<()> {
    let Some(strategy) = strategy_for(event.kind()) else {
        return Ok(());
    };

    let addressees: Vec<String> = uow
        .repository()
        .list::<User>(&Filter::new())
        .into_iter()
        .map(|user| user.email)
        .collect();
    if addressees.is_empty() {
        tracing::debug!(sku = event.sku(), "no addressees, skipping notification");
        return Ok(());
    }

    let Notification { subject, body } = strategy.compose(event);
    if let Err(err) = notifier.send(&addressees, &subject, &body) {
        tracing::warn!(
            notifier = notifier.name(),
            error = %err,
            subject = %subject,
            "failed to send product notification"
        );
    }
    Ok(())
}
