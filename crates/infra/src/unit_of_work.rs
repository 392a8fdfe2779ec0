//! Transactional scope owning a [`Repository`].
//!
//! Lifecycle is `begin -> repository ops -> commit | rollback`. Both
//! `commit` and `rollback` consume the scope, and dropping it without a
//! commit rolls back.

use std::sync::Arc;

use catalog_core::DomainResult;

use crate::db::Database;
use crate::repository::{NewEvents, Repository};

#[derive(Debug)]
pub struct UnitOfWork {
    repository: Repository,
}

impl UnitOfWork {
    pub fn new(repository: Repository) -> Self {
        tracing::info!("session begin");
        Self { repository }
    }

    pub fn repository(&mut self) -> &mut Repository {
        &mut self.repository
    }

    /// Drain pending events of every entity seen in this scope.
    pub fn collect_new_events(&mut self) -> NewEvents<'_> {
        self.repository.collect_new_events()
    }

    /// Surface constraint violations now instead of at commit.
    pub fn flush(&self) -> DomainResult<()> {
        self.repository.session().flush()?;
        Ok(())
    }

    pub fn commit(self) -> DomainResult<()> {
        let seen = self.repository.seen_len();
        match self.repository.into_session().commit() {
            Ok(()) => {
                tracing::info!(seen, "session commit");
                Ok(())
            }
            Err(err) => {
                tracing::info!(error = %err, "session commit failed, rolled back");
                Err(err.into())
            }
        }
    }

    pub fn rollback(self) {
        self.repository.into_session().rollback();
        tracing::info!("session rollback");
    }
}

/// Hands out fresh [`UnitOfWork`] scopes.
pub trait UnitOfWorkFactory: Send + Sync {
    fn begin(&self) -> DomainResult<UnitOfWork>;
}

/// Scopes over a shared in-memory [`Database`].
#[derive(Debug, Clone)]
pub struct InMemoryUnitOfWorkFactory {
    db: Arc<Database>,
}

impl InMemoryUnitOfWorkFactory {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }
}

impl Default for InMemoryUnitOfWorkFactory {
    fn default() -> Self {
        Self::new(Database::new())
    }
}

impl UnitOfWorkFactory for InMemoryUnitOfWorkFactory {
    fn begin(&self) -> DomainResult<UnitOfWork> {
        let session = self.db.begin()?;
        Ok(UnitOfWork::new(Repository::new(session)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Filter, Table};
    use catalog_core::DomainError;
    use catalog_products::Product;

    fn widget() -> Product {
        Product::new("X1", "Widget", 9.99, "Acme", 5.0)
    }

    #[test]
    fn commit_persists_and_rollback_discards() {
        let factory = InMemoryUnitOfWorkFactory::default();

        let mut uow = factory.begin().unwrap();
        uow.repository().add(widget()).unwrap();
        uow.rollback();
        assert_eq!(factory.database().count(Table::Products).unwrap(), 0);

        let mut uow = factory.begin().unwrap();
        uow.repository().add(widget()).unwrap();
        uow.commit().unwrap();
        assert_eq!(factory.database().count(Table::Products).unwrap(), 1);
    }

    #[test]
    fn drop_without_commit_rolls_back() {
        let factory = InMemoryUnitOfWorkFactory::default();
        {
            let mut uow = factory.begin().unwrap();
            uow.repository().add(widget()).unwrap();
        }
        assert_eq!(factory.database().count(Table::Products).unwrap(), 0);
    }

    #[test]
    fn flush_reports_key_clash_from_in_place_edit() {
        let factory = InMemoryUnitOfWorkFactory::default();
        let mut uow = factory.begin().unwrap();
        uow.repository().add(widget()).unwrap();
        uow.repository()
            .add(Product::new("X2", "Gadget", 1.0, "Acme", 1.0))
            .unwrap();

        uow.repository()
            .get_mut::<Product>(&Filter::by("sku", "X2"))
            .unwrap()
            .sku = "X1".into();

        assert!(matches!(uow.flush(), Err(DomainError::DuplicateKey(_))));
        assert!(matches!(uow.commit(), Err(DomainError::DuplicateKey(_))));
        assert_eq!(factory.database().count(Table::Products).unwrap(), 0);
    }

    #[test]
    fn overlapping_scopes_on_unrelated_rows_both_commit() {
        let factory = InMemoryUnitOfWorkFactory::default();
        let mut slow = factory.begin().unwrap();
        let mut fast = factory.begin().unwrap();

        slow.repository().add(widget()).unwrap();
        fast.repository()
            .add(Product::new("X2", "Gadget", 1.0, "Acme", 1.0))
            .unwrap();
        fast.commit().unwrap();

        slow.commit().unwrap();
        assert_eq!(factory.database().count(Table::Products).unwrap(), 2);
    }

    #[test]
    fn stale_edit_of_same_row_fails_with_conflict() {
        let factory = InMemoryUnitOfWorkFactory::default();
        let mut seed = factory.begin().unwrap();
        seed.repository().add(widget()).unwrap();
        seed.commit().unwrap();

        let mut slow = factory.begin().unwrap();
        let mut fast = factory.begin().unwrap();
        let by_sku = Filter::by("sku", "X1");

        fast.repository().get_mut::<Product>(&by_sku).unwrap().quantity = 1.0;
        fast.commit().unwrap();

        slow.repository().get_mut::<Product>(&by_sku).unwrap().quantity = 2.0;
        assert!(matches!(slow.commit(), Err(DomainError::Conflict(_))));
    }
}
