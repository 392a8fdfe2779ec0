//! Repository over a [`Session`] with seen-set tracking.
//!
//! Any entity handed out by `get`/`get_mut` or passed to `add` is recorded in
//! the seen-set; the unit of work later walks that set to drain pending
//! domain events. Because the repository is the only way to obtain a
//! reference to a stored entity, every entity that raised an event during a
//! scope is in the set.

use std::collections::BTreeMap;

use catalog_core::{DomainError, DomainResult, EventQueue};
use catalog_events::DomainEvent;

use crate::db::{Filter, Record, RowId, Session, Stored};

pub const NOT_FOUND_MESSAGE: &str = "The resource you are trying to access was not found";

#[derive(Debug)]
pub struct Repository {
    session: Session,
    seen: Vec<RowId>,
    detached: BTreeMap<RowId, Record>,
}

impl Repository {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            seen: Vec::new(),
            detached: BTreeMap::new(),
        }
    }

    /// Insert an entity; fails with `DuplicateKey` if its natural key exists.
    pub fn add<E: Stored>(&mut self, entity: E) -> DomainResult<()> {
        let id = self.session.insert(entity.into_record())?;
        self.mark_seen(id);
        Ok(())
    }

    /// Exactly one entity matching every clause of `filter`.
    ///
    /// When several rows match, the oldest (lowest row id) wins.
    pub fn get<E: Stored>(&mut self, filter: &Filter) -> DomainResult<&E> {
        let id = self.locate::<E>(filter)?;
        self.session
            .record(id)
            .and_then(E::from_record)
            .ok_or_else(|| type_mismatch::<E>(id))
    }

    /// Like [`Repository::get`], borrowing the entity for in-place edits.
    pub fn get_mut<E: Stored>(&mut self, filter: &Filter) -> DomainResult<&mut E> {
        let id = self.locate::<E>(filter)?;
        self.session
            .record_mut(id)
            .and_then(E::from_record_mut)
            .ok_or_else(|| type_mismatch::<E>(id))
    }

    /// Remove every entity whose `field` equals `value`; returns the count.
    ///
    /// Removed entities that were seen in this scope keep their pending
    /// events until drained.
    pub fn delete<E: Stored>(&mut self, field: &str, value: &str) -> usize {
        let removed = self.session.delete_where(E::TABLE, field, value);
        let count = removed.len();
        for (id, row) in removed {
            if self.seen.contains(&id) {
                self.detached.insert(id, row);
            }
        }
        count
    }

    /// Read-only query. Rows returned here are not recorded as seen.
    pub fn list<E: Stored>(&self, filter: &Filter) -> Vec<E> {
        self.session
            .select_all(E::TABLE, filter)
            .into_iter()
            .filter_map(|id| self.session.record(id).and_then(E::from_record))
            .cloned()
            .collect()
    }

    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    /// Lazily drain the pending events of every seen entity.
    pub fn collect_new_events(&mut self) -> NewEvents<'_> {
        NewEvents {
            repo: self,
            cursor: 0,
        }
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn into_session(self) -> Session {
        self.session
    }

    fn locate<E: Stored>(&mut self, filter: &Filter) -> DomainResult<RowId> {
        let id = self
            .session
            .select_one(E::TABLE, filter)
            .ok_or_else(|| DomainError::not_found(NOT_FOUND_MESSAGE))?;
        self.mark_seen(id);
        Ok(id)
    }

    fn mark_seen(&mut self, id: RowId) {
        if !self.seen.contains(&id) {
            self.seen.push(id);
        }
    }

    fn pending_mut(&mut self, id: RowId) -> Option<&mut EventQueue<DomainEvent>> {
        if self.session.record(id).is_some() {
            self.session.events_mut(id)
        } else {
            self.detached.get_mut(&id).map(Record::events_mut)
        }
    }
}

fn type_mismatch<E: Stored>(id: RowId) -> DomainError {
    DomainError::internal(format!("row {id} is not a {} row", E::TABLE))
}

/// One-shot iterator over pending events, entity by entity in seen order.
///
/// Each entity's queue is emptied (FIFO) before moving to the next one.
pub struct NewEvents<'a> {
    repo: &'a mut Repository,
    cursor: usize,
}

impl Iterator for NewEvents<'_> {
    type Item = DomainEvent;

    fn next(&mut self) -> Option<DomainEvent> {
        while let Some(&id) = self.repo.seen.get(self.cursor) {
            if let Some(event) = self.repo.pending_mut(id).and_then(|queue| queue.pop()) {
                return Some(event);
            }
            self.cursor += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use catalog_events::{CreateProduct, EventKind};
    use catalog_products::Product;

    fn create(sku: &str) -> Product {
        Product::create(&CreateProduct {
            sku: sku.into(),
            name: "Widget".into(),
            price: 9.99,
            brand: "Acme".into(),
            quantity: 5.0,
        })
    }

    fn repo() -> Repository {
        Repository::new(Database::new().begin().unwrap())
    }

    #[test]
    fn add_and_get_record_each_entity_once() {
        let mut repo = repo();
        repo.add(create("X1")).unwrap();
        repo.get::<Product>(&Filter::by("sku", "X1")).unwrap();
        repo.get_mut::<Product>(&Filter::by("sku", "X1")).unwrap();

        assert_eq!(repo.seen_len(), 1);
    }

    #[test]
    fn get_missing_is_not_found() {
        let mut repo = repo();
        let err = repo.get::<Product>(&Filter::by("sku", "nope")).unwrap_err();
        assert_eq!(err, DomainError::not_found(NOT_FOUND_MESSAGE));
        assert_eq!(repo.seen_len(), 0);
    }

    #[test]
    fn duplicate_add_is_duplicate_key() {
        let mut repo = repo();
        repo.add(create("X1")).unwrap();
        let err = repo.add(create("X1")).unwrap_err();
        assert!(matches!(err, DomainError::DuplicateKey(_)));
    }

    #[test]
    fn list_does_not_enrol_rows() {
        let mut repo = repo();
        repo.add(create("X1")).unwrap();
        repo.add(create("X2")).unwrap();
        let mut fresh = Repository::new(repo.into_session());

        assert_eq!(fresh.list::<Product>(&Filter::new()).len(), 2);
        assert_eq!(fresh.seen_len(), 0);
        assert_eq!(fresh.collect_new_events().count(), 0);
    }

    #[test]
    fn deleted_seen_entity_still_yields_its_events() {
        let mut repo = repo();
        repo.add(Product::new("X1", "Widget", 1.0, "Acme", 1.0)).unwrap();

        repo.get_mut::<Product>(&Filter::by("sku", "X1"))
            .unwrap()
            .mark_deleted();
        assert_eq!(repo.delete::<Product>("sku", "X1"), 1);
        assert_eq!(repo.delete::<Product>("sku", "X1"), 0);

        let kinds: Vec<_> = repo.collect_new_events().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EventKind::ProductDeleted]);
    }

    #[test]
    fn drain_walks_entities_in_seen_order_and_is_one_shot() {
        let mut repo = repo();
        repo.add(create("A")).unwrap();
        repo.add(create("B")).unwrap();

        let skus: Vec<_> = repo
            .collect_new_events()
            .map(|e| e.sku().to_string())
            .collect();
        assert_eq!(skus, vec!["A", "B"]);
        assert_eq!(repo.collect_new_events().count(), 0);
    }
}
