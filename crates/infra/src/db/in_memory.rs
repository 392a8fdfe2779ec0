use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use catalog_core::EventQueue;
use catalog_events::DomainEvent;

use super::{Filter, Record, StoreError, Table};

/// Store-assigned row identifier (monotonic, never reused).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

impl RowId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for RowId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A committed row and the store version that last wrote it.
#[derive(Debug, Clone)]
struct Row {
    record: Arc<Record>,
    written_at: u64,
}

/// Immutable view of the committed tables.
///
/// Sessions share one snapshot through an `Arc`; a commit copies it only
/// while some session still holds the previous one.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    version: u64,
    rows: BTreeMap<RowId, Row>,
    by_table: BTreeMap<Table, BTreeSet<RowId>>,
    keys: HashMap<(Table, String), RowId>,
}

impl Snapshot {
    fn put(&mut self, id: RowId, record: Record, written_at: u64) {
        self.remove(id);
        let table = record.table();
        if let Some((_, key)) = record.natural_key() {
            self.keys.insert((table, key.to_string()), id);
        }
        self.by_table.entry(table).or_default().insert(id);
        self.rows.insert(
            id,
            Row {
                record: Arc::new(record),
                written_at,
            },
        );
    }

    fn remove(&mut self, id: RowId) {
        let Some(old) = self.rows.remove(&id) else {
            return;
        };
        let table = old.record.table();
        if let Some((_, key)) = old.record.natural_key() {
            let index_key = (table, key.to_string());
            if self.keys.get(&index_key) == Some(&id) {
                self.keys.remove(&index_key);
            }
        }
        if let Some(ids) = self.by_table.get_mut(&table) {
            ids.remove(&id);
        }
    }
}

/// In-memory transactional store.
///
/// Each [`Session`] reads a shared snapshot of the committed tables and keeps
/// its own writes in a private overlay. Conflicts are detected per row at
/// commit: a session fails with [`StoreError::Conflict`] only if another
/// session committed a write to a row this one also updated or deleted.
/// Natural keys are checked against the live index at commit, so two
/// overlapping inserts of the same sku or email cannot both succeed.
#[derive(Debug, Default)]
pub struct Database {
    state: RwLock<Arc<Snapshot>>,
    next_id: AtomicU64,
}

impl Database {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Open a session on the current committed snapshot.
    pub fn begin(self: &Arc<Self>) -> Result<Session, StoreError> {
        let base = Arc::clone(&*self.state.read().map_err(|_| StoreError::Poisoned)?);
        Ok(Session {
            db: Arc::clone(self),
            base,
            staged: BTreeMap::new(),
            finished: false,
        })
    }

    /// Number of successful writing commits so far.
    pub fn version(&self) -> Result<u64, StoreError> {
        Ok(self.state.read().map_err(|_| StoreError::Poisoned)?.version)
    }

    /// Committed row count of a table.
    pub fn count(&self, table: Table) -> Result<usize, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.by_table.get(&table).map_or(0, BTreeSet::len))
    }

    fn allocate(&self) -> RowId {
        RowId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Inserted,
    /// Copy of a committed row, edited in place.
    Updated,
}

#[derive(Debug)]
enum Staged {
    Live { record: Record, change: Change },
    Deleted,
}

/// One transaction against a [`Database`].
///
/// Dropping a session without committing discards its changes.
#[derive(Debug)]
pub struct Session {
    db: Arc<Database>,
    base: Arc<Snapshot>,
    staged: BTreeMap<RowId, Staged>,
    finished: bool,
}

impl Session {
    /// Insert a row, enforcing the table's natural-key uniqueness.
    pub fn insert(&mut self, record: Record) -> Result<RowId, StoreError> {
        if let Some((field, key)) = record.natural_key() {
            if self.key_owner(record.table(), key).is_some() {
                return Err(StoreError::DuplicateKey {
                    table: record.table(),
                    field,
                    key: key.to_string(),
                });
            }
        }

        let id = self.db.allocate();
        self.staged.insert(
            id,
            Staged::Live {
                record,
                change: Change::Inserted,
            },
        );
        Ok(id)
    }

    /// Ids of rows of `table` matching `filter`, ascending.
    ///
    /// A single-clause filter on the table's natural key is answered from the
    /// key index.
    pub fn select_all(&self, table: Table, filter: &Filter) -> Vec<RowId> {
        if let Some(key) = natural_key_lookup(table, filter) {
            return self.key_owner(table, key).into_iter().collect();
        }

        let mut ids: Vec<RowId> = self
            .visible(table)
            .filter(|(_, row)| filter.is_empty() || filter.matches(&row.to_json()))
            .map(|(id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Lowest-id row of `table` matching `filter`.
    pub fn select_one(&self, table: Table, filter: &Filter) -> Option<RowId> {
        self.select_all(table, filter).into_iter().next()
    }

    pub fn record(&self, id: RowId) -> Option<&Record> {
        match self.staged.get(&id) {
            Some(Staged::Live { record, .. }) => Some(record),
            Some(Staged::Deleted) => None,
            None => self.base.rows.get(&id).map(|row| row.record.as_ref()),
        }
    }

    /// Mutable access to a row; the row is considered written.
    pub fn record_mut(&mut self, id: RowId) -> Option<&mut Record> {
        if !self.staged.contains_key(&id) {
            let row = self.base.rows.get(&id)?;
            self.staged.insert(
                id,
                Staged::Live {
                    record: Record::clone(&row.record),
                    change: Change::Updated,
                },
            );
        }
        match self.staged.get_mut(&id)? {
            Staged::Live { record, .. } => Some(record),
            Staged::Deleted => None,
        }
    }

    /// Pending events of a row this session staged. Does not mark it written.
    ///
    /// Committed rows carry no pending events, so rows this session never
    /// touched yield `None`.
    pub fn events_mut(&mut self, id: RowId) -> Option<&mut EventQueue<DomainEvent>> {
        match self.staged.get_mut(&id)? {
            Staged::Live { record, .. } => Some(record.events_mut()),
            Staged::Deleted => None,
        }
    }

    /// Remove every row of `table` whose `field` equals `value`.
    pub fn delete_where(&mut self, table: Table, field: &str, value: &str) -> Vec<(RowId, Record)> {
        let ids = self.select_all(table, &Filter::by(field, value));
        let mut removed = Vec::with_capacity(ids.len());

        for id in ids {
            match self.staged.remove(&id) {
                Some(Staged::Live { record, change }) => {
                    if change != Change::Inserted {
                        self.staged.insert(id, Staged::Deleted);
                    }
                    removed.push((id, record));
                }
                Some(Staged::Deleted) => {
                    self.staged.insert(id, Staged::Deleted);
                }
                None => {
                    if let Some(row) = self.base.rows.get(&id) {
                        removed.push((id, Record::clone(&row.record)));
                        self.staged.insert(id, Staged::Deleted);
                    }
                }
            }
        }
        removed
    }

    /// Validate pending writes (natural-key uniqueness across the snapshot).
    pub fn flush(&self) -> Result<(), StoreError> {
        let mut claimed: HashMap<(Table, &str), RowId> = HashMap::new();
        for (id, record) in self.written() {
            let Some((field, key)) = record.natural_key() else {
                continue;
            };
            let table = record.table();
            let duplicate = || StoreError::DuplicateKey {
                table,
                field,
                key: key.to_string(),
            };

            if claimed.insert((table, key), id).is_some() {
                return Err(duplicate());
            }
            if let Some(&owner) = self.base.keys.get(&(table, key.to_string())) {
                // A staged owner is checked through `claimed` under its new key.
                if owner != id && !self.staged.contains_key(&owner) {
                    return Err(duplicate());
                }
            }
        }
        Ok(())
    }

    /// Publish this session's writes.
    ///
    /// Pending entity events are never persisted. A session without writes
    /// commits without touching the store.
    pub fn commit(mut self) -> Result<(), StoreError> {
        self.flush()?;
        self.finished = true;

        let writes: Vec<(RowId, Staged)> = std::mem::take(&mut self.staged).into_iter().collect();
        if writes.is_empty() {
            return Ok(());
        }

        let mut state = self.db.state.write().map_err(|_| StoreError::Poisoned)?;
        self.validate_against(&state, &writes)?;

        let snapshot = Arc::make_mut(&mut *state);
        let version = snapshot.version + 1;
        for (id, staged) in writes {
            match staged {
                Staged::Live { mut record, .. } => {
                    record.events_mut().drain().for_each(drop);
                    snapshot.put(id, record, version);
                }
                Staged::Deleted => snapshot.remove(id),
            }
        }
        snapshot.version = version;
        Ok(())
    }

    /// Discard the overlay.
    pub fn rollback(mut self) {
        self.finished = true;
    }

    /// Check this session's writes against what was committed since `begin`.
    fn validate_against(&self, current: &Snapshot, writes: &[(RowId, Staged)]) -> Result<(), StoreError> {
        let base_version = self.base.version;

        for (id, staged) in writes {
            let touches_existing = match staged {
                Staged::Live { change, .. } => *change == Change::Updated,
                Staged::Deleted => true,
            };
            if touches_existing {
                let actual = current.rows.get(id).map(|row| row.written_at);
                match actual {
                    Some(written_at) if written_at <= base_version => {}
                    _ => {
                        return Err(StoreError::Conflict {
                            row: *id,
                            expected: base_version,
                            actual: actual.unwrap_or(current.version),
                        });
                    }
                }
            }

            if let Staged::Live { record, .. } = staged {
                if let Some((field, key)) = record.natural_key() {
                    let table = record.table();
                    if let Some(&owner) = current.keys.get(&(table, key.to_string())) {
                        let released = writes.iter().any(|(w, _)| *w == owner);
                        if owner != *id && !released {
                            return Err(StoreError::DuplicateKey {
                                table,
                                field,
                                key: key.to_string(),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Rows of `table` as this session sees them (unordered).
    fn visible(&self, table: Table) -> impl Iterator<Item = (RowId, &Record)> {
        let committed = self
            .base
            .by_table
            .get(&table)
            .into_iter()
            .flatten()
            .filter(move |id| !self.staged.contains_key(*id))
            .filter_map(move |id| self.base.rows.get(id).map(|row| (*id, row.record.as_ref())));

        let staged = self.staged.iter().filter_map(move |(id, s)| match s {
            Staged::Live { record, .. } if record.table() == table => Some((*id, record)),
            _ => None,
        });

        committed.chain(staged)
    }

    /// Rows inserted or updated by this session.
    fn written(&self) -> impl Iterator<Item = (RowId, &Record)> {
        self.staged.iter().filter_map(|(id, s)| match s {
            Staged::Live { record, .. } => Some((*id, record)),
            Staged::Deleted => None,
        })
    }

    /// Lowest-id visible row of `table` holding natural key `key`.
    fn key_owner(&self, table: Table, key: &str) -> Option<RowId> {
        let staged = self
            .staged
            .iter()
            .filter_map(|(id, s)| match s {
                Staged::Live { record, .. }
                    if record.table() == table
                        && record.natural_key().map(|(_, k)| k) == Some(key) =>
                {
                    Some(*id)
                }
                _ => None,
            })
            .min();

        let committed = self
            .base
            .keys
            .get(&(table, key.to_string()))
            .copied()
            .filter(|id| !self.staged.contains_key(id));

        match (staged, committed) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// The key value when `filter` is exactly `{<natural key of table>: "<value>"}`.
fn natural_key_lookup(table: Table, filter: &Filter) -> Option<&str> {
    let (field, value) = filter.single()?;
    if Some(field) != table.natural_key_field() {
        return None;
    }
    value.as_str()
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(
                base_version = self.base.version,
                staged = self.staged.len(),
                "session dropped without commit, rolled back"
            );
        }
    }
}
