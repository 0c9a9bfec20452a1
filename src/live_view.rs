//! Local mirrors of a store table kept current from its change-feed.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::actor_framework::{ChangeEvent, ChangeKind, Entity, Subscription};

/// What applying one change-feed event did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Inserted,
    Updated,
    Removed,
    /// Duplicate or stale delivery; nothing changed.
    Ignored,
}

/// Records of one table keyed by id.
///
/// The feed may deliver an event twice or out of order. Upserts are keyed by
/// id, a record is never replaced by one with a lower [`Entity::revision`], and
/// deleted ids stay tombstoned so a late update cannot resurrect them.
///
/// The stale-update guard only helps entities that report a revision. Orders
/// do (timeline length); products and categories keep the default `0`, so for
/// them the last delivered update wins.
#[derive(Debug, Clone)]
pub struct LiveCollection<T: Entity> {
    records: HashMap<T::Id, T>,
    tombstones: HashSet<T::Id>,
}

impl<T: Entity> Default for LiveCollection<T> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            tombstones: HashSet::new(),
        }
    }
}

impl<T: Entity> LiveCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the initial fetch. Records already seen through the feed win if newer.
    pub fn seed(&mut self, records: impl IntoIterator<Item = T>) {
        for record in records {
            self.upsert(record);
        }
    }

    pub fn apply(&mut self, event: ChangeEvent<T>) -> Applied {
        match event.kind {
            ChangeKind::Insert | ChangeKind::Update => self.upsert(event.record),
            ChangeKind::Delete => {
                let id = event.record.id().clone();
                let removed = self.records.remove(&id).is_some();
                self.tombstones.insert(id);
                if removed {
                    Applied::Removed
                } else {
                    Applied::Ignored
                }
            }
        }
    }

    /// Applies every event already queued on the subscription without waiting.
    ///
    /// Returns the records that were new to this collection, e.g. to ring the
    /// new-order chime.
    pub fn drain(&mut self, subscription: &mut Subscription<T>) -> Vec<T> {
        let mut inserted = Vec::new();
        while let Some(event) = subscription.try_recv() {
            let record = event.record.clone();
            if self.apply(event) == Applied::Inserted {
                inserted.push(record);
            }
        }
        if !inserted.is_empty() {
            debug!(count = inserted.len(), "New records from change feed");
        }
        inserted
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current records in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }

    /// Snapshot of the records, for the pure dashboard functions.
    pub fn to_vec(&self) -> Vec<T> {
        self.records.values().cloned().collect()
    }

    fn upsert(&mut self, record: T) -> Applied {
        let id = record.id().clone();
        if self.tombstones.contains(&id) {
            trace!(%id, "Ignoring change for deleted record");
            return Applied::Ignored;
        }
        match self.records.get_mut(&id) {
            Some(existing) if existing.revision() > record.revision() => {
                trace!(%id, "Ignoring stale change");
                Applied::Ignored
            }
            Some(existing) => {
                *existing = record;
                Applied::Updated
            }
            None => {
                self.records.insert(id, record);
                Applied::Inserted
            }
        }
    }
}
