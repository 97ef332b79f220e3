//! Optimistic list edits
//!
//! A mutation is applied to the on-screen list before the store write is
//! attempted. Each edit returns a [`Rollback`] token; when the write
//! fails the caller rolls the splice back and surfaces the error. There
//! is no automatic retry.
//!
//! Snapshots reconcile by id: the server's ordering wins outright, a
//! pending entry present in the snapshot is confirmed, and a pending
//! entry the snapshot has not caught up to yet is re-appended so it never
//! flickers out of view.

use std::collections::HashSet;

use crate::models::{Bill, Goal, Investment};

/// An entity with a stable string id.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Goal {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Bill {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Investment {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Token to undo one optimistic edit.
#[derive(Debug, Clone)]
pub enum Rollback<T> {
    Insert { id: String },
    Modify { id: String, previous: T },
    Remove { index: usize, item: T },
}

/// The on-screen entity list with pending-edit bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct OptimisticList<T> {
    items: Vec<T>,
    pending: HashSet<String>,
}

impl<T: Keyed + Clone> OptimisticList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            pending: HashSet::new(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.key() == id)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Splice a new entity in ahead of server confirmation.
    pub fn insert(&mut self, item: T) -> Rollback<T> {
        let id = item.key().to_string();
        self.pending.insert(id.clone());
        self.items.push(item);
        Rollback::Insert { id }
    }

    /// Edit an entity in place ahead of server confirmation.
    pub fn modify(&mut self, id: &str, edit: impl FnOnce(&mut T)) -> Option<Rollback<T>> {
        let item = self.items.iter_mut().find(|item| item.key() == id)?;
        let previous = item.clone();
        edit(item);
        self.pending.insert(id.to_string());
        Some(Rollback::Modify {
            id: id.to_string(),
            previous,
        })
    }

    /// Remove an entity ahead of server confirmation.
    pub fn remove(&mut self, id: &str) -> Option<Rollback<T>> {
        let index = self.items.iter().position(|item| item.key() == id)?;
        let item = self.items.remove(index);
        self.pending.insert(id.to_string());
        Some(Rollback::Remove { index, item })
    }

    /// Undo one optimistic edit after a failed write.
    pub fn rollback(&mut self, token: Rollback<T>) {
        match token {
            Rollback::Insert { id } => {
                self.items.retain(|item| item.key() != id);
                self.pending.remove(&id);
            }
            Rollback::Modify { id, previous } => {
                if let Some(item) = self.items.iter_mut().find(|item| item.key() == id) {
                    *item = previous;
                }
                self.pending.remove(&id);
            }
            Rollback::Remove { index, item } => {
                self.pending.remove(item.key());
                let index = index.min(self.items.len());
                self.items.insert(index, item);
            }
        }
    }

    /// Mark an edit confirmed without waiting for the next snapshot.
    pub fn confirm(&mut self, id: &str) {
        self.pending.remove(id);
    }

    /// Replace the list with a server snapshot.
    ///
    /// The snapshot's contents and order win. Pending entries the
    /// snapshot already contains are confirmed; pending entries it has
    /// not caught up to are re-appended in their previous order.
    pub fn reconcile(&mut self, snapshot: Vec<T>) {
        let pending_items: Vec<T> = self
            .items
            .iter()
            .filter(|item| self.pending.contains(item.key()))
            .cloned()
            .collect();

        let snapshot_ids: HashSet<String> =
            snapshot.iter().map(|item| item.key().to_string()).collect();

        self.items = snapshot;
        for item in pending_items {
            if !snapshot_ids.contains(item.key()) {
                self.items.push(item);
            }
        }

        // A pending id the snapshot carries is a confirmed insert or
        // edit; one matching no item at all is a confirmed delete.
        let items = &self.items;
        self.pending
            .retain(|id| !snapshot_ids.contains(id) && items.iter().any(|item| item.key() == id));
    }

    /// Replace the list wholesale, discarding pending bookkeeping.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.pending.clear();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.pending.clear();
    }
}
