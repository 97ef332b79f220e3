//! Generation-tagged live queries
//!
//! When the session or query parameters change, a page tears down its
//! subscription and opens a new one. Snapshots from the old stream may
//! still be queued in the channel; each [`LiveQuery`] stamps its
//! callbacks with a generation number and `decode` drops anything stamped
//! with a superseded generation.

use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::store::{
    Document, DocumentStore, FromDocument, Query, SnapshotFn, StoreResult, Subscription,
};

/// A snapshot stamped with the subscription generation that produced it.
#[derive(Debug, Clone)]
pub struct TaggedSnapshot {
    pub generation: u64,
    pub documents: Vec<Document>,
}

/// One page's subscription to one collection.
///
/// `resubscribe` always tears down the previous subscription before
/// opening the next, so at most one stream is live per query.
pub struct LiveQuery<T> {
    store: Arc<dyn DocumentStore>,
    collection: String,
    generation: u64,
    active: Option<Subscription>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: FromDocument> LiveQuery<T> {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            generation: 0,
            active: None,
            _entity: PhantomData,
        }
    }

    /// Replace the current subscription with one for `query`.
    ///
    /// Snapshots are delivered to `sink` stamped with the new generation;
    /// anything still in flight from the old subscription decodes to
    /// `None`.
    pub fn resubscribe(
        &mut self,
        query: &Query,
        sink: mpsc::UnboundedSender<TaggedSnapshot>,
    ) -> StoreResult<()> {
        // Teardown before setup, so the old stream stops first.
        self.active = None;
        self.generation += 1;
        let generation = self.generation;

        let callback: SnapshotFn = Arc::new(move |documents| {
            // Send failures mean the page loop is gone; nothing to do.
            let _ = sink.send(TaggedSnapshot {
                generation,
                documents,
            });
        });

        debug!(collection = %self.collection, generation, "resubscribing");
        let id = self.store.subscribe(&self.collection, query, callback)?;
        self.active = Some(Subscription::new(self.store.clone(), id));
        Ok(())
    }

    /// Tear down without resubscribing (e.g. on sign-out). Bumps the
    /// generation so queued snapshots are dropped.
    pub fn teardown(&mut self) {
        if self.active.take().is_some() {
            debug!(collection = %self.collection, "subscription torn down");
        }
        self.generation += 1;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Decode a snapshot if it belongs to the live subscription.
    ///
    /// Returns `None` for snapshots from superseded generations or when
    /// no subscription is active.
    pub fn decode(&self, snapshot: &TaggedSnapshot) -> Option<Vec<T>> {
        if self.active.is_none() || snapshot.generation != self.generation {
            return None;
        }
        Some(decode_documents(&snapshot.documents, &self.collection))
    }
}

/// Decode documents into entities, skipping malformed records.
pub fn decode_documents<T: FromDocument>(documents: &[Document], collection: &str) -> Vec<T> {
    documents
        .iter()
        .filter_map(|doc| {
            let entity = T::from_document(doc);
            if entity.is_none() {
                warn!(collection, id = %doc.id, "skipping malformed document");
            }
            entity
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Goal;
    use crate::store::LocalStore;
    use serde_json::json;

    fn store() -> Arc<dyn DocumentStore> {
        Arc::new(LocalStore::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_snapshots_stamped_with_current_generation() {
        let store = store();
        store
            .create("goals", json!({"name": "Trip", "target": 100}))
            .unwrap();

        let mut live: LiveQuery<Goal> = LiveQuery::new(store, "goals");
        let (tx, mut rx) = mpsc::unbounded_channel();
        live.resubscribe(&Query::new(), tx).unwrap();

        let snapshot = rx.recv().await.unwrap();
        let goals = live.decode(&snapshot).unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].name, "Trip");
    }

    #[tokio::test]
    async fn test_stale_generation_snapshot_is_dropped() {
        let store = store();
        store.create("goals", json!({"name": "Old"})).unwrap();

        let mut live: LiveQuery<Goal> = LiveQuery::new(store, "goals");
        let (tx, mut rx) = mpsc::unbounded_channel();

        live.resubscribe(&Query::new(), tx.clone()).unwrap();
        let stale = rx.recv().await.unwrap();

        // A second resubscribe supersedes the first stream.
        live.resubscribe(&Query::new(), tx).unwrap();
        assert!(live.decode(&stale).is_none());

        let fresh = rx.recv().await.unwrap();
        assert!(live.decode(&fresh).is_some());
    }

    #[tokio::test]
    async fn test_teardown_stops_decoding() {
        let store = store();
        let mut live: LiveQuery<Goal> = LiveQuery::new(store, "goals");
        let (tx, mut rx) = mpsc::unbounded_channel();

        live.resubscribe(&Query::new(), tx).unwrap();
        let snapshot = rx.recv().await.unwrap();

        live.teardown();
        assert!(!live.is_active());
        assert!(live.decode(&snapshot).is_none());
    }

    #[test]
    fn test_decode_skips_malformed_documents() {
        let docs = vec![
            Document {
                id: "good".into(),
                body: json!({"name": "Trip", "target": 100}),
            },
            Document {
                id: "bad".into(),
                body: json!({"target": 50}),
            },
        ];

        let goals: Vec<Goal> = decode_documents(&docs, "goals");
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].id, "good");
    }
}
