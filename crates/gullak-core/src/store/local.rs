//! Local SQLite-backed document store
//!
//! Documents are JSON text rows keyed by (collection, id). Queries are
//! evaluated over the decoded bodies; snapshot order before explicit
//! ordering is insertion order, which stands in for the hosted store's
//! server ordering.
//!
//! Subscriptions are an in-process registry: every mutation re-runs each
//! matching subscription's query and pushes the full result set to its
//! callback. Callbacks are invoked after the internal lock is released.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{params, Connection};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Document, Query, SnapshotFn, StoreError, StoreResult, SubscriptionId};
use crate::store::DocumentStore;

/// SQLite-backed [`DocumentStore`].
pub struct LocalStore {
    inner: Mutex<Inner>,
}

struct Inner {
    conn: Connection,
    subscriptions: Vec<SubscriptionEntry>,
    next_subscription: u64,
}

struct SubscriptionEntry {
    id: SubscriptionId,
    collection: String,
    query: Query,
    on_snapshot: SnapshotFn,
}

impl LocalStore {
    /// Open (or create) the store at the given database path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|_| StoreError::Open {
                    path: PathBuf::from(path),
                    source: rusqlite::Error::InvalidPath(PathBuf::from(path)),
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: PathBuf::from(path),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory store (used by tests and guest sessions).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id         TEXT NOT NULL,
                body       TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            )",
            [],
        )?;

        Ok(Self {
            inner: Mutex::new(Inner {
                conn,
                subscriptions: Vec::new(),
                next_subscription: 0,
            }),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Statements are individually atomic, so a poisoned lock leaves
        // no half-written row; recover the guard.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Re-run every subscription on `collection` and push fresh snapshots.
    fn notify(&self, collection: &str) {
        let deliveries = {
            let inner = self.lock();
            let rows = match inner.load_collection(collection) {
                Ok(rows) => rows,
                Err(e) => {
                    warn!(collection, error = %e, "failed to load collection for snapshot push");
                    return;
                }
            };

            inner
                .subscriptions
                .iter()
                .filter(|s| s.collection == collection)
                .map(|s| (s.on_snapshot.clone(), s.query.apply(rows.clone())))
                .collect::<Vec<_>>()
        };

        // Lock released: callbacks may feed channels or view state freely.
        for (on_snapshot, snapshot) in deliveries {
            on_snapshot(snapshot);
        }
    }
}

impl Inner {
    fn load_collection(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, body FROM documents WHERE collection = ?1 ORDER BY rowid")?;

        let rows = stmt.query_map(params![collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut docs = Vec::new();
        for row in rows {
            let (id, body) = row?;
            match serde_json::from_str(&body) {
                Ok(body) => docs.push(Document { id, body }),
                Err(e) => {
                    // Fail closed: a corrupt row never reaches the views.
                    warn!(collection, id, error = %e, "skipping unparseable document row");
                }
            }
        }
        Ok(docs)
    }

    fn get_body(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let mut stmt = self
            .conn
            .prepare("SELECT body FROM documents WHERE collection = ?1 AND id = ?2")?;
        let mut rows = stmt.query(params![collection, id])?;

        match rows.next()? {
            Some(row) => {
                let body: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }
}

impl DocumentStore for LocalStore {
    fn create(&self, collection: &str, body: Value) -> StoreResult<String> {
        let Value::Object(mut fields) = body else {
            return Err(StoreError::NotAnObject {
                collection: collection.to_string(),
            });
        };

        // An "id" field in the body names the document, so optimistic
        // local copies and stored documents agree on identity.
        let id = match fields.remove("id") {
            Some(Value::String(id)) if !id.is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };

        let body = serde_json::to_string(&Value::Object(fields))?;
        {
            let inner = self.lock();
            inner.conn.execute(
                "INSERT OR REPLACE INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
                params![collection, id, body],
            )?;
        }
        debug!(collection, id, "created document");

        self.notify(collection);
        Ok(id)
    }

    fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<()> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::NotAnObject {
                collection: collection.to_string(),
            });
        };

        {
            let inner = self.lock();
            let existing =
                inner
                    .get_body(collection, id)?
                    .ok_or_else(|| StoreError::NotFound {
                        collection: collection.to_string(),
                        id: id.to_string(),
                    })?;

            let Value::Object(mut fields) = existing else {
                return Err(StoreError::NotAnObject {
                    collection: collection.to_string(),
                });
            };
            for (key, value) in patch {
                fields.insert(key, value);
            }

            let body = serde_json::to_string(&Value::Object(fields))?;
            inner.conn.execute(
                "UPDATE documents SET body = ?1 WHERE collection = ?2 AND id = ?3",
                params![body, collection, id],
            )?;
        }
        debug!(collection, id, "updated document");

        self.notify(collection);
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let removed = {
            let inner = self.lock();
            inner.conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )?
        };

        if removed > 0 {
            debug!(collection, id, "deleted document");
            self.notify(collection);
        }
        Ok(())
    }

    fn get_once(&self, collection: &str, query: &Query) -> StoreResult<Vec<Document>> {
        let rows = self.lock().load_collection(collection)?;
        Ok(query.apply(rows))
    }

    fn subscribe(
        &self,
        collection: &str,
        query: &Query,
        on_snapshot: SnapshotFn,
    ) -> StoreResult<SubscriptionId> {
        let (id, initial) = {
            let mut inner = self.lock();
            let id = SubscriptionId(inner.next_subscription);
            inner.next_subscription += 1;

            let initial = query.apply(inner.load_collection(collection)?);
            inner.subscriptions.push(SubscriptionEntry {
                id,
                collection: collection.to_string(),
                query: query.clone(),
                on_snapshot: on_snapshot.clone(),
            });
            (id, initial)
        };
        debug!(collection, subscription = id.0, "opened subscription");

        on_snapshot(initial);
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.lock();
        inner.subscriptions.retain(|s| s.id != id);
    }
}
