//! Document-store collaborator
//!
//! The external store is consumed through the [`DocumentStore`] trait:
//! collection-scoped create/update/delete, one-shot queries, and
//! push-based subscriptions that deliver the full, ordered result set on
//! every change. [`LocalStore`] is the bundled SQLite-backed
//! implementation used by the CLI and tests.
//!
//! The application never treats its copy of a collection as
//! authoritative: each snapshot replaces local state wholesale.

mod error;
mod local;

use std::cmp::Ordering;
use std::sync::Arc;

use serde_json::Value;

pub use error::{StoreError, StoreResult};
pub use local::LocalStore;

/// A stored document: an id plus a loosely-typed JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

impl Document {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn int_field(&self, name: &str) -> Option<i64> {
        let value = self.field(name)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f.round() as i64))
    }

    pub fn bool_field(&self, name: &str) -> Option<bool> {
        self.field(name).and_then(Value::as_bool)
    }
}

/// Decode a typed entity from a stored document.
///
/// Returns `None` for malformed records; callers skip (and log) those
/// rather than propagate undefined values into arithmetic.
pub trait FromDocument: Sized {
    fn from_document(doc: &Document) -> Option<Self>;
}

/// Sort direction for a query's ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// A collection query: equality filters, single-key ordering, and an
/// optional result-count limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<(String, Value)>,
    order: Option<(String, SortOrder)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter on a top-level field.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Order results by a single top-level field.
    pub fn order_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.order = Some((field.into(), order));
        self
    }

    /// Cap the number of results, applied after filtering and ordering.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Whether a document passes every equality filter.
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| doc.field(field) == Some(expected))
    }

    /// Evaluate the query over a collection's documents.
    ///
    /// Input order is the store's insertion order; it is preserved when no
    /// ordering key is set.
    pub fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
        let mut results: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();

        if let Some((field, order)) = &self.order {
            results.sort_by(|a, b| {
                let cmp = compare_values(a.field(field), b.field(field));
                match order {
                    SortOrder::Ascending => cmp,
                    SortOrder::Descending => cmp.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            results.truncate(limit);
        }

        results
    }
}

/// Order JSON values for query sorting: numbers, then strings, then
/// booleans; documents missing the key sort last.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (x, y) => type_rank(x).cmp(&type_rank(y)),
        },
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Number(_) => 0,
        Value::String(_) => 1,
        Value::Bool(_) => 2,
        _ => 3,
    }
}

/// Callback invoked with the full, ordered result set of a subscription.
///
/// Invoked once immediately on subscribe and again after every mutation
/// that touches the collection. Must not call back into the store.
pub type SnapshotFn = Arc<dyn Fn(Vec<Document>) + Send + Sync>;

/// Identifies an open subscription for teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// The document-store collaborator seam.
///
/// Queries support equality filters and single-key ordering with an
/// optional result-count limit; subscriptions push full snapshots.
pub trait DocumentStore: Send + Sync {
    /// Create a document. When the body carries a string `id` field it is
    /// used as the document id (and removed from the body); otherwise a
    /// fresh id is generated. Returns the document id.
    fn create(&self, collection: &str, body: Value) -> StoreResult<String>;

    /// Shallow-merge `patch` into an existing document's body.
    fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<()>;

    /// Delete a document. Deleting a missing document is a no-op.
    fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Run a query once.
    fn get_once(&self, collection: &str, query: &Query) -> StoreResult<Vec<Document>>;

    /// Open a push subscription. The callback fires immediately with the
    /// current result set, then after every relevant mutation.
    fn subscribe(
        &self,
        collection: &str,
        query: &Query,
        on_snapshot: SnapshotFn,
    ) -> StoreResult<SubscriptionId>;

    /// Tear down a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Guard for an open subscription; dropping it unsubscribes, so handles
/// cannot leak past their owner.
pub struct Subscription {
    store: Arc<dyn DocumentStore>,
    id: Option<SubscriptionId>,
}

impl Subscription {
    pub fn new(store: Arc<dyn DocumentStore>, id: SubscriptionId) -> Self {
        Self {
            store,
            id: Some(id),
        }
    }

    /// Explicit teardown; equivalent to dropping the guard.
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(id) = self.id.take() {
            self.store.unsubscribe(id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
