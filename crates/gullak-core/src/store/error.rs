//! Store error handling
//!
//! Typed errors for document-store operations. Failed writes are surfaced
//! to the view layer, which rolls back its optimistic splice and shows
//! the message; nothing here retries.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur against the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store database '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Underlying database error
    #[error("Store database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Document body could not be serialized or parsed
    #[error("Invalid document body: {0}")]
    Body(#[from] serde_json::Error),

    /// Document bodies and patches must be JSON objects
    #[error("Document body for '{collection}' must be a JSON object")]
    NotAnObject { collection: String },

    /// Update target does not exist
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::NotFound {
            collection: "goals".to_string(),
            id: "g1".to_string(),
        };
        assert_eq!(err.to_string(), "Document not found: goals/g1");
    }

    #[test]
    fn test_not_an_object_display() {
        let err = StoreError::NotAnObject {
            collection: "bills".to_string(),
        };
        assert!(err.to_string().contains("bills"));
        assert!(err.to_string().contains("JSON object"));
    }
}
