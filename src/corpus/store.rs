//! Process-wide in-memory document store.
//!
//! The store is created once at startup and shared through an `Arc`. Documents are kept in
//! ingestion order and never deduplicated. A request that ingests holds the write guard from
//! [`CorpusStore::write`] across ingest and query, so no other request reads a half-written
//! corpus or appends between that ingest and its query. Requests that only read share
//! [`CorpusStore::read`] guards and run concurrently.

use super::types::Document;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Ordered, append-only (unless cleared) collection of ingested documents.
#[derive(Debug, Default)]
pub struct CorpusStore {
    documents: RwLock<Vec<Document>>,
}

/// Exclusive access to the store contents, held by one ingesting request.
pub struct StoreWriteGuard<'a> {
    documents: RwLockWriteGuard<'a, Vec<Document>>,
}

/// Shared read access to the store contents.
pub struct StoreReadGuard<'a> {
    documents: RwLockReadGuard<'a, Vec<Document>>,
}

impl CorpusStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the store.
    pub async fn write(&self) -> StoreWriteGuard<'_> {
        StoreWriteGuard {
            documents: self.documents.write().await,
        }
    }

    /// Wait for shared access; blocks only while a writer holds the store.
    pub async fn read(&self) -> StoreReadGuard<'_> {
        StoreReadGuard {
            documents: self.documents.read().await,
        }
    }

    /// Number of documents currently stored.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl StoreWriteGuard<'_> {
    /// Append documents in the order given.
    pub fn write_documents(&mut self, documents: Vec<Document>) {
        self.documents.extend(documents);
    }

    /// Drop every stored document, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.documents.len();
        self.documents.clear();
        removed
    }

    /// Stored documents in ingestion order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl StoreReadGuard<'_> {
    /// Stored documents in ingestion order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }
}
