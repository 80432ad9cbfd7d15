//! Document store boundary.
//!
//! The site's content lives in a document database that offers four requests:
//! an ordered query of a collection, an atomic write batch against one
//! collection, a single-document read and a single-document merge-write.
//! [`DocumentStore`] is that surface; [`FileStore`] and [`MemoryStore`] are the
//! two implementations shipped here.
//!
//! # Store-assigned fields
//!
//! On [`BatchOp::Insert`] the store assigns a fresh [`DocumentId`] and writes the
//! batch commit time into the `createdAt` field. Every insert of one batch gets
//! the same timestamp; ties are broken by position inside the batch.
//!
//! # Conditional writes
//!
//! Seeding must never add defaults next to records another writer committed
//! after the emptiness check. [`BatchOp::RequireEmpty`] and
//! [`DocumentStore::merge_absent`] move that check inside the store, under the
//! same lock as the write.

mod file;
mod memory;

use std::cmp::Ordering;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::types::{DocPath, DocumentId};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Field name holding the store-assigned creation timestamp.
pub const CREATED_AT: &str = "createdAt";

/// Raw document body.
pub type Fields = Map<String, Value>;

/// A stored document of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Fields,
}

impl Document {
    /// Parsed `createdAt`, if the document carries a valid one.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.fields.get(CREATED_AT).and_then(parse_timestamp)
    }
}

/// Parse a stored timestamp: an RFC 3339 string, or the exported
/// `{"seconds": .., "nanoseconds": ..}` object form.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Object(map) => {
            let seconds = map.get("seconds").and_then(Value::as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, nanos)
        }
        _ => None,
    }
}

/// One operation of a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    /// Abort the whole batch with [`StoreError::NotEmpty`] unless the
    /// collection holds no documents at this point.
    RequireEmpty,
    /// Remove every document currently in the collection.
    DeleteAll,
    /// Remove one document; a missing id is not an error.
    Delete(DocumentId),
    /// Add a document with a store-assigned id and `createdAt`.
    Insert(Fields),
}

/// An ordered list of operations committed all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_empty(&mut self) -> &mut Self {
        self.ops.push(BatchOp::RequireEmpty);
        self
    }

    pub fn delete_all(&mut self) -> &mut Self {
        self.ops.push(BatchOp::DeleteAll);
        self
    }

    pub fn delete(&mut self, id: DocumentId) -> &mut Self {
        self.ops.push(BatchOp::Delete(id));
        self
    }

    pub fn insert(&mut self, fields: Fields) -> &mut Self {
        self.ops.push(BatchOp::Insert(fields));
        self
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// What a committed batch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub committed_at: DateTime<Utc>,
    pub deleted: usize,
    pub inserted: Vec<DocumentId>,
}

/// The document database as seen by the sync service.
///
/// Implementations must be thread-safe; a committed batch is visible either
/// entirely or not at all.
pub trait DocumentStore: Send + Sync {
    /// Every document of `collection`, ascending by `createdAt`.
    fn query_ordered(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Apply `batch` to `collection` atomically.
    fn commit(&self, collection: &str, batch: WriteBatch) -> Result<CommitReceipt, StoreError>;

    /// Read a singleton document; `None` if it was never written.
    fn get(&self, path: &DocPath) -> Result<Option<Fields>, StoreError>;

    /// Write `fields` into a singleton document, creating it if absent and
    /// leaving fields not named in `fields` untouched.
    fn merge(&self, path: &DocPath, fields: Fields) -> Result<(), StoreError>;

    /// Write only the keys of `fields` the document does not hold yet,
    /// creating it if absent. Returns whether any key was written.
    fn merge_absent(&self, path: &DocPath, fields: Fields) -> Result<bool, StoreError>;
}

// ---------------------------------------------------------------------------
// Shared helpers for the implementations
// ---------------------------------------------------------------------------

/// Apply a batch to an in-memory copy of a collection.
///
/// The caller swaps `docs` in only after this returns `Ok`, which is what makes
/// the commit all-or-nothing.
pub(crate) fn apply_batch(
    collection: &str,
    docs: &mut Vec<Document>,
    batch: WriteBatch,
    committed_at: DateTime<Utc>,
) -> Result<CommitReceipt, StoreError> {
    let stamp = Value::String(committed_at.to_rfc3339_opts(SecondsFormat::Micros, true));
    let mut deleted = 0;
    let mut inserted = Vec::new();

    for op in batch.ops {
        match op {
            BatchOp::RequireEmpty if !docs.is_empty() => {
                return Err(StoreError::NotEmpty {
                    collection: collection.to_string(),
                });
            }
            BatchOp::RequireEmpty => {}
            BatchOp::DeleteAll => {
                deleted += docs.len();
                docs.clear();
            }
            BatchOp::Delete(id) => {
                let before = docs.len();
                docs.retain(|d| d.id != id);
                deleted += before - docs.len();
            }
            BatchOp::Insert(mut fields) => {
                let id = DocumentId::generate();
                fields.insert(CREATED_AT.to_string(), stamp.clone());
                docs.push(Document {
                    id: id.clone(),
                    fields,
                });
                inserted.push(id);
            }
        }
    }

    Ok(CommitReceipt {
        committed_at,
        deleted,
        inserted,
    })
}

/// Stable sort by `createdAt`; documents without a valid timestamp go last.
pub(crate) fn sort_by_created_at(docs: &mut [Document]) {
    docs.sort_by(|a, b| match (a.created_at(), b.created_at()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Shallow merge: top-level keys of `patch` overwrite those of `target`.
pub(crate) fn merge_fields(target: &mut Fields, patch: Fields) {
    for (key, value) in patch {
        target.insert(key, value);
    }
}

/// Shallow merge that keeps every key `target` already has.
pub(crate) fn merge_absent_fields(target: &mut Fields, patch: Fields) -> bool {
    let mut written = false;
    for (key, value) in patch {
        if !target.contains_key(&key) {
            target.insert(key, value);
            written = true;
        }
    }
    written
}
