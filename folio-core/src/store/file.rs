//! JSON-file document store.
//!
//! # Storage layout
//!
//! ```text
//! <root>/
//!   collections/
//!     <collection>.json        (array of documents in insertion order)
//!   documents/
//!     <collection>/<doc>.json  (singleton document body)
//! ```
//!
//! Every write goes through `<file>.tmp` + `rename`, so a reader sees either the
//! previous or the new file. A commit rewrites the whole collection file, which
//! makes a batch atomic. Writers inside one process are serialized by a lock;
//! across processes the last rename wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

use crate::error::{io_err, StoreError};
use crate::types::DocPath;

use super::{
    apply_batch, merge_absent_fields, merge_fields, sort_by_created_at, CommitReceipt, Document,
    DocumentStore, Fields, WriteBatch,
};

/// Document store persisted as JSON files under a root directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (or lazily create) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/collections/<collection>.json` (pure, no I/O).
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.root
            .join("collections")
            .join(format!("{collection}.json"))
    }

    /// `<root>/documents/<collection>/<doc>.json` (pure, no I/O).
    pub fn document_path(&self, path: &DocPath) -> PathBuf {
        self.root
            .join("documents")
            .join(path.collection)
            .join(format!("{}.json", path.doc))
    }

    fn read_collection(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let path = self.collection_path(collection);
        match read_optional(&path)? {
            Some(contents) => serde_json::from_str(&contents)
                .map_err(|source| StoreError::Parse { path, source }),
            None => Ok(Vec::new()),
        }
    }
}

impl DocumentStore for FileStore {
    fn query_ordered(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let mut docs = self.read_collection(collection)?;
        sort_by_created_at(&mut docs);
        Ok(docs)
    }

    fn commit(&self, collection: &str, batch: WriteBatch) -> Result<CommitReceipt, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut docs = self.read_collection(collection)?;
        let receipt = apply_batch(collection, &mut docs, batch, Utc::now())?;
        let json = serde_json::to_string_pretty(&docs)?;
        atomic_write(&self.collection_path(collection), &json)?;

        tracing::debug!(
            "committed batch to {collection}: {} deleted, {} inserted",
            receipt.deleted,
            receipt.inserted.len()
        );
        Ok(receipt)
    }

    fn get(&self, path: &DocPath) -> Result<Option<Fields>, StoreError> {
        let file = self.document_path(path);
        match read_optional(&file)? {
            Some(contents) => serde_json::from_str(&contents)
                .map(Some)
                .map_err(|source| StoreError::Parse { path: file, source }),
            None => Ok(None),
        }
    }

    fn merge(&self, path: &DocPath, fields: Fields) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut current = self.get(path)?.unwrap_or_default();
        merge_fields(&mut current, fields);
        let json = serde_json::to_string_pretty(&current)?;
        atomic_write(&self.document_path(path), &json)
    }

    fn merge_absent(&self, path: &DocPath, fields: Fields) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut current = self.get(path)?.unwrap_or_default();
        if !merge_absent_fields(&mut current, fields) {
            return Ok(false);
        }
        let json = serde_json::to_string_pretty(&current)?;
        atomic_write(&self.document_path(path), &json)?;
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

/// Write flow: create parent → `<path>.tmp` → `rename`. The `.tmp` sibling
/// lives in the same directory, so the rename never crosses filesystems.
fn atomic_write(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
