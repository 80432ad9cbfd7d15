//! In-process document store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::error::StoreError;
use crate::types::DocPath;

use super::{
    apply_batch, merge_absent_fields, merge_fields, sort_by_created_at, CommitReceipt, Document,
    DocumentStore, Fields, WriteBatch,
};

#[derive(Debug, Default)]
struct State {
    collections: HashMap<String, Vec<Document>>,
    documents: HashMap<DocPath, Fields>,
}

/// Document store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl DocumentStore for MemoryStore {
    fn query_ordered(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let mut docs = self
            .state()?
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default();
        sort_by_created_at(&mut docs);
        Ok(docs)
    }

    fn commit(&self, collection: &str, batch: WriteBatch) -> Result<CommitReceipt, StoreError> {
        let mut state = self.state()?;
        let mut docs = state
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default();
        let receipt = apply_batch(collection, &mut docs, batch, Utc::now())?;
        state.collections.insert(collection.to_string(), docs);
        Ok(receipt)
    }

    fn get(&self, path: &DocPath) -> Result<Option<Fields>, StoreError> {
        Ok(self.state()?.documents.get(path).cloned())
    }

    fn merge(&self, path: &DocPath, fields: Fields) -> Result<(), StoreError> {
        let mut state = self.state()?;
        let current = state.documents.entry(path.clone()).or_default();
        merge_fields(current, fields);
        Ok(())
    }

    fn merge_absent(&self, path: &DocPath, fields: Fields) -> Result<bool, StoreError> {
        let mut state = self.state()?;
        let current = state.documents.entry(path.clone()).or_default();
        Ok(merge_absent_fields(current, fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    fn titled(title: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("title".into(), json!(title));
        fields
    }

    #[test]
    fn collections_are_isolated() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.insert(titled("a"));
        store.commit("services", batch).unwrap();

        assert_eq!(store.query_ordered("services").unwrap().len(), 1);
        assert!(store.query_ordered("pricing_plans").unwrap().is_empty());
    }

    #[test]
    fn rejected_precondition_keeps_collection() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.insert(titled("admin"));
        store.commit("services", batch).unwrap();

        let mut seed = WriteBatch::new();
        seed.require_empty().insert(titled("default"));
        let err = store.commit("services", seed).unwrap_err();
        assert!(matches!(err, StoreError::NotEmpty { .. }));

        let docs = store.query_ordered("services").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].fields["title"], "admin");
    }

    #[test]
    fn merge_absent_keeps_existing_fields() {
        let store = MemoryStore::new();
        let path = DocPath::new("pages", "home");
        store.merge(&path, titled("admin")).unwrap();

        assert!(!store.merge_absent(&path, titled("default")).unwrap());
        assert_eq!(store.get(&path).unwrap().unwrap()["title"], "admin");
    }

    #[test]
    fn concurrent_replace_batches_never_interleave() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = ["a", "b"]
            .into_iter()
            .map(|tag| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let mut batch = WriteBatch::new();
                    batch.delete_all();
                    for i in 0..50 {
                        batch.insert(titled(&format!("{tag}{i}")));
                    }
                    store.commit("portfolio_items", batch).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let docs = store.query_ordered("portfolio_items").unwrap();
        assert_eq!(docs.len(), 50);
        let first = docs[0].fields["title"].as_str().unwrap().chars().next();
        assert!(docs
            .iter()
            .all(|d| d.fields["title"].as_str().unwrap().chars().next() == first));
    }
}
