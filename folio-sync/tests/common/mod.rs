#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier, Mutex};

use folio_core::error::StoreError;
use folio_core::store::{CommitReceipt, Document, DocumentStore, Fields, MemoryStore, WriteBatch};
use folio_core::types::DocPath;
use folio_renderer::Invalidator;
use folio_sync::ContentSync;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Memory store whose reads or writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FlakyStore {
    fn check(&self, flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for FlakyStore {
    fn query_ordered(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.check(&self.fail_reads)?;
        self.inner.query_ordered(collection)
    }

    fn commit(&self, collection: &str, batch: WriteBatch) -> Result<CommitReceipt, StoreError> {
        self.check(&self.fail_writes)?;
        self.inner.commit(collection, batch)
    }

    fn get(&self, path: &DocPath) -> Result<Option<Fields>, StoreError> {
        self.check(&self.fail_reads)?;
        self.inner.get(path)
    }

    fn merge(&self, path: &DocPath, fields: Fields) -> Result<(), StoreError> {
        self.check(&self.fail_writes)?;
        self.inner.merge(path, fields)
    }

    fn merge_absent(&self, path: &DocPath, fields: Fields) -> Result<bool, StoreError> {
        self.check(&self.fail_writes)?;
        self.inner.merge_absent(path, fields)
    }
}

/// Memory store that can hold one read after it has been answered, so a test
/// can commit other writes before the reader sees the result.
pub struct PausingStore {
    inner: MemoryStore,
    armed: AtomicBool,
    barrier: Barrier,
}

impl Default for PausingStore {
    fn default() -> Self {
        PausingStore {
            inner: MemoryStore::new(),
            armed: AtomicBool::new(false),
            barrier: Barrier::new(2),
        }
    }
}

impl PausingStore {
    /// Hold the next `query_ordered` or `get`.
    pub fn pause_next_read(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Block until the held read has its answer.
    pub fn wait_for_read(&self) {
        self.barrier.wait();
    }

    /// Release the held read.
    pub fn resume(&self) {
        self.barrier.wait();
    }

    fn hold<T>(&self, answer: T) -> T {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.barrier.wait();
            self.barrier.wait();
        }
        answer
    }
}

impl DocumentStore for PausingStore {
    fn query_ordered(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let answer = self.inner.query_ordered(collection);
        self.hold(answer)
    }

    fn commit(&self, collection: &str, batch: WriteBatch) -> Result<CommitReceipt, StoreError> {
        self.inner.commit(collection, batch)
    }

    fn get(&self, path: &DocPath) -> Result<Option<Fields>, StoreError> {
        let answer = self.inner.get(path);
        self.hold(answer)
    }

    fn merge(&self, path: &DocPath, fields: Fields) -> Result<(), StoreError> {
        self.inner.merge(path, fields)
    }

    fn merge_absent(&self, path: &DocPath, fields: Fields) -> Result<bool, StoreError> {
        self.inner.merge_absent(path, fields)
    }
}

/// Records every invalidated route in call order.
#[derive(Default)]
pub struct RecordingInvalidator {
    routes: Mutex<Vec<String>>,
}

impl RecordingInvalidator {
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.routes.lock().unwrap())
    }
}

impl Invalidator for RecordingInvalidator {
    fn invalidate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

pub struct Harness {
    pub store: Arc<FlakyStore>,
    pub invalidator: Arc<RecordingInvalidator>,
    pub sync: ContentSync,
}

pub fn harness() -> Harness {
    init_logging();
    let store = Arc::new(FlakyStore::default());
    let invalidator = Arc::new(RecordingInvalidator::default());
    let sync = ContentSync::new(store.clone(), invalidator.clone());
    Harness { store, invalidator, sync }
}
