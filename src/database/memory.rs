use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{ProfileRecord, ProfileUpdate};
use crate::database::repository::ProfileStore;

/// In-process profile store with the same semantics as the Postgres one.
///
/// Counts every statement it serves so callers can assert that a request
/// never reached storage. `set_unavailable(true)` makes every call fail
/// like a dropped connection.
#[derive(Default)]
pub struct MemoryProfileStore {
    rows: RwLock<HashMap<Uuid, ProfileRecord>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row directly, bypassing the statement counters
    pub async fn insert(&self, record: ProfileRecord) {
        self.rows.write().await.insert(record.id, record);
    }

    pub async fn get(&self, id: Uuid) -> Option<ProfileRecord> {
        self.rows.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Total statements served, reads and writes together
    pub fn statements(&self) -> usize {
        self.reads() + self.writes()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DatabaseError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<ProfileRecord>, DatabaseError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn upsert(&self, id: Uuid, update: &ProfileUpdate) -> Result<u64, DatabaseError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let mut rows = self.rows.write().await;
        let record = rows.entry(id).or_insert_with(|| ProfileRecord::empty(id));
        update.apply_to(record);
        Ok(1)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check_available()
    }
}
