use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::ApplicationRecord;

/// Injected repository for enrollment applications.
///
/// The engine imposes no concurrency discipline on the store; any locking or
/// transactional behavior is the implementation's responsibility.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, record: ApplicationRecord) -> Result<(), StoreError>;
    async fn fetch(&self, id: Uuid) -> Result<Option<ApplicationRecord>, StoreError>;
}

/// Process-memory store for tests and demos.
#[derive(Default)]
pub struct InMemoryApplicationStore {
    records: RwLock<HashMap<Uuid, ApplicationRecord>>,
}

impl InMemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn insert(&self, record: ApplicationRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(StoreError::Duplicate(record.id));
        }
        records.insert(record.id, record);
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<ApplicationRecord>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }
}
