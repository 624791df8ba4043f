use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::contact_store::{ContactStore, StoreError};
use crate::models::Contact;

/// In-memory contact store. Backs the test suite and a database-free
/// development mode; identifier assignment mirrors the SQL store.
pub struct MemoryContactStore {
    rows: RwLock<BTreeMap<i64, Contact>>,
    next_id: AtomicI64,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryContactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn find_all(&self) -> Result<Vec<Contact>, StoreError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Contact>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn save(&self, contact: Contact) -> Result<Contact, StoreError> {
        let mut rows = self.rows.write().await;
        let id = match contact.id {
            None => self.next_id.fetch_add(1, Ordering::SeqCst),
            Some(id) => {
                // Keep the counter ahead of explicitly supplied ids.
                self.next_id.fetch_max(id + 1, Ordering::SeqCst);
                id
            }
        };
        let stored = Contact { id: Some(id), ..contact };
        rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.rows.write().await.remove(&id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.rows.write().await.clear();
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
