use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Entity, ResourceStore};

/// Process-local store. Ids are never reused, even after a delete.
pub struct MemoryStore<T: Entity> {
    rows: RwLock<BTreeMap<i64, T>>,
    next_id: AtomicI64,
    _entity: PhantomData<T>,
}

impl<T: Entity> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(T::ID_START),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> ResourceStore<T> for MemoryStore<T> {
    async fn insert(&self, mut entity: T) -> anyhow::Result<T> {
        let mut rows = self.rows.write().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        entity.set_id(id);
        rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<T>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<T>> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn update(&self, entity: T) -> anyhow::Result<Option<T>> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&entity.id()) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }

    async fn find_by(&self, field: &str, value: serde_json::Value) -> anyhow::Result<Vec<T>> {
        let rows = self.rows.read().await;
        let mut matches = Vec::new();
        for row in rows.values() {
            let json = serde_json::to_value(row)?;
            if json.get(field) == Some(&value) {
                matches.push(row.clone());
            }
        }
        Ok(matches)
    }
}
