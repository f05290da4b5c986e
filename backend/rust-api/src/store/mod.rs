//! Per-service persistence.
//!
//! Each service owns exactly one [`ResourceStore`] for its entity type. The
//! store assigns ids from the entity's own sequence and gives every single
//! operation its own isolation; callers add no locking on top.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// A record owned by exactly one service.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    /// Mongo collection name.
    const COLLECTION: &'static str;
    /// Wire name of the id field, also used as the mongo key.
    const ID_FIELD: &'static str;
    /// First id handed out by a fresh store.
    const ID_START: i64;

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

#[async_trait]
pub trait ResourceStore<T: Entity>: Send + Sync {
    /// Persists `entity` under the next id of the sequence and returns it.
    async fn insert(&self, entity: T) -> anyhow::Result<T>;

    async fn get(&self, id: i64) -> anyhow::Result<Option<T>>;

    /// All records in id order.
    async fn list(&self) -> anyhow::Result<Vec<T>>;

    /// Replaces the stored record with the same id. `None` if there was none.
    async fn update(&self, entity: T) -> anyhow::Result<Option<T>>;

    /// Whether a record was actually removed.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;

    /// Records whose wire field `field` equals `value`, in id order.
    async fn find_by(&self, field: &str, value: serde_json::Value) -> anyhow::Result<Vec<T>>;
}
