use std::marker::PhantomData;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, Bson, Document},
    options::ReturnDocument,
    Collection, Database,
};

use super::{Entity, ResourceStore};
use crate::metrics::track_store_operation;
use crate::utils::retry::{retry, Backoff};

const COUNTERS: &str = "counters";

/// Opens the service database and waits for it to answer a ping.
pub async fn connect(uri: &str, database: &str) -> anyhow::Result<Database> {
    let client = mongodb::Client::with_uri_str(uri)
        .await
        .context("Failed to parse MongoDB connection string")?;
    let db = client.database(database);

    retry(Backoff::startup(), || {
        let db = db.clone();
        async move {
            db.run_command(doc! { "ping": 1 }).await.inspect_err(|e| {
                tracing::warn!(error = %e, "MongoDB ping failed, retrying");
            })
        }
    })
    .await
    .context("MongoDB did not answer ping")?;

    tracing::info!(database, "Connected to MongoDB");
    Ok(db)
}

/// One collection per entity; the id lives in the entity's own id field and
/// comes from a per-collection counter document.
pub struct MongoStore<T: Entity> {
    collection: Collection<T>,
    counters: Collection<Document>,
    _entity: PhantomData<T>,
}

impl<T: Entity> MongoStore<T> {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<T>(T::COLLECTION),
            counters: db.collection::<Document>(COUNTERS),
            _entity: PhantomData,
        }
    }

    fn id_filter(id: i64) -> Document {
        let mut filter = Document::new();
        filter.insert(T::ID_FIELD, id);
        filter
    }

    async fn next_id(&self) -> anyhow::Result<i64> {
        let counter = self
            .counters
            .find_one_and_update(doc! { "_id": T::COLLECTION }, doc! { "$inc": { "seq": 1_i64 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .with_context(|| format!("Failed to advance id sequence for {}", T::COLLECTION))?
            .ok_or_else(|| anyhow!("Counter for {} missing after upsert", T::COLLECTION))?;

        let seq = match counter.get("seq") {
            Some(Bson::Int64(n)) => *n,
            Some(Bson::Int32(n)) => i64::from(*n),
            other => return Err(anyhow!("Unexpected counter value: {:?}", other)),
        };
        Ok(T::ID_START + seq - 1)
    }
}

#[async_trait]
impl<T: Entity> ResourceStore<T> for MongoStore<T> {
    async fn insert(&self, mut entity: T) -> anyhow::Result<T> {
        track_store_operation("insert", T::COLLECTION, async move {
            let id = self.next_id().await?;
            entity.set_id(id);
            self.collection
                .insert_one(&entity)
                .await
                .with_context(|| format!("Failed to insert into {}", T::COLLECTION))?;
            Ok(entity)
        })
        .await
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<T>> {
        track_store_operation("find_one", T::COLLECTION, async {
            self.collection
                .find_one(Self::id_filter(id))
                .await
                .with_context(|| format!("Failed to load {} {}", T::COLLECTION, id))
        })
        .await
    }

    async fn list(&self) -> anyhow::Result<Vec<T>> {
        track_store_operation("find", T::COLLECTION, async {
            let mut sort = Document::new();
            sort.insert(T::ID_FIELD, 1);
            let cursor = self
                .collection
                .find(doc! {})
                .sort(sort)
                .await
                .with_context(|| format!("Failed to query {}", T::COLLECTION))?;
            cursor
                .try_collect()
                .await
                .with_context(|| format!("Failed to read {} cursor", T::COLLECTION))
        })
        .await
    }

    async fn update(&self, entity: T) -> anyhow::Result<Option<T>> {
        track_store_operation("replace_one", T::COLLECTION, async move {
            let id = entity.id();
            let result = self
                .collection
                .replace_one(Self::id_filter(id), &entity)
                .await
                .with_context(|| format!("Failed to update {} {}", T::COLLECTION, id))?;
            Ok((result.matched_count > 0).then_some(entity))
        })
        .await
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        track_store_operation("delete_one", T::COLLECTION, async {
            let result = self
                .collection
                .delete_one(Self::id_filter(id))
                .await
                .with_context(|| format!("Failed to delete {} {}", T::COLLECTION, id))?;
            Ok(result.deleted_count > 0)
        })
        .await
    }

    async fn find_by(&self, field: &str, value: serde_json::Value) -> anyhow::Result<Vec<T>> {
        track_store_operation("find", T::COLLECTION, async {
            let mut filter = Document::new();
            filter.insert(field, to_bson(&value).context("Unsupported filter value")?);
            let mut sort = Document::new();
            sort.insert(T::ID_FIELD, 1);
            let cursor = self
                .collection
                .find(filter)
                .sort(sort)
                .await
                .with_context(|| format!("Failed to query {} by {}", T::COLLECTION, field))?;
            cursor
                .try_collect()
                .await
                .with_context(|| format!("Failed to read {} cursor", T::COLLECTION))
        })
        .await
    }
}
