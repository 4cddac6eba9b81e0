use std::{collections::HashMap, sync::Arc};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, bson::doc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
};
use crate::dao::{slot_store::SlotStore, storage::StorageResult};

const BLOCK_COLLECTION_NAME: &str = "blocks";

/// One claimed block, keyed by its id.
///
/// Unclaimed blocks have no document, so the conditional upsert in
/// [`MongoSlotStore::reserve`] is the whole reservation protocol: the first
/// writer inserts, every later writer matches the existing document and
/// leaves it untouched.
#[derive(Debug, Serialize, Deserialize)]
struct BlockDocument {
    #[serde(rename = "_id")]
    block_id: i32,
    owner: String,
}

/// MongoDB-backed slot store (feature `mongo-store`).
#[derive(Clone)]
pub struct MongoSlotStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    // Kept alongside the database handle so a reconnect can swap both.
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoSlotStore {
    /// Establish a connection to MongoDB, retrying the bootstrap ping.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        Ok(Self { inner })
    }

    async fn collection(&self) -> Collection<BlockDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<BlockDocument>(BLOCK_COLLECTION_NAME)
    }

    async fn reserve(&self, block_id: u32, owner: String) -> MongoResult<bool> {
        let collection = self.collection().await;

        // Filtered upsert with $setOnInsert: the server inserts the document
        // iff no document with this _id exists, atomically. A plain match
        // (block already claimed) modifies nothing and reports no upsert.
        let result = collection
            .update_one(
                doc! { "_id": block_id as i32 },
                doc! { "$setOnInsert": { "owner": &owner } },
            )
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Reserve { block_id, source })?;

        Ok(result.upserted_id.is_some())
    }

    async fn snapshot(&self) -> MongoResult<HashMap<u32, String>> {
        let collection = self.collection().await;

        let documents: Vec<BlockDocument> = collection
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::Snapshot { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Snapshot { source })?;

        Ok(documents
            .into_iter()
            .map(|doc| (doc.block_id as u32, doc.owner))
            .collect())
    }

    async fn reset_all(&self) -> MongoResult<()> {
        let collection = self.collection().await;
        collection
            .delete_many(doc! {})
            .await
            .map_err(|source| MongoDaoError::Reset { source })?;
        Ok(())
    }
}

impl SlotStore for MongoSlotStore {
    fn try_reserve(&self, block_id: u32, owner: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.reserve(block_id, owner).await.map_err(Into::into) })
    }

    fn snapshot(&self) -> BoxFuture<'static, StorageResult<HashMap<u32, String>>> {
        let store = self.clone();
        Box::pin(async move { store.snapshot().await.map_err(Into::into) })
    }

    fn reset_all(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.reset_all().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
