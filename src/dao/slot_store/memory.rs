use std::{collections::HashMap, sync::Arc};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;

use crate::dao::{slot_store::SlotStore, storage::StorageResult};

/// In-process slot store backed by a concurrent map.
///
/// The default backend: used by tests and by deployments that do not need
/// reservations to survive a restart. Reservation atomicity comes from the
/// map's per-entry locking; different ids never contend on a shared lock.
#[derive(Clone, Default)]
pub struct MemorySlotStore {
    blocks: Arc<DashMap<u32, String>>,
}

impl MemorySlotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn reserve(&self, block_id: u32, owner: String) -> bool {
        // Entry holds the shard lock for this key across check and insert,
        // making the reservation a true set-if-absent.
        match self.blocks.entry(block_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(owner);
                true
            }
        }
    }
}

impl SlotStore for MemorySlotStore {
    fn try_reserve(&self, block_id: u32, owner: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.reserve(block_id, owner)) })
    }

    fn snapshot(&self) -> BoxFuture<'static, StorageResult<HashMap<u32, String>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .blocks
                .iter()
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect())
        })
    }

    fn reset_all(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.blocks.clear();
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
