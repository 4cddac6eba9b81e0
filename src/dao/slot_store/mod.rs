pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::collections::HashMap;

use futures::future::BoxFuture;

use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer holding block reservations.
///
/// `try_reserve` is the only mutation path during a round and must be a
/// per-id atomic set-if-absent: under arbitrary concurrent callers for the
/// same block exactly one succeeds. Backends must not serialize reservations
/// for different ids through one coarse lock, and must not cache reservations
/// in-process in a way that could diverge from the backing store.
pub trait SlotStore: Send + Sync {
    /// Record `owner` for `block_id` iff the block is unclaimed.
    ///
    /// Returns `true` when this call claimed the block, `false` (with no
    /// mutation) when it was already taken. Callers validate the id range
    /// and owner before calling.
    fn try_reserve(&self, block_id: u32, owner: String) -> BoxFuture<'static, StorageResult<bool>>;

    /// Map of every currently claimed block to its owner.
    ///
    /// Not necessarily an atomic point-in-time view, but always includes
    /// every reservation that completed before the call started.
    fn snapshot(&self) -> BoxFuture<'static, StorageResult<HashMap<u32, String>>>;

    /// Clear every reservation; subsequent `try_reserve` calls succeed again.
    fn reset_all(&self) -> BoxFuture<'static, StorageResult<()>>;

    /// Cheap connectivity probe used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;

    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
