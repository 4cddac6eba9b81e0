use tokio::sync::{Mutex, mpsc};

/// A claim accepted by the store but not yet announced to clients.
///
/// Consumed exactly once by the next flush of the claim broadcaster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    /// Block that was claimed.
    pub block_id: u32,
    /// Participant that claimed it.
    pub owner: String,
}

/// Pending-update queue between claim handlers and the coalescing flush loop.
///
/// Enqueueing never blocks and never waits on the flush: the queue is an
/// unbounded channel whose receiver the broadcaster claims once at startup.
pub struct ClaimFeed {
    tx: mpsc::UnboundedSender<PendingUpdate>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<PendingUpdate>>>,
}

impl ClaimFeed {
    /// Build the feed with its receiver parked until the flush loop starts.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    /// Queue a claim for the next batched broadcast.
    ///
    /// Updates queued after the flush loop has shut down are dropped; that is
    /// the documented best-effort window during shutdown.
    pub fn queue(&self, block_id: u32, owner: impl Into<String>) {
        let _ = self.tx.send(PendingUpdate {
            block_id,
            owner: owner.into(),
        });
    }

    /// Hand the receiver to the flush loop. Returns `None` if already taken.
    pub async fn take_receiver(&self) -> Option<mpsc::UnboundedReceiver<PendingUpdate>> {
        self.rx.lock().await.take()
    }
}

impl Default for ClaimFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_updates_arrive_in_enqueue_order() {
        let feed = ClaimFeed::new();
        feed.queue(5, "alice");
        feed.queue(9, "bob");

        let mut rx = feed.take_receiver().await.unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            PendingUpdate {
                block_id: 5,
                owner: "alice".into()
            }
        );
        assert_eq!(rx.try_recv().unwrap().block_id, 9);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn receiver_can_only_be_taken_once() {
        let feed = ClaimFeed::new();
        assert!(feed.take_receiver().await.is_some());
        assert!(feed.take_receiver().await.is_none());
    }

    #[tokio::test]
    async fn queueing_after_receiver_drop_is_a_silent_no_op() {
        let feed = ClaimFeed::new();
        drop(feed.take_receiver().await);
        feed.queue(1, "late");
    }
}
