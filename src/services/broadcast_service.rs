use tokio::sync::{mpsc, watch};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use crate::{
    services::sse_events,
    state::{SharedState, feed::PendingUpdate},
};

/// Coalescing flush loop for accepted claims.
///
/// Every flush interval the loop atomically drains everything queued on the
/// claim feed and emits at most one `block.batch` event: nothing when the
/// queue was empty, one batch carrying every drained item otherwise. Each
/// queued item therefore appears in exactly one batch.
///
/// On the shutdown signal the loop performs one final best-effort drain and
/// exits; claims queued after that point are dropped.
pub async fn run(state: SharedState, mut shutdown: watch::Receiver<bool>) {
    let Some(mut receiver) = state.claim_feed().take_receiver().await else {
        warn!("claim feed receiver already taken; broadcaster not started");
        return;
    };

    let mut ticker = interval(state.config().flush_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                flush(&state, &mut receiver);
            }
            _ = shutdown.changed() => {
                flush(&state, &mut receiver);
                break;
            }
        }
    }

    info!("claim broadcaster stopped");
}

/// Drain the queue into one batch and broadcast it unless empty.
fn flush(state: &SharedState, receiver: &mut mpsc::UnboundedReceiver<PendingUpdate>) {
    let mut batch = Vec::new();
    while let Ok(update) = receiver.try_recv() {
        batch.push(update);
    }

    if batch.is_empty() {
        return;
    }

    sse_events::broadcast_batch_claim(state, &batch);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::sync::broadcast::error::TryRecvError;

    use crate::{config::AppConfig, state::AppState};

    fn test_state() -> SharedState {
        AppState::new(AppConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn claims_in_one_window_flush_as_a_single_batch() {
        let state = test_state();
        let mut events = state.public_sse().subscribe();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        // Queue before the loop's first tick so all five share a window.
        for (id, owner) in [(1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e")] {
            state.claim_feed().queue(id, owner);
        }

        tokio::spawn(run(state.clone(), shutdown_rx));

        let event = events.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("block.batch"));
        let payload: serde_json::Value = serde_json::from_str(&event.data).unwrap();
        let claims = payload["claims"].as_array().unwrap();
        assert_eq!(claims.len(), 5);
        assert_eq!(claims[0]["block_id"], 1);
        assert_eq!(claims[4]["owner"], "e");

        // Later ticks must not repeat any of them.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_windows_produce_no_broadcast() {
        let state = test_state();
        let mut events = state.public_sse().subscribe();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(run(state.clone(), shutdown_rx));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn later_claims_land_in_a_later_batch_without_duplication() {
        let state = test_state();
        let mut events = state.public_sse().subscribe();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        state.claim_feed().queue(10, "early");
        tokio::spawn(run(state.clone(), shutdown_rx));

        let first = events.recv().await.unwrap();
        let payload: serde_json::Value = serde_json::from_str(&first.data).unwrap();
        assert_eq!(payload["claims"].as_array().unwrap().len(), 1);

        state.claim_feed().queue(20, "late");
        let second = events.recv().await.unwrap();
        let payload: serde_json::Value = serde_json::from_str(&second.data).unwrap();
        let claims = payload["claims"].as_array().unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0]["block_id"], 20);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drains_pending_claims_once() {
        let state = test_state();
        let mut events = state.public_sse().subscribe();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run(state.clone(), shutdown_rx));
        // Let the loop consume its immediate first tick.
        tokio::time::sleep(Duration::from_millis(10)).await;

        state.claim_feed().queue(7, "straggler");
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        let event = events.recv().await.unwrap();
        let payload: serde_json::Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(payload["claims"][0]["block_id"], 7);
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }
}
