use tracing::info;

use crate::{
    dto::booking::{ClaimRequest, ClaimResponse},
    error::ServiceError,
    services::{game_service, sse_events},
    state::SharedState,
};

/// Handle one claim attempt.
///
/// Checks the booking gate, then delegates the conflict decision to the
/// store's atomic set-if-absent. On success the claim is queued on the claim
/// feed (never blocking on the flush) and announced in the next coalesced
/// batch; the caller still learns the outcome synchronously.
pub async fn claim_block(
    state: &SharedState,
    block_id: u32,
    request: ClaimRequest,
) -> Result<ClaimResponse, ServiceError> {
    let grid_size = state.config().grid_size;
    if block_id < 1 || block_id > grid_size {
        return Err(ServiceError::InvalidInput(format!(
            "block id must be between 1 and {grid_size}"
        )));
    }

    let owner = request.name.trim().to_string();
    if owner.is_empty() {
        return Err(ServiceError::InvalidInput(
            "participant name must not be blank".into(),
        ));
    }

    if !game_service::can_book_now(state).await {
        return Err(ServiceError::InvalidState(
            "claims are only accepted while a round is in progress".into(),
        ));
    }

    let store = state.require_slot_store().await?;
    if !store.try_reserve(block_id, owner.clone()).await? {
        return Err(ServiceError::AlreadyClaimed(block_id));
    }

    state.claim_feed().queue(block_id, owner.clone());
    info!(block_id, owner = %owner, "block claimed");

    Ok(ClaimResponse { block_id, owner })
}

/// Operational reset: clear every reservation and announce the wipe.
///
/// Exposed outside the normal round flow for testing and incident recovery;
/// does not touch the round phase.
pub async fn reset_board(state: &SharedState) -> Result<(), ServiceError> {
    let store = state.require_slot_store().await?;
    store.reset_all().await?;
    sse_events::broadcast_game_reset(state);
    info!("board reset by administrative request");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    use crate::{
        config::AppConfig, dao::slot_store::memory::MemorySlotStore, state::AppState,
        state::SharedState,
    };

    async fn in_progress_state() -> SharedState {
        let state = AppState::new(AppConfig::default());
        state
            .install_slot_store(Arc::new(MemorySlotStore::new()))
            .await;
        {
            let mut round = state.game().write().await;
            round.set_player_count(10);
            assert!(round.try_begin_countdown(10));
            round.begin_play(Instant::now()).unwrap();
        }
        state
    }

    fn request(name: &str) -> ClaimRequest {
        ClaimRequest { name: name.into() }
    }

    #[tokio::test]
    async fn claims_are_rejected_outside_the_claim_window() {
        let state = AppState::new(AppConfig::default());
        state
            .install_slot_store(Arc::new(MemorySlotStore::new()))
            .await;

        let err = claim_block(&state, 5, request("alice")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn out_of_range_ids_and_blank_names_are_invalid_input() {
        let state = in_progress_state().await;

        assert!(matches!(
            claim_block(&state, 0, request("alice")).await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            claim_block(&state, 101, request("alice")).await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            claim_block(&state, 5, request("   ")).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn second_claim_on_the_same_block_is_a_conflict() {
        let state = in_progress_state().await;

        let response = claim_block(&state, 5, request("alice")).await.unwrap();
        assert_eq!(response.owner, "alice");

        let err = claim_block(&state, 5, request("bob")).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyClaimed(5)));

        let snapshot = state
            .require_slot_store()
            .await
            .unwrap()
            .snapshot()
            .await
            .unwrap();
        assert_eq!(snapshot.get(&5).map(String::as_str), Some("alice"));
    }

    #[tokio::test]
    async fn successful_claims_are_queued_for_the_next_batch() {
        let state = in_progress_state().await;

        claim_block(&state, 8, request("alice")).await.unwrap();
        claim_block(&state, 9, request(" bob ")).await.unwrap();

        let mut rx = state.claim_feed().take_receiver().await.unwrap();
        let first = rx.try_recv().unwrap();
        assert_eq!((first.block_id, first.owner.as_str()), (8, "alice"));
        // Names are trimmed before they reach the store or the feed.
        let second = rx.try_recv().unwrap();
        assert_eq!((second.block_id, second.owner.as_str()), (9, "bob"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn rejected_claims_queue_nothing() {
        let state = in_progress_state().await;

        claim_block(&state, 5, request("alice")).await.unwrap();
        let _ = claim_block(&state, 5, request("bob")).await;

        let mut rx = state.claim_feed().take_receiver().await.unwrap();
        assert_eq!(rx.try_recv().unwrap().owner, "alice");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn reset_board_clears_the_store_and_announces_it() {
        let state = in_progress_state().await;
        let mut events = state.public_sse().subscribe();

        claim_block(&state, 5, request("alice")).await.unwrap();
        reset_board(&state).await.unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("game.reset"));
        let snapshot = state
            .require_slot_store()
            .await
            .unwrap()
            .snapshot()
            .await
            .unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn degraded_mode_claims_are_unavailable() {
        let state = AppState::new(AppConfig::default());
        {
            let mut round = state.game().write().await;
            round.set_player_count(10);
            assert!(round.try_begin_countdown(10));
            round.begin_play(Instant::now()).unwrap();
        }

        let err = claim_block(&state, 5, request("alice")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }
}
