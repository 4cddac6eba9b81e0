use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        game::RewardBlockSummary,
        sse::{
            BatchClaimEvent, BlockClaim, CountdownEvent, GameEndedEvent, GameResetEvent,
            GameStartedEvent, PresenceRosterEvent, RewardsRevealedEvent, ServerEvent, WinnerEvent,
        },
    },
    state::{SharedState, feed::PendingUpdate, game::RewardBlock},
};

const EVENT_BLOCK_BATCH: &str = "block.batch";
const EVENT_COUNTDOWN: &str = "game.countdown";
const EVENT_GAME_STARTED: &str = "game.started";
const EVENT_GAME_ENDED: &str = "game.ended";
const EVENT_REWARDS_REVEALED: &str = "game.rewards";
const EVENT_WINNER: &str = "game.winner";
const EVENT_GAME_RESET: &str = "game.reset";
const EVENT_PRESENCE_ROSTER: &str = "presence.roster";

/// Broadcast one coalesced batch of accepted claims, in queue order.
pub fn broadcast_batch_claim(state: &SharedState, updates: &[PendingUpdate]) {
    let payload = BatchClaimEvent {
        claims: updates
            .iter()
            .map(|update| BlockClaim {
                block_id: update.block_id,
                owner: update.owner.clone(),
            })
            .collect(),
    };
    send_public_event(state, EVENT_BLOCK_BATCH, &payload);
}

/// Broadcast one countdown tick.
pub fn broadcast_countdown(state: &SharedState, remaining: u8) {
    let payload = CountdownEvent { remaining };
    send_public_event(state, EVENT_COUNTDOWN, &payload);
}

/// Broadcast that the claim window has opened.
pub fn broadcast_game_started(state: &SharedState) {
    send_public_event(state, EVENT_GAME_STARTED, &GameStartedEvent {});
}

/// Broadcast that the claim window has closed.
pub fn broadcast_game_ended(state: &SharedState) {
    send_public_event(state, EVENT_GAME_ENDED, &GameEndedEvent {});
}

/// Broadcast the full reward list of the finished round.
pub fn broadcast_rewards_revealed(state: &SharedState, rewards: &[RewardBlock]) {
    let payload = RewardsRevealedEvent {
        rewards: rewards.iter().map(RewardBlockSummary::from).collect(),
    };
    send_public_event(state, EVENT_REWARDS_REVEALED, &payload);
}

/// Broadcast one winner announcement.
pub fn broadcast_winner(state: &SharedState, owner: &str, reward: &RewardBlock) {
    let payload = WinnerEvent {
        owner: owner.to_string(),
        reward: reward.into(),
    };
    send_public_event(state, EVENT_WINNER, &payload);
}

/// Broadcast that the board has been cleared for the next round.
pub fn broadcast_game_reset(state: &SharedState) {
    send_public_event(state, EVENT_GAME_RESET, &GameResetEvent {});
}

/// Broadcast the distinct participant roster.
pub fn broadcast_presence_roster(state: &SharedState, players: &[String]) {
    let payload = PresenceRosterEvent {
        players: players.to_vec(),
    };
    send_public_event(state, EVENT_PRESENCE_ROSTER, &payload);
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}
