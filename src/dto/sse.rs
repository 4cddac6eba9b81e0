use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::game::RewardBlockSummary;

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Serialized data field.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// One accepted claim; element of [`BatchClaimEvent`].
pub struct BlockClaim {
    /// Block that was claimed.
    pub block_id: u32,
    /// Participant that claimed it.
    pub owner: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Coalesced broadcast of every claim accepted since the previous flush.
pub struct BatchClaimEvent {
    /// Accepted claims in queue order.
    pub claims: Vec<BlockClaim>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Pre-round countdown tick (3, 2, 1, 0).
pub struct CountdownEvent {
    /// Seconds remaining before the claim window opens.
    pub remaining: u8,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the claim window opens.
pub struct GameStartedEvent {}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the claim window closes.
pub struct GameEndedEvent {}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the board has been cleared for the next round.
pub struct GameResetEvent {}

#[derive(Debug, Serialize, ToSchema)]
/// The full reward list, published once the round ends.
pub struct RewardsRevealedEvent {
    /// Every reward block of the finished round.
    pub rewards: Vec<RewardBlockSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
/// One winner announcement, emitted per matched reward block.
pub struct WinnerEvent {
    /// Participant that claimed the rewarded block.
    pub owner: String,
    /// The reward they won.
    pub reward: RewardBlockSummary,
}

#[derive(Debug, Serialize, ToSchema)]
/// Distinct names of currently connected participants.
pub struct PresenceRosterEvent {
    /// Sorted distinct participant names.
    pub players: Vec<String>,
}
