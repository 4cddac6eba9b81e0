use std::collections::HashMap;
use std::time::SystemTime;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::format_system_time,
    state::{
        game::RewardBlock,
        state_machine::GamePhase,
    },
};

/// Wire representation of the round phase.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GamePhaseDto {
    /// Lobby, waiting for the participant threshold.
    WaitingForPlayers,
    /// Countdown running.
    CountingDown,
    /// Claim window open.
    InProgress,
    /// Winners being announced.
    Revealing,
    /// Round over, reset pending.
    Finished,
}

impl From<GamePhase> for GamePhaseDto {
    fn from(phase: GamePhase) -> Self {
        match phase {
            GamePhase::WaitingForPlayers => GamePhaseDto::WaitingForPlayers,
            GamePhase::CountingDown => GamePhaseDto::CountingDown,
            GamePhase::InProgress => GamePhaseDto::InProgress,
            GamePhase::Revealing => GamePhaseDto::Revealing,
            GamePhase::Finished => GamePhaseDto::Finished,
        }
    }
}

/// Wire representation of a reward block.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RewardBlockSummary {
    /// Block carrying the reward.
    pub block_id: u32,
    /// Reward kind name (`coin`, `gem`, `star`, `trophy`, `diamond`).
    pub kind: String,
    /// Reward value.
    pub value: u32,
}

impl From<&RewardBlock> for RewardBlockSummary {
    fn from(reward: &RewardBlock) -> Self {
        Self {
            block_id: reward.block_id,
            kind: reward.kind.as_str().to_string(),
            value: reward.value,
        }
    }
}

/// Snapshot of the running round returned by `GET /game`.
///
/// Reward positions stay hidden until the reveal; only the count is exposed.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameStatusResponse {
    /// Current round phase.
    pub phase: GamePhaseDto,
    /// Last-known distinct participant count.
    pub players: usize,
    /// Number of hidden rewards in this round.
    pub reward_count: usize,
    /// Seconds left in the claim window, while one is open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<u64>,
    /// Every claimed block and its owner.
    pub claimed: HashMap<u32, String>,
    /// Server timestamp of this snapshot (RFC 3339).
    pub generated_at: String,
}

impl GameStatusResponse {
    /// Assemble a status snapshot stamped with the current server time.
    pub fn new(
        phase: GamePhase,
        players: usize,
        reward_count: usize,
        remaining_secs: Option<u64>,
        claimed: HashMap<u32, String>,
    ) -> Self {
        Self {
            phase: phase.into(),
            players,
            reward_count,
            remaining_secs,
            claimed,
            generated_at: format_system_time(SystemTime::now()),
        }
    }
}
