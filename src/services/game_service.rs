use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{error, info, warn};

use crate::{
    dto::game::GameStatusResponse,
    error::ServiceError,
    services::{reward_service, sse_events},
    state::{SharedState, game::RewardBlock, state_machine::GamePhase},
};

/// Period of the claim-window expiry check.
const WATCHDOG_INTERVAL: Duration = Duration::from_secs(1);
/// Spacing between countdown ticks.
const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

/// Replace the cached distinct participant count reported by presence.
pub async fn set_player_count(state: &SharedState, count: usize) {
    state.game().write().await.set_player_count(count);
}

/// Re-evaluate auto-start after a presence change.
///
/// The threshold check and the `WaitingForPlayers -> CountingDown` commit
/// are one critical section inside [`GameRound::try_begin_countdown`], and
/// only the caller that committed spawns the countdown, so any number of
/// concurrent presence callbacks start exactly one sequence.
///
/// [`GameRound::try_begin_countdown`]: crate::state::game::GameRound::try_begin_countdown
pub async fn notify_presence_changed(state: &SharedState) {
    let committed = {
        let mut round = state.game().write().await;
        round.try_begin_countdown(state.config().min_players)
    };

    if committed {
        info!(
            min_players = state.config().min_players,
            "participant threshold reached; starting countdown"
        );
        tokio::spawn(run_countdown(state.clone()));
    }
}

/// Whether claims are currently accepted; the gate consulted by the claim
/// handler before it touches the slot store.
pub async fn can_book_now(state: &SharedState) -> bool {
    state.phase().await == GamePhase::InProgress
}

/// Emit the countdown ticks one second apart, then open the claim window.
///
/// No lock is held across the delays; the window-opening commit happens in
/// its own short critical section once the final tick is out.
async fn run_countdown(state: SharedState) {
    let from = state.config().countdown_from;
    for remaining in (1..=from).rev() {
        sse_events::broadcast_countdown(&state, remaining);
        sleep(COUNTDOWN_STEP).await;
    }
    sse_events::broadcast_countdown(&state, 0);

    {
        let mut round = state.game().write().await;
        if let Err(err) = round.begin_play(Instant::now()) {
            warn!(error = %err, "countdown finished but the round moved on");
            return;
        }
    }

    sse_events::broadcast_game_started(&state);
}

/// Claim-window expiry watchdog.
///
/// Ticks every second; the elapsed check and the `InProgress -> Revealing`
/// commit form one critical section, so a tick that observes any other phase
/// is a no-op. A failing reveal is contained to its spawned task and never
/// stops the loop. Terminates cleanly on the shutdown signal.
pub async fn run_duration_watchdog(state: SharedState, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(WATCHDOG_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let expired = {
                    let mut round = state.game().write().await;
                    round.expire_if_due(state.config().game_duration(), Instant::now())
                };
                if expired {
                    info!("claim window elapsed; revealing rewards");
                    tokio::spawn(run_reveal(state.clone()));
                }
            }
            _ = shutdown.changed() => break,
        }
    }

    info!("duration watchdog stopped");
}

/// Reveal-and-reset sequence, spawned once per round by the watchdog.
async fn run_reveal(state: SharedState) {
    if let Err(err) = reveal_round(&state).await {
        error!(error = %err, "reveal failed; round parked in revealing phase");
        return;
    }

    sleep(state.config().reset_delay()).await;

    if let Err(err) = reset_round(&state).await {
        error!(error = %err, "post-round reset failed");
    }
}

/// Announce the end of the round, the reward list, and every winner.
async fn reveal_round(state: &SharedState) -> Result<(), ServiceError> {
    sse_events::broadcast_game_ended(state);

    let store = state.require_slot_store().await?;
    let claimed = store.snapshot().await?;
    let rewards: Vec<RewardBlock> = {
        let round = state.game().read().await;
        round.rewards().to_vec()
    };

    let winners: Vec<(String, RewardBlock)> = rewards
        .iter()
        .filter_map(|reward| {
            claimed
                .get(&reward.block_id)
                .map(|owner| (owner.clone(), reward.clone()))
        })
        .collect();

    sse_events::broadcast_rewards_revealed(state, &rewards);
    for (owner, reward) in &winners {
        sse_events::broadcast_winner(state, owner, reward);
    }

    {
        let mut round = state.game().write().await;
        round.finish_reveal()?;
    }

    Ok(())
}

/// Clear the board, regenerate rewards, and return to the lobby.
async fn reset_round(state: &SharedState) -> Result<(), ServiceError> {
    let store = state.require_slot_store().await?;
    store.reset_all().await?;

    let rewards = reward_service::generate(state.config().grid_size);
    {
        let mut round = state.game().write().await;
        round.reset(rewards)?;
    }

    sse_events::broadcast_game_reset(state);
    Ok(())
}

/// Assemble the status snapshot served by `GET /game`.
pub async fn round_status(state: &SharedState) -> Result<GameStatusResponse, ServiceError> {
    let store = state.require_slot_store().await?;
    let claimed = store.snapshot().await?;

    let (phase, players, reward_count, remaining) = {
        let round = state.game().read().await;
        (
            round.phase(),
            round.player_count(),
            round.rewards().len(),
            round.remaining(state.config().game_duration(), Instant::now()),
        )
    };

    Ok(GameStatusResponse::new(
        phase,
        players,
        reward_count,
        remaining.map(|left| left.as_secs()),
        claimed,
    ))
}
