use std::ops::Range;
use std::time::{Duration, Instant};

use crate::state::state_machine::{GameEvent, GamePhase, GameStateMachine, InvalidTransition};

/// Kinds of hidden rewards a block can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardKind {
    /// Common reward, high value range.
    Coin,
    /// Uncommon reward.
    Gem,
    /// Rare reward, small values.
    Star,
    /// Very rare reward.
    Trophy,
    /// Rarest reward, value 1 or 2.
    Diamond,
}

impl RewardKind {
    /// Every reward kind, in display order.
    pub const ALL: [RewardKind; 5] = [
        RewardKind::Coin,
        RewardKind::Gem,
        RewardKind::Star,
        RewardKind::Trophy,
        RewardKind::Diamond,
    ];

    /// Half-open value range a reward of this kind is drawn from.
    pub fn value_range(self) -> Range<u32> {
        match self {
            RewardKind::Coin => 10..100,
            RewardKind::Gem => 5..50,
            RewardKind::Star => 1..10,
            RewardKind::Trophy => 1..5,
            RewardKind::Diamond => 1..3,
        }
    }

    /// Stable lowercase name used in payloads and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            RewardKind::Coin => "coin",
            RewardKind::Gem => "gem",
            RewardKind::Star => "star",
            RewardKind::Trophy => "trophy",
            RewardKind::Diamond => "diamond",
        }
    }
}

/// A hidden reward attached to one block for the duration of a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardBlock {
    /// Block carrying the reward (within the configured grid).
    pub block_id: u32,
    /// Kind of reward.
    pub kind: RewardKind,
    /// Value drawn from the kind's range.
    pub value: u32,
}

/// Mutable round data guarded by the single coordination lock in `AppState`.
///
/// Everything in here (phase, start instant, reward list, cached player
/// count) is only touched in short critical sections; delays, broadcasts,
/// and store calls always happen outside the lock.
#[derive(Debug)]
pub struct GameRound {
    machine: GameStateMachine,
    rewards: Vec<RewardBlock>,
    started_at: Option<Instant>,
    player_count: usize,
}

impl GameRound {
    /// Build a fresh round in the lobby phase with an initial reward set.
    pub fn new(rewards: Vec<RewardBlock>) -> Self {
        Self {
            machine: GameStateMachine::new(),
            rewards,
            started_at: None,
            player_count: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        self.machine.phase()
    }

    /// Reward blocks for the current round.
    pub fn rewards(&self) -> &[RewardBlock] {
        &self.rewards
    }

    /// Last-known distinct participant count.
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// Replace the cached participant count reported by the presence layer.
    pub fn set_player_count(&mut self, count: usize) {
        self.player_count = count;
    }

    /// Auto-start check-and-set: commit `WaitingForPlayers -> CountingDown`
    /// iff the cached count has reached the threshold.
    ///
    /// Returns whether *this* call committed the transition, so exactly one
    /// of any number of concurrent triggers launches the countdown.
    pub fn try_begin_countdown(&mut self, min_players: usize) -> bool {
        if self.player_count < min_players {
            return false;
        }
        self.machine.apply(GameEvent::PlayersReady).is_ok()
    }

    /// Open the claim window after the countdown, recording the start instant.
    pub fn begin_play(&mut self, now: Instant) -> Result<(), InvalidTransition> {
        self.machine.apply(GameEvent::CountdownFinished)?;
        self.started_at = Some(now);
        Ok(())
    }

    /// Watchdog check-and-set: commit `InProgress -> Revealing` iff the claim
    /// window has been open for at least `duration`.
    ///
    /// A tick that observes any other phase (or a window not yet expired)
    /// returns false and changes nothing.
    pub fn expire_if_due(&mut self, duration: Duration, now: Instant) -> bool {
        if self.machine.phase() != GamePhase::InProgress {
            return false;
        }
        let Some(started_at) = self.started_at else {
            return false;
        };
        if now.duration_since(started_at) < duration {
            return false;
        }
        self.machine.apply(GameEvent::DurationExpired).is_ok()
    }

    /// Seconds left in the claim window, if it is currently open.
    pub fn remaining(&self, duration: Duration, now: Instant) -> Option<Duration> {
        if self.machine.phase() != GamePhase::InProgress {
            return None;
        }
        let started_at = self.started_at?;
        Some(duration.saturating_sub(now.duration_since(started_at)))
    }

    /// Mark the reveal procedure as complete.
    pub fn finish_reveal(&mut self) -> Result<(), InvalidTransition> {
        self.machine.apply(GameEvent::RevealFinished)?;
        Ok(())
    }

    /// Return to the lobby with a freshly generated reward set.
    pub fn reset(&mut self, rewards: Vec<RewardBlock>) -> Result<(), InvalidTransition> {
        self.machine.apply(GameEvent::RoundReset)?;
        self.rewards = rewards;
        self.started_at = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reward(block_id: u32) -> RewardBlock {
        RewardBlock {
            block_id,
            kind: RewardKind::Coin,
            value: 42,
        }
    }

    #[test]
    fn auto_start_requires_threshold() {
        let mut round = GameRound::new(vec![reward(1)]);
        round.set_player_count(9);
        assert!(!round.try_begin_countdown(10));
        assert_eq!(round.phase(), GamePhase::WaitingForPlayers);

        round.set_player_count(10);
        assert!(round.try_begin_countdown(10));
        assert_eq!(round.phase(), GamePhase::CountingDown);
    }

    #[test]
    fn auto_start_commits_for_exactly_one_trigger() {
        let mut round = GameRound::new(vec![]);
        round.set_player_count(25);

        assert!(round.try_begin_countdown(10));
        // Concurrent triggers re-evaluating after the first commit are no-ops.
        assert!(!round.try_begin_countdown(10));
        assert!(!round.try_begin_countdown(10));
        assert_eq!(round.phase(), GamePhase::CountingDown);
    }

    #[test]
    fn expiry_fires_only_after_the_configured_duration() {
        let mut round = GameRound::new(vec![]);
        round.set_player_count(10);
        assert!(round.try_begin_countdown(10));

        let start = Instant::now();
        round.begin_play(start).unwrap();

        let duration = Duration::from_secs(60);
        assert!(!round.expire_if_due(duration, start + Duration::from_secs(59)));
        assert_eq!(round.phase(), GamePhase::InProgress);

        assert!(round.expire_if_due(duration, start + Duration::from_secs(60)));
        assert_eq!(round.phase(), GamePhase::Revealing);

        // A late tick no-ops once the phase has moved on.
        assert!(!round.expire_if_due(duration, start + Duration::from_secs(61)));
    }

    #[test]
    fn remaining_is_reported_only_while_in_progress() {
        let mut round = GameRound::new(vec![]);
        let duration = Duration::from_secs(60);
        assert_eq!(round.remaining(duration, Instant::now()), None);

        round.set_player_count(10);
        round.try_begin_countdown(10);
        let start = Instant::now();
        round.begin_play(start).unwrap();

        assert_eq!(
            round.remaining(duration, start + Duration::from_secs(15)),
            Some(Duration::from_secs(45))
        );
    }

    #[test]
    fn reset_installs_a_new_reward_set_and_clears_the_start_instant() {
        let mut round = GameRound::new(vec![reward(7)]);
        round.set_player_count(12);
        round.try_begin_countdown(10);
        round.begin_play(Instant::now()).unwrap();
        assert!(round.expire_if_due(Duration::ZERO, Instant::now()));
        round.finish_reveal().unwrap();

        round.reset(vec![reward(3), reward(9)]).unwrap();
        assert_eq!(round.phase(), GamePhase::WaitingForPlayers);
        assert_eq!(round.rewards().len(), 2);
        assert_eq!(round.remaining(Duration::from_secs(60), Instant::now()), None);
    }
}
