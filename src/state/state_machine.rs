use thiserror::Error;

/// Phases a round moves through, from the lobby to the post-reveal reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Lobby: waiting for enough participants to connect.
    WaitingForPlayers,
    /// The 3-2-1-0 countdown is running; claims are not accepted yet.
    CountingDown,
    /// The claim window is open.
    InProgress,
    /// The claim window closed; winners are being computed and announced.
    Revealing,
    /// Winners announced; the round resets after a fixed delay.
    Finished,
}

/// Events that can be applied to the round state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The distinct-participant threshold was reached in the lobby.
    PlayersReady,
    /// The countdown sequence emitted its final tick.
    CountdownFinished,
    /// The claim window exceeded the configured round duration.
    DurationExpired,
    /// The reveal procedure announced every winner.
    RevealFinished,
    /// The post-reveal reset cleared the board and regenerated rewards.
    RoundReset,
}

/// Error returned when an event is not valid in the current phase.
///
/// Background triggers (auto-start evaluation, the duration watchdog) treat
/// this as a no-op: a second concurrent trigger simply observes that the
/// phase has already advanced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the event was rejected.
    pub from: GamePhase,
    /// The event that cannot be applied from this phase.
    pub event: GameEvent,
}

/// Round state machine implementing the claim-window lifecycle.
///
/// The machine itself is pure; callers hold it behind the round coordination
/// lock and keep each `apply` inside a short critical section so validation
/// and commit form a single atomic step.
#[derive(Debug, Clone)]
pub struct GameStateMachine {
    phase: GamePhase,
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self {
            phase: GamePhase::WaitingForPlayers,
        }
    }
}

impl GameStateMachine {
    /// Create a new state machine initialised in the lobby phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Validate and commit a transition in one step, returning the new phase.
    pub fn apply(&mut self, event: GameEvent) -> Result<GamePhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (GamePhase::WaitingForPlayers, GameEvent::PlayersReady) => GamePhase::CountingDown,
            (GamePhase::CountingDown, GameEvent::CountdownFinished) => GamePhase::InProgress,
            (GamePhase::InProgress, GameEvent::DurationExpired) => GamePhase::Revealing,
            (GamePhase::Revealing, GameEvent::RevealFinished) => GamePhase::Finished,
            (GamePhase::Finished, GameEvent::RoundReset) => GamePhase::WaitingForPlayers,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        self.phase = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(sm: &mut GameStateMachine, event: GameEvent) -> GamePhase {
        sm.apply(event).unwrap()
    }

    #[test]
    fn initial_state_is_waiting_for_players() {
        let sm = GameStateMachine::new();
        assert_eq!(sm.phase(), GamePhase::WaitingForPlayers);
    }

    #[test]
    fn full_round_cycle() {
        let mut sm = GameStateMachine::new();

        assert_eq!(
            apply(&mut sm, GameEvent::PlayersReady),
            GamePhase::CountingDown
        );
        assert_eq!(
            apply(&mut sm, GameEvent::CountdownFinished),
            GamePhase::InProgress
        );
        assert_eq!(
            apply(&mut sm, GameEvent::DurationExpired),
            GamePhase::Revealing
        );
        assert_eq!(
            apply(&mut sm, GameEvent::RevealFinished),
            GamePhase::Finished
        );
        assert_eq!(
            apply(&mut sm, GameEvent::RoundReset),
            GamePhase::WaitingForPlayers
        );
    }

    #[test]
    fn lobby_cannot_jump_straight_into_progress() {
        let mut sm = GameStateMachine::new();
        let err = sm.apply(GameEvent::CountdownFinished).unwrap_err();
        assert_eq!(err.from, GamePhase::WaitingForPlayers);
        assert_eq!(err.event, GameEvent::CountdownFinished);
        assert_eq!(sm.phase(), GamePhase::WaitingForPlayers);
    }

    #[test]
    fn finished_cannot_restart_without_reset() {
        let mut sm = GameStateMachine::new();
        apply(&mut sm, GameEvent::PlayersReady);
        apply(&mut sm, GameEvent::CountdownFinished);
        apply(&mut sm, GameEvent::DurationExpired);
        apply(&mut sm, GameEvent::RevealFinished);

        let err = sm.apply(GameEvent::PlayersReady).unwrap_err();
        assert_eq!(err.from, GamePhase::Finished);
        assert_eq!(sm.phase(), GamePhase::Finished);
    }

    #[test]
    fn duplicate_trigger_is_rejected_without_corrupting_phase() {
        let mut sm = GameStateMachine::new();
        apply(&mut sm, GameEvent::PlayersReady);

        // A second auto-start trigger arriving after the first committed.
        assert!(sm.apply(GameEvent::PlayersReady).is_err());
        assert_eq!(sm.phase(), GamePhase::CountingDown);
    }

    #[test]
    fn expiry_is_rejected_outside_the_claim_window() {
        let mut sm = GameStateMachine::new();
        apply(&mut sm, GameEvent::PlayersReady);
        apply(&mut sm, GameEvent::CountdownFinished);
        apply(&mut sm, GameEvent::DurationExpired);

        // A watchdog tick that lost the race observes Revealing and no-ops.
        assert!(sm.apply(GameEvent::DurationExpired).is_err());
        assert_eq!(sm.phase(), GamePhase::Revealing);
    }
}
