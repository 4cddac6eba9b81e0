pub mod feed;
pub mod game;
mod sse;
pub mod state_machine;

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{RwLock, mpsc, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::slot_store::SlotStore,
    error::ServiceError,
    services::reward_service,
    state::{game::GameRound, state_machine::GamePhase},
};

pub use self::feed::ClaimFeed;
pub use self::sse::SseHub;

/// Cheaply cloneable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Broadcast channel capacity for the public SSE stream.
const SSE_CAPACITY: usize = 64;

#[derive(Clone)]
/// Handle used to push messages to a connected participant socket.
pub struct PlayerConnection {
    /// Display name the participant identified with.
    pub name: String,
    /// Outbound message channel consumed by the socket's writer task.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state shared by routes, services, and background loops.
pub struct AppState {
    config: AppConfig,
    slot_store: RwLock<Option<Arc<dyn SlotStore>>>,
    degraded: watch::Sender<bool>,
    sse: SseHub,
    players: DashMap<Uuid, PlayerConnection>,
    game: RwLock<GameRound>,
    feed: ClaimFeed,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a slot store is
    /// installed, with an initial reward set already generated for the first
    /// round.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let rewards = reward_service::generate(config.grid_size);
        Arc::new(Self {
            config,
            slot_store: RwLock::new(None),
            degraded: degraded_tx,
            sse: SseHub::new(SSE_CAPACITY),
            players: DashMap::new(),
            game: RwLock::new(GameRound::new(rewards)),
            feed: ClaimFeed::new(),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current slot store, if one is installed.
    pub async fn slot_store(&self) -> Option<Arc<dyn SlotStore>> {
        let guard = self.slot_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the slot store or fail with the degraded-mode error.
    pub async fn require_slot_store(&self) -> Result<Arc<dyn SlotStore>, ServiceError> {
        self.slot_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a slot store implementation and leave degraded mode.
    pub async fn install_slot_store(&self, store: Arc<dyn SlotStore>) {
        {
            let mut guard = self.slot_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current slot store and enter degraded mode.
    pub async fn clear_slot_store(&self) {
        {
            let mut guard = self.slot_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.slot_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Registry of connected participant sockets keyed by session id.
    pub fn players(&self) -> &DashMap<Uuid, PlayerConnection> {
        &self.players
    }

    /// The round coordination lock guarding phase, start instant, rewards,
    /// and the cached participant count.
    ///
    /// Hold it only for pure state reads and writes; delays, broadcasts, and
    /// store calls belong outside the critical section.
    pub fn game(&self) -> &RwLock<GameRound> {
        &self.game
    }

    /// Snapshot the current round phase.
    pub async fn phase(&self) -> GamePhase {
        self.game.read().await.phase()
    }

    /// Pending-update queue drained by the claim broadcaster.
    pub fn claim_feed(&self) -> &ClaimFeed {
        &self.feed
    }
}
