use std::{collections::BTreeSet, time::Duration};

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{PlayerInboundMessage, PresenceAck},
    services::{game_service, sse_events},
    state::{PlayerConnection, SharedState},
};

const IDENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle the full lifecycle for an individual participant WebSocket session.
///
/// The first frame must be an identification message; afterwards the session
/// only keeps the roster entry alive. Join and leave both rebroadcast the
/// roster and feed the distinct count into the orchestrator's auto-start
/// evaluation.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we
    // await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let initial_message = match tokio::time::timeout(IDENT_TIMEOUT, receiver.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => text,
        Ok(Some(Ok(Message::Close(_)))) => {
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Ok(_))) => {
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Err(err))) => {
            warn!(error = %err, "websocket receive error");
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(None) | Err(_) => {
            warn!("websocket identification timed out");
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let name = match PlayerInboundMessage::from_json_str(&initial_message) {
        Ok(PlayerInboundMessage::Identification { name }) => name.trim().to_string(),
        Ok(_) => {
            warn!("first message was not identification");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Err(err) => {
            warn!(error = %err, "failed to parse or validate identification");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let session_id = Uuid::new_v4();
    state.players().insert(
        session_id,
        PlayerConnection {
            name: name.clone(),
            tx: outbound_tx.clone(),
        },
    );
    info!(%session_id, name = %name, "participant connected");

    send_ack(&outbound_tx, &name);
    publish_roster(&state).await;

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match PlayerInboundMessage::from_json_str(&text) {
                Ok(PlayerInboundMessage::Identification { .. }) => {
                    warn!(%session_id, "ignoring duplicate identification message");
                }
                Ok(PlayerInboundMessage::Unknown) => {}
                Err(err) => {
                    warn!(%session_id, error = %err, "failed to parse participant message");
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(%session_id, "participant closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(%session_id, error = %err, "websocket error");
                break;
            }
        }
    }

    state.players().remove(&session_id);
    info!(%session_id, name = %name, "participant disconnected");
    publish_roster(&state).await;

    finalize(writer_task, outbound_tx).await;
}

/// Broadcast the distinct roster and report its size to the orchestrator.
pub async fn publish_roster(state: &SharedState) {
    let names = distinct_names(state);
    sse_events::broadcast_presence_roster(state, &names);
    game_service::set_player_count(state, names.len()).await;
    game_service::notify_presence_changed(state).await;
}

/// Distinct participant names in sorted order.
///
/// Two sessions identifying with the same name count as one participant.
fn distinct_names(state: &SharedState) -> Vec<String> {
    let names: BTreeSet<String> = state
        .players()
        .iter()
        .map(|entry| entry.value().name.clone())
        .collect();
    names.into_iter().collect()
}

fn send_ack(tx: &mpsc::UnboundedSender<Message>, name: &str) {
    let ack = PresenceAck {
        name: name.to_string(),
        status: "connected".into(),
    };
    match serde_json::to_string(&ack) {
        Ok(json) => {
            let _ = tx.send(Message::Text(json.into()));
        }
        Err(err) => warn!(error = %err, "failed to serialize presence ack"),
    }
}

async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        dao::slot_store::memory::MemorySlotStore,
        state::{AppState, state_machine::GamePhase},
    };

    fn connect(state: &SharedState, name: &str) -> Uuid {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session_id = Uuid::new_v4();
        state.players().insert(
            session_id,
            PlayerConnection {
                name: name.into(),
                tx,
            },
        );
        session_id
    }

    #[tokio::test]
    async fn duplicate_names_count_as_one_participant() {
        let state = AppState::new(AppConfig::default());
        connect(&state, "alice");
        connect(&state, "alice");
        connect(&state, "bob");

        assert_eq!(distinct_names(&state), vec!["alice", "bob"]);
    }

    #[tokio::test(start_paused = true)]
    async fn roster_publication_reports_count_and_triggers_auto_start() {
        let state = AppState::new(AppConfig::default());
        state
            .install_slot_store(Arc::new(MemorySlotStore::new()))
            .await;
        let mut events = state.public_sse().subscribe();

        for i in 0..10 {
            connect(&state, &format!("player-{i}"));
        }
        publish_roster(&state).await;

        let roster = events.recv().await.unwrap();
        assert_eq!(roster.event.as_deref(), Some("presence.roster"));
        let payload: serde_json::Value = serde_json::from_str(&roster.data).unwrap();
        assert_eq!(payload["players"].as_array().unwrap().len(), 10);

        // Ten distinct names reach the threshold and commit the countdown.
        assert_eq!(state.phase().await, GamePhase::CountingDown);
    }

    #[tokio::test]
    async fn leaving_below_threshold_does_not_corrupt_the_lobby() {
        let state = AppState::new(AppConfig::default());
        let session = connect(&state, "alice");
        publish_roster(&state).await;
        assert_eq!(state.phase().await, GamePhase::WaitingForPlayers);

        state.players().remove(&session);
        publish_roster(&state).await;
        assert_eq!(state.phase().await, GamePhase::WaitingForPlayers);
        assert_eq!(state.game().read().await.player_count(), 0);
    }
}
