//! Realtime broadcast hub
//!
//! One WebSocket endpoint shared by every client. Each connection subscribes
//! to the event bus for outbound fan-out and feeds inbound action frames to
//! the stores. Identity travels per-message (sessionId/senderIcon), not per
//! connection, so there is no handshake beyond the transport upgrade.

use crate::db;
use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use placehub_common::events::{ClientAction, QaEvent};
use placehub_common::{time, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

/// GET /live - upgrade to the shared realtime channel
pub async fn live_stream(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

/// Run one client connection to completion
///
/// Outbound and inbound run as separate tasks; whichever side ends first
/// (peer disconnect, bus closed) tears down the other.
async fn handle_connection(socket: WebSocket, state: AppState) {
    debug!("New realtime client connected");

    let (mut sink, mut stream) = socket.split();
    let mut rx = state.events.subscribe();

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        if sink.send(Message::Text(json)).await.is_err() {
                            // Peer gone between receipt and send; stop forwarding
                            break;
                        }
                    }
                    Err(e) => warn!("Failed to serialize event: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    // Slow client: skip ahead, clients re-sync via the
                    // listing endpoints
                    warn!("Realtime client lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            match message {
                Message::Text(text) => handle_frame(&recv_state, &text).await,
                Message::Close(_) => break,
                // Ping/pong are answered by axum; binary frames are ignored
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    debug!("Realtime client disconnected");
}

/// Process one inbound frame
///
/// A malformed or failing message is logged and dropped; it must never sever
/// the connection or crash the hub. The submitting client gets no explicit
/// error reply - absence of a broadcast is the only signal.
async fn handle_frame(state: &AppState, text: &str) {
    match serde_json::from_str::<ClientAction>(text) {
        Ok(action) => {
            if let Err(e) = dispatch_action(state, action).await {
                warn!("Realtime action dropped: {}", e);
            }
        }
        Err(e) => warn!("Ignoring malformed realtime frame: {}", e),
    }
}

/// Apply an inbound action to the stores and broadcast the resulting change
///
/// Shared with tests; the REST handlers emit the same events through the
/// same bus.
pub async fn dispatch_action(state: &AppState, action: ClientAction) -> Result<()> {
    match action {
        ClientAction::NewAnswer(new_answer) => {
            let answer = db::answers::create_answer(&state.db, new_answer).await?;
            state.events.emit(QaEvent::AnswerReceived(answer));
        }
        ClientAction::React {
            answer_id,
            reaction,
        } => {
            match db::answers::react(&state.db, answer_id, &reaction).await? {
                Some(answer) => state.events.emit(QaEvent::ReactionUpdated {
                    answer_id: answer.id,
                    reactions: answer.reactions,
                    reaction,
                    timestamp: time::now(),
                }),
                // Unknown answer: no broadcast, no error to the sender
                None => debug!("Reaction for unknown answer {} dropped", answer_id),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use placehub_common::models::NewAnswer;
    use tokio::sync::broadcast::error::TryRecvError;
    use uuid::Uuid;

    async fn setup_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let pool = placehub_common::db::init_database(&dir.path().join("placehub.db"))
            .await
            .unwrap();
        (AppState::new(pool), dir)
    }

    fn new_answer(question_id: Uuid) -> ClientAction {
        ClientAction::NewAnswer(NewAnswer {
            question_id: question_id.to_string(),
            text: Some("Medium difficulty".to_string()),
            image_url: None,
            sender_icon: "🦊".to_string(),
            session_id: "s2".to_string(),
        })
    }

    #[tokio::test]
    async fn test_new_answer_action_broadcasts_stored_answer() {
        let (state, _dir) = setup_state().await;
        let mut rx = state.events.subscribe();

        dispatch_action(&state, new_answer(Uuid::new_v4())).await.unwrap();

        match rx.recv().await.unwrap() {
            QaEvent::AnswerReceived(answer) => {
                assert_eq!(answer.text.as_deref(), Some("Medium difficulty"));
                assert_eq!(answer.sender_icon, "🦊");
                // The broadcast record was persisted
                let stored = db::answers::get_answer(&state.db, answer.id)
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(stored.id, answer.id);
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_react_action_broadcasts_updated_tally() {
        let (state, _dir) = setup_state().await;

        dispatch_action(&state, new_answer(Uuid::new_v4())).await.unwrap();
        // Subscribe after the answer exists so the first event seen is the
        // reaction update
        let mut rx = state.events.subscribe();
        let stored: String = sqlx::query_scalar("SELECT guid FROM answers")
            .fetch_one(&state.db)
            .await
            .unwrap();
        let answer_id = Uuid::parse_str(&stored).unwrap();

        dispatch_action(
            &state,
            ClientAction::React {
                answer_id,
                reaction: "helpful".to_string(),
            },
        )
        .await
        .unwrap();

        match rx.recv().await.unwrap() {
            QaEvent::ReactionUpdated {
                answer_id: id,
                reactions,
                reaction,
                ..
            } => {
                assert_eq!(id, answer_id);
                assert_eq!(reaction, "helpful");
                assert_eq!(reactions.count("helpful"), 1);
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_react_unknown_answer_is_silently_dropped() {
        let (state, _dir) = setup_state().await;
        let mut rx = state.events.subscribe();

        dispatch_action(
            &state,
            ClientAction::React {
                answer_id: Uuid::new_v4(),
                reaction: "helpful".to_string(),
            },
        )
        .await
        .unwrap();

        // No broadcast for the dropped action
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_invalid_answer_content_is_an_error_and_no_broadcast() {
        let (state, _dir) = setup_state().await;
        let mut rx = state.events.subscribe();

        let action = ClientAction::NewAnswer(NewAnswer {
            question_id: Uuid::new_v4().to_string(),
            text: Some("   ".to_string()),
            image_url: None,
            sender_icon: "🦊".to_string(),
            session_id: "s2".to_string(),
        });

        assert!(dispatch_action(&state, action).await.is_err());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers")
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_malformed_frame_is_ignored() {
        let (state, _dir) = setup_state().await;
        let mut rx = state.events.subscribe();

        // Neither panics nor broadcasts
        handle_frame(&state, "not json at all").await;
        handle_frame(&state, r#"{"type":"SHUTDOWN","payload":{}}"#).await;

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
