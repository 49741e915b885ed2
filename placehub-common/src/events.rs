//! Event types for the PlaceHub realtime channel
//!
//! Provides the shared message envelope and the EventBus used for global
//! fan-out. Every message on the wire is `{"type": ..., "payload": ...}`;
//! inbound actions and outbound events are separate enums so the hub can
//! never echo a client frame back out unprocessed.

use crate::models::{Answer, NewAnswer, ReactionTally};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Outbound events pushed to every connected client
///
/// Events are broadcast via EventBus and serialized for WebSocket
/// transmission. Fan-out is global: all connections receive all events,
/// regardless of which question thread they are reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum QaEvent {
    /// A new answer was stored (via REST or the realtime channel)
    ///
    /// The payload is the full stored answer record.
    #[serde(rename = "ANSWER_RECEIVED")]
    AnswerReceived(Answer),

    /// A reaction was recorded against an answer
    #[serde(rename = "REACTION_UPDATED", rename_all = "camelCase")]
    ReactionUpdated {
        /// Answer the reaction targeted
        answer_id: Uuid,
        /// The full updated tally after the increment
        reactions: ReactionTally,
        /// The label that triggered this update
        reaction: String,
        /// When the update was recorded
        timestamp: DateTime<Utc>,
    },
}

impl QaEvent {
    /// Event type string as it appears on the wire
    pub fn type_str(&self) -> &'static str {
        match self {
            QaEvent::AnswerReceived(_) => "ANSWER_RECEIVED",
            QaEvent::ReactionUpdated { .. } => "REACTION_UPDATED",
        }
    }
}

/// Inbound actions received over the realtime channel
///
/// Identity is carried per-message (`sessionId`, `senderIcon`), not bound to
/// the connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientAction {
    /// Submit an answer to a question
    #[serde(rename = "NEW_ANSWER")]
    NewAnswer(NewAnswer),

    /// React to an answer with a free-form label
    #[serde(rename = "REACTION", rename_all = "camelCase")]
    React { answer_id: Uuid, reaction: String },
}

/// One-to-many event broadcasting for the realtime hub
///
/// Wraps a tokio broadcast channel. Subscribers that fall behind see
/// `Lagged` and skip ahead; the push channel is supplementary, so missed
/// events are not replayed (clients catch up via the listing endpoints).
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<QaEvent>,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<QaEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// A send with no subscribers is not an error: events are best-effort
    /// and nothing depends on delivery.
    pub fn emit(&self, event: QaEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of currently subscribed receivers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
