// Event types and payload structures for real-time updates
// These are broadcast via WebSocket to connected clients

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::state_machine::WizardStep;

// Event name constants
pub const EVENT_WIZARD_STEP_CHANGED: &str = "wizard:step-changed";
pub const EVENT_WIZARD_ERROR: &str = "wizard:error";
pub const EVENT_CATALOG_RELOADED: &str = "catalog:reloaded";

/// Payload for wizard step change events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardStepChangedPayload {
    pub session_id: String,
    pub old_step: WizardStep,
    pub new_step: WizardStep,
    pub pending: bool,
}

/// Payload for failed analysis/generation events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardErrorPayload {
    pub session_id: String,
    pub step: WizardStep,
    pub error: String,
}

/// Payload for catalog reload events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogReloadedPayload {
    pub model_count: usize,
    pub fallback: bool,
    pub warning: Option<String>,
}

/// A server event that can be broadcast to WebSocket clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerEvent {
    /// Event type (e.g., "wizard:step-changed")
    pub event: String,
    /// Event payload as JSON value
    pub payload: serde_json::Value,
}

/// Broadcasts events to all subscribers
pub struct EventBroadcaster {
    tx: broadcast::Sender<ServerEvent>,
}

impl EventBroadcaster {
    /// Create a new event broadcaster with a channel capacity of 1000 events
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1000);
        Self { tx }
    }

    pub fn broadcast(&self, event_type: &str, payload: impl Serialize) {
        let event = ServerEvent {
            event: event_type.to_string(),
            payload: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        };

        // Ignore send errors (no receivers)
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_subscriber() {
        let broadcaster = EventBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.broadcast(
            EVENT_WIZARD_STEP_CHANGED,
            WizardStepChangedPayload {
                session_id: "s-1".to_string(),
                old_step: WizardStep::Input,
                new_step: WizardStep::Analysis,
                pending: true,
            },
        );

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event, "wizard:step-changed");
        assert_eq!(event.payload["sessionId"], "s-1");
        assert_eq!(event.payload["newStep"], "analysis");
    }

    #[test]
    fn test_broadcast_without_subscribers_is_ignored() {
        let broadcaster = EventBroadcaster::new();
        broadcaster.broadcast(EVENT_WIZARD_ERROR, serde_json::json!({"error": "x"}));
    }
}
