use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ChatMessage;

/// Inbound WebSocket events from client to server
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsInboundEvent {
    #[serde(rename = "new-message")]
    NewMessage {
        sender: Uuid,
        #[serde(rename = "userName")]
        user_name: String,
        text: String,
    },
}

/// Outbound WebSocket events from server to client
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsOutboundEvent {
    /// Full persisted history, delivered privately to the connecting
    /// client only, oldest first.
    #[serde(rename = "history-snapshot")]
    HistorySnapshot { messages: Vec<ChatMessage> },

    /// A persisted message fanned out to every connected client,
    /// including its server-assigned id and timestamp.
    #[serde(rename = "message-broadcast")]
    MessageBroadcast { message: ChatMessage },

    /// Sent only to the client whose inbound message could not be
    /// persisted; the message is dropped from the fan-out path.
    #[serde(rename = "error")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn inbound_event_uses_the_wire_names() {
        let json = r#"{"type":"new-message","sender":"7f2a9f3e-1c7b-4a08-9f0e-0f6a0f1b2c3d","userName":"aysel","text":"salam"}"#;
        let evt: WsInboundEvent = serde_json::from_str(json).unwrap();
        let WsInboundEvent::NewMessage {
            user_name, text, ..
        } = evt;
        assert_eq!(user_name, "aysel");
        assert_eq!(text, "salam");
    }

    #[test]
    fn broadcast_event_round_trips_with_camel_case_fields() {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            sender: Uuid::new_v4(),
            user_name: "aysel".into(),
            text: "salam".into(),
            created_at: Utc::now(),
        };
        let json =
            serde_json::to_string(&WsOutboundEvent::MessageBroadcast { message: message.clone() })
                .unwrap();

        assert!(json.contains(r#""type":"message-broadcast""#));
        assert!(json.contains(r#""userName":"aysel""#));
        assert!(json.contains(r#""createdAt""#));

        let parsed: WsOutboundEvent = serde_json::from_str(&json).unwrap();
        match parsed {
            WsOutboundEvent::MessageBroadcast { message: m } => assert_eq!(m, message),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn history_snapshot_keeps_message_order() {
        let mk = |text: &str| ChatMessage {
            id: Uuid::new_v4(),
            sender: Uuid::new_v4(),
            user_name: "u".into(),
            text: text.into(),
            created_at: Utc::now(),
        };
        let messages = vec![mk("first"), mk("second"), mk("third")];
        let json =
            serde_json::to_string(&WsOutboundEvent::HistorySnapshot { messages: messages.clone() })
                .unwrap();

        let parsed: WsOutboundEvent = serde_json::from_str(&json).unwrap();
        match parsed {
            WsOutboundEvent::HistorySnapshot { messages: m } => assert_eq!(m, messages),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
