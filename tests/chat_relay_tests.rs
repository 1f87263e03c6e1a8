//! Relay-level properties that hold without a database: fan-out exactness
//! and the wire shape of the channel events.

use std::collections::HashSet;

use storefront_service::websocket::message_types::{WsInboundEvent, WsOutboundEvent};
use storefront_service::websocket::ConnectionRegistry;

#[tokio::test]
async fn concurrent_broadcasts_reach_every_subscriber_exactly_once() {
    const SENDERS: usize = 8;
    const PER_SENDER: usize = 25;

    let registry = ConnectionRegistry::new();
    let (_id_a, mut rx_a) = registry.add_subscriber().await;
    let (_id_b, mut rx_b) = registry.add_subscriber().await;
    let (_id_c, mut rx_c) = registry.add_subscriber().await;

    let mut tasks = Vec::new();
    for sender in 0..SENDERS {
        let registry = registry.clone();
        tasks.push(tokio::spawn(async move {
            for seq in 0..PER_SENDER {
                registry.broadcast(format!("{sender}:{seq}")).await;
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let expected: HashSet<String> = (0..SENDERS)
        .flat_map(|s| (0..PER_SENDER).map(move |q| format!("{s}:{q}")))
        .collect();

    for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
        let mut received = Vec::new();
        for _ in 0..SENDERS * PER_SENDER {
            received.push(rx.recv().await.expect("missing broadcast"));
        }
        assert!(rx.try_recv().is_err(), "unexpected extra broadcast");

        // Exactly one delivery per broadcast: no losses, no duplicates.
        let unique: HashSet<String> = received.iter().cloned().collect();
        assert_eq!(unique, expected);
        assert_eq!(received.len(), unique.len());
    }
}

#[tokio::test]
async fn subscribers_from_the_same_sender_see_its_messages_in_order() {
    let registry = ConnectionRegistry::new();
    let (_id, mut rx) = registry.add_subscriber().await;

    for seq in 0..10 {
        registry.broadcast(format!("m{seq}")).await;
    }

    for seq in 0..10 {
        assert_eq!(rx.recv().await.unwrap(), format!("m{seq}"));
    }
}

#[test]
fn the_channel_speaks_the_documented_event_names() {
    let inbound: WsInboundEvent = serde_json::from_str(
        r#"{"type":"new-message","sender":"3b3f3c5e-7a39-44a0-8c55-6a4f6d4f4b2a","userName":"u","text":"hi"}"#,
    )
    .unwrap();
    let WsInboundEvent::NewMessage { text, .. } = inbound;
    assert_eq!(text, "hi");

    let err = serde_json::to_string(&WsOutboundEvent::Error {
        message: "message could not be saved".into(),
    })
    .unwrap();
    assert!(err.contains(r#""type":"error""#));

    let history = serde_json::to_string(&WsOutboundEvent::HistorySnapshot {
        messages: Vec::new(),
    })
    .unwrap();
    assert!(history.contains(r#""type":"history-snapshot""#));
}

#[test]
fn unknown_inbound_events_fail_to_parse() {
    // The relay logs and ignores frames it does not understand.
    let result = serde_json::from_str::<WsInboundEvent>(r#"{"type":"shutdown"}"#);
    assert!(result.is_err());
}
