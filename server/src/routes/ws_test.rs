use super::*;
use crate::state::test_helpers;
use futures::{SinkExt, StreamExt};
use tokio::time::{Duration, sleep, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use wire::{DrawAction, Join, Tool};

// =============================================================================
// Helpers
// =============================================================================

async fn recv_event(rx: &mut mpsc::Receiver<DrawEvent>) -> DrawEvent {
    timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("receive timed out")
        .expect("channel closed unexpectedly")
}

async fn assert_no_event(rx: &mut mpsc::Receiver<DrawEvent>) {
    assert!(
        timeout(Duration::from_millis(80), rx.recv()).await.is_err(),
        "expected no event"
    );
}

async fn join(state: &AppState, session: &str, client_id: Uuid, tx: &mpsc::Sender<DrawEvent>) -> Option<String> {
    let mut current = None;
    let text = wire::encode(&Join { session_id: session.into() });
    process_inbound_text(state, &mut current, client_id, tx, &text).await;
    current
}

// =============================================================================
// Dispatch
// =============================================================================

#[tokio::test]
async fn join_registers_the_connection() {
    let state = AppState::new();
    let (tx, _rx) = mpsc::channel(8);

    let current = join(&state, "s1", Uuid::new_v4(), &tx).await;

    assert_eq!(current.as_deref(), Some("s1"));
    assert_eq!(test_helpers::member_count(&state, "s1").await, 1);
}

#[tokio::test]
async fn rejoin_moves_the_connection_between_rooms() {
    let state = AppState::new();
    let client_id = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel(8);
    let mut current = join(&state, "s1", client_id, &tx).await;

    let text = wire::encode(&Join { session_id: "s2".into() });
    process_inbound_text(&state, &mut current, client_id, &tx, &text).await;

    assert_eq!(current.as_deref(), Some("s2"));
    assert_eq!(test_helpers::member_count(&state, "s1").await, 0);
    assert_eq!(test_helpers::member_count(&state, "s2").await, 1);
}

#[tokio::test]
async fn draw_event_reaches_peers_but_not_the_sender() {
    let state = AppState::new();
    let sender_id = Uuid::new_v4();
    let (sender_tx, mut sender_rx) = mpsc::channel(8);
    let mut current = join(&state, "s1", sender_id, &sender_tx).await;
    let (peer_tx, mut peer_rx) = mpsc::channel(8);
    test_helpers::seed_client(&state, "s1", Uuid::new_v4(), peer_tx).await;

    let event = DrawEvent::continue_at("s1", 4.0, 5.0);
    process_inbound_text(&state, &mut current, sender_id, &sender_tx, &wire::encode(&event)).await;

    assert_eq!(recv_event(&mut peer_rx).await, event);
    assert_no_event(&mut sender_rx).await;
}

#[tokio::test]
async fn draw_before_join_is_dropped() {
    let state = AppState::new();
    let (tx, _rx) = mpsc::channel(8);
    let (peer_tx, mut peer_rx) = mpsc::channel(8);
    test_helpers::seed_client(&state, "s1", Uuid::new_v4(), peer_tx).await;

    let mut current = None;
    let event = DrawEvent::erase("s1", 1.0, 1.0);
    process_inbound_text(&state, &mut current, Uuid::new_v4(), &tx, &wire::encode(&event)).await;

    assert_no_event(&mut peer_rx).await;
}

#[tokio::test]
async fn draw_for_a_different_session_is_dropped() {
    let state = AppState::new();
    let sender_id = Uuid::new_v4();
    let (sender_tx, _sender_rx) = mpsc::channel(8);
    let mut current = join(&state, "s1", sender_id, &sender_tx).await;
    let (peer_tx, mut peer_rx) = mpsc::channel(8);
    test_helpers::seed_client(&state, "s2", Uuid::new_v4(), peer_tx).await;

    let event = DrawEvent::erase("s2", 1.0, 1.0);
    process_inbound_text(&state, &mut current, sender_id, &sender_tx, &wire::encode(&event)).await;

    assert_no_event(&mut peer_rx).await;
}

#[tokio::test]
async fn undecodable_messages_are_ignored() {
    let state = AppState::new();
    let sender_id = Uuid::new_v4();
    let (sender_tx, _sender_rx) = mpsc::channel(8);
    let mut current = join(&state, "s1", sender_id, &sender_tx).await;
    let (peer_tx, mut peer_rx) = mpsc::channel(8);
    test_helpers::seed_client(&state, "s1", Uuid::new_v4(), peer_tx).await;

    for text in ["{broken", r#"{"sessionId":"s1","x":1.0,"action":"sparkle"}"#, "42"] {
        process_inbound_text(&state, &mut current, sender_id, &sender_tx, text).await;
    }

    assert_no_event(&mut peer_rx).await;
    assert_eq!(current.as_deref(), Some("s1"));
}

#[tokio::test]
async fn relayed_events_keep_sender_order() {
    let state = AppState::new();
    let sender_id = Uuid::new_v4();
    let (sender_tx, _sender_rx) = mpsc::channel(8);
    let mut current = join(&state, "s1", sender_id, &sender_tx).await;
    let (peer_tx, mut peer_rx) = mpsc::channel(16);
    test_helpers::seed_client(&state, "s1", Uuid::new_v4(), peer_tx).await;

    for x in 0..6 {
        let event = DrawEvent::continue_at("s1", f64::from(x), 0.0);
        process_inbound_text(&state, &mut current, sender_id, &sender_tx, &wire::encode(&event)).await;
    }

    for x in 0..6 {
        assert_eq!(recv_event(&mut peer_rx).await.x, Some(f64::from(x)));
    }
}

// =============================================================================
// End to end over a real socket
// =============================================================================

async fn spawn_relay(state: AppState) -> String {
    let app = crate::routes::app(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("ws://{addr}/ws")
}

async fn wait_for_members(state: &AppState, session: &str, expected: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while test_helpers::member_count(state, session).await != expected {
        assert!(tokio::time::Instant::now() < deadline, "timed out waiting for {expected} members");
        sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn relay_mirrors_draw_events_between_live_connections() {
    let state = AppState::new();
    let url = spawn_relay(state.clone()).await;

    let (mut alice, _) = connect_async(&url).await.expect("connect alice");
    let (mut bob, _) = connect_async(&url).await.expect("connect bob");

    let join = wire::encode(&Join { session_id: "room".into() });
    alice.send(WsMessage::Text(join.clone().into())).await.expect("alice join");
    bob.send(WsMessage::Text(join.into())).await.expect("bob join");
    wait_for_members(&state, "room", 2).await;

    let event = DrawEvent::start("room", 1.0, 2.0, Tool::Pencil, "#000000", 2.0, None);
    alice.send(WsMessage::Text(wire::encode(&event).into())).await.expect("alice draw");

    let received = timeout(Duration::from_secs(2), bob.next())
        .await
        .expect("bob receive timed out")
        .expect("bob stream ended")
        .expect("bob ws error");
    let WsMessage::Text(text) = received else {
        panic!("expected a text frame");
    };
    let ClientMessage::Draw(back) = wire::decode(text.as_str()).expect("decode") else {
        panic!("expected a draw event");
    };
    assert_eq!(back, event);
    assert_eq!(back.action, DrawAction::Start);

    // No echo to the sender.
    assert!(timeout(Duration::from_millis(200), alice.next()).await.is_err());

    // Disconnects evict the room.
    drop(alice);
    drop(bob);
    wait_for_members(&state, "room", 0).await;
}
