mod common;

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::SinkExt;
use roomwatch_common::{RoomEnvelope, RoomRef};
use tokio::time;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use common::{next_json, next_message, ClientWs};

/// Helper: connect to the gateway and subscribe. Returns the stream after READY.
async fn connect_and_subscribe(addr: SocketAddr) -> (ClientWs, serde_json::Value) {
    let url = format!("ws://{addr}/ws");
    let (mut ws, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");

    let subscribe = serde_json::json!({ "messageTypes": [] });
    ws.send(tungstenite::Message::Text(subscribe.to_string().into()))
        .await
        .expect("send subscribe");

    let ready = next_json(&mut ws).await;
    assert_eq!(ready["op"], 0, "READY should be op=0 (DISPATCH)");
    assert_eq!(ready["t"], "READY");
    (ws, ready)
}

async fn send_json(ws: &mut ClientWs, value: serde_json::Value) {
    ws.send(tungstenite::Message::Text(value.to_string().into()))
        .await
        .expect("send");
}

fn expect_close(msg: tungstenite::Message, code: u16) {
    match msg {
        tungstenite::Message::Close(Some(frame)) => {
            assert_eq!(frame.code, CloseCode::from(code));
        }
        other => panic!("Expected Close frame, got: {other:?}"),
    }
}

fn envelope(room_id: &str, message: &str) -> RoomEnvelope {
    RoomEnvelope::new(RoomRef::new(room_id, None), message, None)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn subscribe_returns_ready() {
    let state = common::test_state();
    state.monitors.register(&RoomRef::new("R1", None));
    let addr = common::start_server(state).await;

    let (_ws, ready) = connect_and_subscribe(addr).await;
    assert_eq!(ready["s"], 1);

    let d = &ready["d"];
    assert!(d["session_id"].as_str().unwrap().starts_with("dash_"));
    assert!(d["heartbeat_interval"].as_u64().unwrap() > 0);
    assert_eq!(d["monitored_rooms"], 1);
    assert_eq!(d["message_types"], serde_json::json!([]));
}

#[tokio::test]
async fn relayed_frame_becomes_instruction_batch() {
    let state = common::test_state();
    let addr = common::start_server(state.clone()).await;
    let (mut ws, _) = connect_and_subscribe(addr).await;

    assert_eq!(
        state.broadcast.dispatch(envelope("R1", r#"42/api/game,["game-started",{"x":1}]"#)),
        1
    );

    let create = next_json(&mut ws).await;
    assert_eq!(create["t"], "CREATE_ROOM_LOG");
    assert_eq!(create["s"], 2);
    assert_eq!(create["d"]["type"], "CREATE_ROOM_LOG");
    assert_eq!(create["d"]["room_id"], "R1");
    assert_eq!(create["d"]["map_id"], "unknown");
    assert_eq!(create["d"]["lifecycle"], "waiting");
    assert_eq!(create["d"]["room_url"], "https://richup.io/room/R1");

    let append = next_json(&mut ws).await;
    assert_eq!(append["t"], "APPEND_LOG_ENTRY");
    assert_eq!(append["d"]["event_name"], "game-started");
    assert_eq!(append["d"]["visible"], true);
    assert_eq!(append["d"]["payload"][0]["key"], "x");
    assert_eq!(append["d"]["payload"][0]["value"], "1");

    let lifecycle = next_json(&mut ws).await;
    assert_eq!(lifecycle["t"], "SET_LIFECYCLE_VISUAL");
    assert_eq!(lifecycle["d"]["lifecycle"], "playing");

    let filter = next_json(&mut ws).await;
    assert_eq!(filter["t"], "REGISTER_FILTER_CONTROL");
    assert_eq!(filter["d"]["event_name"], "game-started");
    assert_eq!(filter["d"]["checked"], true);
    assert_eq!(filter["s"], 5);
}

#[tokio::test]
async fn garbage_frames_produce_nothing() {
    let state = common::test_state();
    let addr = common::start_server(state.clone()).await;
    let (mut ws, _) = connect_and_subscribe(addr).await;

    state.broadcast.dispatch(envelope("R1", "garbage-not-json"));
    state.broadcast.dispatch(envelope("R1", r#"42/api/game,{"not":"an array"}"#));
    state.broadcast.dispatch(envelope("R2", r#"42/api/game,["chat",{}]"#));

    // The first thing through is the valid frame, with no sequence consumed.
    let create = next_json(&mut ws).await;
    assert_eq!(create["t"], "CREATE_ROOM_LOG");
    assert_eq!(create["d"]["room_id"], "R2");
    assert_eq!(create["s"], 2);
}

#[tokio::test]
async fn toggle_visibility_reports_existing_entries() {
    let state = common::test_state();
    let addr = common::start_server(state.clone()).await;
    let (mut ws, _) = connect_and_subscribe(addr).await;

    for _ in 0..2 {
        state.broadcast.dispatch(envelope("R1", r#"x,["chat",{"text":"hi"}]"#));
    }
    // CREATE, APPEND, REGISTER for the first frame, APPEND for the second.
    for _ in 0..4 {
        next_json(&mut ws).await;
    }

    send_json(
        &mut ws,
        serde_json::json!({ "op": 5, "d": { "eventName": "chat", "visible": false } }),
    )
    .await;

    let toggled = next_json(&mut ws).await;
    assert_eq!(toggled["t"], "SET_TYPE_VISIBILITY");
    assert_eq!(toggled["d"]["event_name"], "chat");
    assert_eq!(toggled["d"]["visible"], false);
    assert_eq!(toggled["d"]["affected_entries"], 2);

    // Entries after the toggle arrive hidden.
    state.broadcast.dispatch(envelope("R1", r#"x,["chat",{}]"#));
    let append = next_json(&mut ws).await;
    assert_eq!(append["t"], "APPEND_LOG_ENTRY");
    assert_eq!(append["d"]["visible"], false);
}

#[tokio::test]
async fn removed_room_log_is_recreated() {
    let state = common::test_state();
    let addr = common::start_server(state.clone()).await;
    let (mut ws, _) = connect_and_subscribe(addr).await;

    state.broadcast.dispatch(envelope("R1", r#"x,["room-deleted",{}]"#));
    let first = next_json(&mut ws).await;
    assert_eq!(first["t"], "CREATE_ROOM_LOG");
    let first_log = first["d"]["log"].clone();
    assert_eq!(next_json(&mut ws).await["t"], "APPEND_LOG_ENTRY");
    let offer = next_json(&mut ws).await;
    assert_eq!(offer["t"], "OFFER_REMOVAL");
    assert_eq!(next_json(&mut ws).await["t"], "REGISTER_FILTER_CONTROL");

    send_json(&mut ws, serde_json::json!({ "op": 8, "d": { "roomId": "R1" } })).await;
    // Removal has no reply; a heartbeat round-trip proves it was applied.
    send_json(&mut ws, serde_json::json!({ "op": 1, "d": { "seq": 5 } })).await;
    let ack = next_json(&mut ws).await;
    assert_eq!(ack["op"], 6);

    state.broadcast.dispatch(envelope("R1", r#"x,["chat",{}]"#));
    let recreated = next_json(&mut ws).await;
    assert_eq!(recreated["t"], "CREATE_ROOM_LOG");
    assert_ne!(recreated["d"]["log"], first_log);
    assert_eq!(recreated["d"]["created_at"], first["d"]["created_at"]);
}

#[tokio::test]
async fn heartbeat_is_acked() {
    let state = common::test_state();
    let addr = common::start_server(state).await;
    let (mut ws, _) = connect_and_subscribe(addr).await;

    send_json(&mut ws, serde_json::json!({ "op": 1, "d": { "seq": 1 } })).await;

    let ack = next_json(&mut ws).await;
    assert_eq!(ack, serde_json::json!({ "op": 6, "d": { "ack": 1 } }));
}

#[tokio::test]
async fn unknown_opcode_closes_connection() {
    let state = common::test_state();
    let addr = common::start_server(state).await;
    let (mut ws, _) = connect_and_subscribe(addr).await;

    send_json(&mut ws, serde_json::json!({ "op": 99, "d": {} })).await;
    expect_close(next_message(&mut ws).await, 4001);
}

#[tokio::test]
async fn invalid_json_closes_connection() {
    let state = common::test_state();
    let addr = common::start_server(state).await;
    let (mut ws, _) = connect_and_subscribe(addr).await;

    ws.send(tungstenite::Message::Text("not json".into()))
        .await
        .expect("send");
    expect_close(next_message(&mut ws).await, 4000);
}

#[tokio::test]
async fn invalid_subscription_is_rejected() {
    let state = common::test_state();
    let addr = common::start_server(state).await;

    let url = format!("ws://{addr}/ws");
    let (mut ws, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");

    send_json(&mut ws, serde_json::json!({ "messageTypes": "all" })).await;
    expect_close(next_message(&mut ws).await, 4000);
}

#[tokio::test]
async fn dashboards_have_independent_state() {
    let state = common::test_state();
    let addr = common::start_server(state.clone()).await;
    let (mut first, _) = connect_and_subscribe(addr).await;

    state.broadcast.dispatch(envelope("R1", r#"x,["chat",{}]"#));
    assert_eq!(next_json(&mut first).await["t"], "CREATE_ROOM_LOG");

    // A dashboard that attaches later sees R1 as new.
    let (mut second, _) = connect_and_subscribe(addr).await;
    time::sleep(Duration::from_millis(50)).await;
    state.broadcast.dispatch(envelope("R1", r#"x,["chat",{}]"#));

    let created = next_json(&mut second).await;
    assert_eq!(created["t"], "CREATE_ROOM_LOG");
    assert_eq!(created["s"], 2);
}

#[tokio::test(start_paused = true)]
async fn silent_dashboard_stays_connected() {
    let state = common::test_state();
    let addr = common::start_server(state.clone()).await;

    // Reads here have no timeout: with the clock paused a timeout could fire
    // before loopback I/O is polled.
    let url = format!("ws://{addr}/ws");
    let (mut ws, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    send_json(&mut ws, serde_json::json!({ "messageTypes": [] })).await;
    let ready = read_json(&mut ws).await;
    assert_eq!(ready["t"], "READY");
    let interval = ready["d"]["heartbeat_interval"].as_u64().unwrap();

    // Never heartbeat, well past several deadline windows.
    time::sleep(Duration::from_millis(interval * 5)).await;

    state.broadcast.dispatch(envelope("R1", r#"x,["chat",{}]"#));
    let created = read_json(&mut ws).await;
    assert_eq!(created["t"], "CREATE_ROOM_LOG");
}

async fn read_json(ws: &mut ClientWs) -> serde_json::Value {
    use futures_util::StreamExt;

    let msg = ws.next().await.expect("stream ended").expect("ws read error");
    match msg {
        tungstenite::Message::Text(text) => serde_json::from_str(&text).expect("parse JSON"),
        other => panic!("Expected text frame, got: {other:?}"),
    }
}
