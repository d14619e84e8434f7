mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use roomwatch_common::RoomRef;

fn server(state: roomwatch_api::AppState) -> TestServer {
    let app = roomwatch_api::routes::router().with_state(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn health_reports_counts() {
    let state = common::test_state();
    state.monitors.register(&RoomRef::new("R1", None));
    let server = server(state);

    let resp = server.get("/health").await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["monitored_rooms"], 1);
    assert_eq!(body["dashboards"], 0);
}

#[tokio::test]
async fn list_rooms_is_ordered() {
    let state = common::test_state();
    state
        .monitors
        .register(&RoomRef::new("zz9", Some("neon-city".into())));
    state.monitors.register(&RoomRef::new("aa1", None));
    let server = server(state);

    let resp = server.get("/api/v1/rooms").await;
    resp.assert_status_ok();
    let rooms: Vec<serde_json::Value> = resp.json();
    assert_eq!(rooms.len(), 2);
    assert_eq!(rooms[0]["room_id"], "aa1");
    assert_eq!(rooms[0]["map_id"], serde_json::Value::Null);
    assert_eq!(rooms[1]["room_id"], "zz9");
    assert_eq!(rooms[1]["map_id"], "neon-city");
    assert_eq!(rooms[1]["status"], "connecting");
}

#[tokio::test]
async fn get_room_reflects_relay_activity() {
    let state = common::test_state();
    state.monitors.register(&RoomRef::new("R1", None));
    state.monitors.mark_connecting("R1");
    state.monitors.mark_connected("R1");
    state.monitors.record_frame("R1", "dice-rolled");
    let server = server(state);

    let resp = server.get("/api/v1/rooms/R1").await;
    resp.assert_status_ok();
    let room: serde_json::Value = resp.json();
    assert_eq!(room["status"], "connected");
    assert_eq!(room["connect_attempts"], 1);
    assert_eq!(room["frames_relayed"], 1);
    assert_eq!(room["last_event"], "dice-rolled");
}

#[tokio::test]
async fn get_unknown_room_is_404() {
    let server = server(common::test_state());

    let resp = server.get("/api/v1/rooms/nope").await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "ROOM_NOT_MONITORED");
    assert_eq!(body["error"]["room_id"], "nope");
}
