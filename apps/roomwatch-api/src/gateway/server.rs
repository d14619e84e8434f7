//! WebSocket upgrade handler and per-dashboard event loop.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use roomwatch_common::RoomEnvelope;
use tokio::sync::broadcast;
use tokio::time;

use crate::AppState;

use super::events::{
    ClientMessage, GatewayMessage, HeartbeatPayload, RemoveRoomLogPayload, SubscribePayload,
    ToggleVisibilityPayload, OP_HEARTBEAT, OP_REMOVE_ROOM_LOG, OP_TOGGLE_VISIBILITY,
};
use super::handler::{handle_subscribe, HEARTBEAT_INTERVAL_MS};
use super::session::DashboardSession;

/// Close codes (4000-range for application-level).
const CLOSE_UNKNOWN_ERROR: u16 = 4000;
const CLOSE_UNKNOWN_OPCODE: u16 = 4001;
const CLOSE_NOT_SUBSCRIBED: u16 = 4003;
const CLOSE_SESSION_TIMEOUT: u16 = 4009;

/// Timeout for receiving the subscription after connection (seconds).
const SUBSCRIBE_TIMEOUT_SECS: u64 = 10;

type WsSink = SplitSink<WebSocket, Message>;
type WsStream = SplitStream<WebSocket>;

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Step 1: Wait for the subscription message within timeout.
    let subscribe_result = time::timeout(Duration::from_secs(SUBSCRIBE_TIMEOUT_SECS), async {
        while let Some(msg) = ws_rx.next().await {
            let msg = match msg {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!(?e, "ws read error during subscribe");
                    return Err((CLOSE_UNKNOWN_ERROR, "read error"));
                }
            };

            let text = match msg {
                Message::Text(t) => t,
                Message::Close(_) => return Err((CLOSE_NOT_SUBSCRIBED, "client closed")),
                _ => continue,
            };

            return serde_json::from_str::<SubscribePayload>(&text)
                .map_err(|_| (CLOSE_UNKNOWN_ERROR, "Invalid subscription"));
        }
        Err((CLOSE_NOT_SUBSCRIBED, "connection closed before subscribe"))
    })
    .await;

    let payload = match subscribe_result {
        Ok(Ok(payload)) => payload,
        Ok(Err((code, reason))) => {
            tracing::debug!(%reason, "dashboard subscription failed");
            let _ = send_close(&mut ws_tx, code, reason).await;
            return;
        }
        Err(_timeout) => {
            let _ = send_close(&mut ws_tx, CLOSE_SESSION_TIMEOUT, "Subscription timeout").await;
            return;
        }
    };

    // Subscribe to the hub before READY so no frame relayed after READY is missed.
    let broadcast_rx = state.broadcast.subscribe();
    let (session, ready_msg) = handle_subscribe(&state, payload);

    tracing::info!(
        session_id = %session.session_id,
        monitored_rooms = state.monitors.len(),
        "dashboard session established"
    );

    if send_message(&mut ws_tx, &ready_msg).await.is_err() {
        return;
    }

    let session_id = session.session_id.clone();
    let session = run_session(session, ws_tx, ws_rx, broadcast_rx).await;

    tracing::info!(
        %session_id,
        rooms = session.engine().sessions().len(),
        types = session.engine().types().len(),
        "dashboard session ended"
    );
}

/// Main session event loop: apply dashboard input, feed relayed frames through
/// the engine, enforce heartbeats for dashboards that send them. Returns the
/// session once the connection ends.
async fn run_session(
    mut session: DashboardSession,
    mut ws_tx: WsSink,
    mut ws_rx: WsStream,
    mut broadcast_rx: broadcast::Receiver<Arc<RoomEnvelope>>,
) -> DashboardSession {
    let mut heartbeat = HeartbeatWatch::default();
    let mut heartbeat_timer = time::interval(HeartbeatWatch::deadline());
    heartbeat_timer.tick().await; // First tick fires immediately; skip it.

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, session_id = %session.session_id, "ws read error");
                        break;
                    }
                    Some(Ok(_)) => continue,
                };

                match apply_client_message(&mut session, &text) {
                    Reply::Nothing => {}
                    Reply::Heartbeat(ack) => {
                        heartbeat.beat();
                        if send_message(&mut ws_tx, &ack).await.is_err() {
                            break;
                        }
                    }
                    Reply::Send(msg) => {
                        if send_message(&mut ws_tx, &msg).await.is_err() {
                            break;
                        }
                    }
                    Reply::Close(code, reason) => {
                        tracing::debug!(
                            session_id = %session.session_id,
                            code,
                            reason,
                            "closing dashboard"
                        );
                        let _ = send_close(&mut ws_tx, code, reason).await;
                        break;
                    }
                }
            }

            // Relayed frame from a room monitor.
            result = broadcast_rx.recv() => {
                let envelope = match result {
                    Ok(envelope) => envelope,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Missed frames are lost, like malformed ones.
                        tracing::warn!(
                            session_id = %session.session_id,
                            skipped,
                            "dashboard lagged behind room frames"
                        );
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if send_all(&mut ws_tx, session.ingest(&envelope)).await.is_err() {
                    break;
                }
            }

            // Heartbeat timeout check.
            _ = heartbeat_timer.tick() => {
                if heartbeat.expired() {
                    tracing::debug!(
                        session_id = %session.session_id,
                        "heartbeat timeout, closing connection"
                    );
                    let _ =
                        send_close(&mut ws_tx, CLOSE_SESSION_TIMEOUT, "Heartbeat timeout").await;
                    break;
                }
            }
        }
    }

    session
}

/// Heartbeat deadline for one dashboard.
///
/// Dashboards that never heartbeat are kept for the life of the connection.
/// Once a dashboard has sent one heartbeat it must keep sending them, at
/// least one per deadline window.
#[derive(Debug, Default)]
struct HeartbeatWatch {
    opted_in: bool,
    beat_this_window: bool,
}

impl HeartbeatWatch {
    /// 1.5 times the interval advertised in READY.
    fn deadline() -> Duration {
        Duration::from_millis(HEARTBEAT_INTERVAL_MS * 3 / 2)
    }

    fn beat(&mut self) {
        self.opted_in = true;
        self.beat_this_window = true;
    }

    /// Called once per deadline window. Starts the next window.
    fn expired(&mut self) -> bool {
        let expired = self.opted_in && !self.beat_this_window;
        self.beat_this_window = false;
        expired
    }
}

/// What the loop should do after one dashboard message.
enum Reply {
    Nothing,
    Heartbeat(GatewayMessage),
    Send(GatewayMessage),
    Close(u16, &'static str),
}

/// Decode one dashboard text frame and apply it to the session.
fn apply_client_message(session: &mut DashboardSession, text: &str) -> Reply {
    let Ok(client_msg) = serde_json::from_str::<ClientMessage>(text) else {
        return Reply::Close(CLOSE_UNKNOWN_ERROR, "Invalid JSON");
    };

    match client_msg.op {
        OP_HEARTBEAT => {
            let seq = serde_json::from_value::<HeartbeatPayload>(client_msg.d)
                .map(|p| p.seq)
                .unwrap_or(0);
            Reply::Heartbeat(GatewayMessage::heartbeat_ack(seq))
        }
        OP_TOGGLE_VISIBILITY => {
            match serde_json::from_value::<ToggleVisibilityPayload>(client_msg.d) {
                Ok(toggle) => session
                    .toggle_visibility(&toggle.event_name, toggle.visible)
                    .map_or(Reply::Nothing, Reply::Send),
                Err(_) => Reply::Close(CLOSE_UNKNOWN_ERROR, "Invalid payload"),
            }
        }
        OP_REMOVE_ROOM_LOG => match serde_json::from_value::<RemoveRoomLogPayload>(client_msg.d) {
            Ok(remove) => {
                session.remove_room_log(&remove.room_id);
                Reply::Nothing
            }
            Err(_) => Reply::Close(CLOSE_UNKNOWN_ERROR, "Invalid payload"),
        },
        _ => Reply::Close(CLOSE_UNKNOWN_OPCODE, "Unknown opcode"),
    }
}

/// Send an instruction batch in order, stopping at the first failure.
async fn send_all(ws_tx: &mut WsSink, batch: Vec<GatewayMessage>) -> Result<(), axum::Error> {
    for msg in &batch {
        send_message(ws_tx, msg).await?;
    }
    Ok(())
}

/// Serialize and send one gateway message as a text frame.
async fn send_message(ws_tx: &mut WsSink, msg: &GatewayMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    ws_tx.send(Message::Text(json.into())).await
}

/// Send a WebSocket close frame with a code and reason.
async fn send_close(ws_tx: &mut WsSink, code: u16, reason: &str) -> Result<(), axum::Error> {
    let close_msg = Message::Close(Some(axum::extract::ws::CloseFrame {
        code,
        reason: reason.to_string().into(),
    }));
    ws_tx.send(close_msg).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomwatch_engine::EngineConfig;

    fn session() -> DashboardSession {
        DashboardSession::new("dash_test".into(), Vec::new(), EngineConfig::default())
    }

    #[test]
    fn silent_dashboard_never_expires() {
        let mut watch = HeartbeatWatch::default();
        for _ in 0..10 {
            assert!(!watch.expired());
        }
    }

    #[test]
    fn heartbeating_dashboard_expires_after_a_missed_window() {
        let mut watch = HeartbeatWatch::default();
        watch.beat();
        assert!(!watch.expired());
        watch.beat();
        assert!(!watch.expired());
        assert!(watch.expired());
    }

    #[test]
    fn heartbeat_without_payload_acks_zero() {
        let mut session = session();
        match apply_client_message(&mut session, r#"{"op":1}"#) {
            Reply::Heartbeat(ack) => assert_eq!(ack.d["ack"], 0),
            _ => panic!("expected heartbeat ack"),
        }
    }

    #[test]
    fn malformed_toggle_closes() {
        let mut session = session();
        assert!(matches!(
            apply_client_message(&mut session, r#"{"op":5,"d":{"visible":true}}"#),
            Reply::Close(CLOSE_UNKNOWN_ERROR, _)
        ));
    }

    #[test]
    fn remove_has_no_reply() {
        let mut session = session();
        assert!(matches!(
            apply_client_message(&mut session, r#"{"op":8,"d":{"roomId":"R1"}}"#),
            Reply::Nothing
        ));
    }

    #[test]
    fn unknown_op_and_bad_json_close() {
        let mut session = session();
        assert!(matches!(
            apply_client_message(&mut session, r#"{"op":42}"#),
            Reply::Close(CLOSE_UNKNOWN_OPCODE, _)
        ));
        assert!(matches!(
            apply_client_message(&mut session, "{"),
            Reply::Close(CLOSE_UNKNOWN_ERROR, _)
        ));
    }
}
