//! Subscription handling: turns the first dashboard message into a session.

use roomwatch_common::id::{prefix, prefixed_ulid};
use roomwatch_engine::EngineConfig;

use crate::AppState;

use super::events::{EventName, GatewayMessage, SubscribePayload};
use super::session::DashboardSession;

/// Heartbeat interval sent to dashboards in the READY payload (ms).
pub const HEARTBEAT_INTERVAL_MS: u64 = 41250;

/// Process the subscription message. Returns a (`DashboardSession`, READY message).
pub fn handle_subscribe(
    state: &AppState,
    payload: SubscribePayload,
) -> (DashboardSession, GatewayMessage) {
    let session_id = prefixed_ulid(prefix::DASHBOARD);

    if !payload.message_types.is_empty() {
        tracing::debug!(
            %session_id,
            message_types = ?payload.message_types,
            "subscription types recorded; the relayed stream is not filtered"
        );
    }

    let ready_data = serde_json::json!({
        "session_id": session_id,
        "heartbeat_interval": HEARTBEAT_INTERVAL_MS,
        "monitored_rooms": state.monitors.len(),
        "message_types": payload.message_types,
    });

    let config = EngineConfig {
        room_url_base: state.config.room_url_base.clone(),
    };
    let mut session = DashboardSession::new(session_id, payload.message_types, config);
    let seq = session.next_seq();
    let ready_msg = GatewayMessage::dispatch(EventName::READY, seq, ready_data);

    (session, ready_msg)
}
