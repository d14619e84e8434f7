//! One-shot lobby discovery.

use std::time::Duration;

use chrono::Utc;
use roomwatch_common::RoomRef;
use tokio::time;

use super::protocol::{self, LOBBY_NAMESPACE_CONNECT, LOBBY_NUDGE, PONG};
use super::{connect_upstream, next_text, send_text, MonitorError};

/// How long to wait for the lobby to list its rooms.
const LOBBY_TIMEOUT: Duration = Duration::from_secs(30);

/// Ask the upstream lobby for its open rooms.
pub async fn discover_rooms(upstream_url: &str) -> Result<Vec<RoomRef>, MonitorError> {
    time::timeout(LOBBY_TIMEOUT, fetch_lobby_rooms(upstream_url))
        .await
        .map_err(|_| MonitorError::Timeout)?
}

async fn fetch_lobby_rooms(upstream_url: &str) -> Result<Vec<RoomRef>, MonitorError> {
    let url = protocol::ws_url(upstream_url, Utc::now());
    let mut ws = connect_upstream(&url).await?;

    // Engine.IO open packet.
    next_text(&mut ws).await?;
    send_text(&mut ws, LOBBY_NAMESPACE_CONNECT).await?;
    send_text(&mut ws, LOBBY_NUDGE).await?;

    loop {
        let msg = next_text(&mut ws).await?;
        if protocol::is_ping(&msg) {
            send_text(&mut ws, PONG).await?;
            continue;
        }
        if let Some(rooms) = protocol::parse_lobby_rooms(&msg) {
            let _ = ws.close(None).await;
            return Ok(rooms);
        }
    }
}
