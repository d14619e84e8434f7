//! Upstream room monitors: discover rooms, join them and relay their frames.

pub mod lobby;
pub mod protocol;
pub mod registry;
pub mod room;

use futures_util::{SinkExt, StreamExt};
use roomwatch_common::RoomRef;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::AppState;

use room::RoomMonitor;

type Upstream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Errors from an upstream connection. Never fatal: monitors log and retry.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
    #[error("upstream closed the connection")]
    Closed,
    #[error("timed out waiting for upstream")]
    Timeout,
}

/// Collect the rooms to watch and spawn one monitor task per room.
///
/// Rooms from `WATCH_ROOMS` come first; lobby discovery adds to them. A room
/// listed twice is monitored once.
pub async fn start(state: AppState) -> Vec<JoinHandle<()>> {
    let config = state.config.clone();

    let mut rooms: Vec<RoomRef> = config
        .watch_rooms
        .iter()
        .map(|id| RoomRef::new(id.clone(), None))
        .collect();

    if config.discover_lobby {
        match lobby::discover_rooms(&config.upstream_url).await {
            Ok(found) => {
                tracing::info!(rooms = found.len(), "lobby rooms discovered");
                rooms.extend(found);
            }
            Err(err) => tracing::warn!(%err, "lobby discovery failed"),
        }
    }

    rooms
        .into_iter()
        .filter(|room| state.monitors.register(room))
        .map(|room| {
            let monitor = RoomMonitor::new(
                room,
                &config,
                state.broadcast.clone(),
                state.monitors.clone(),
            );
            tokio::spawn(monitor.run(config.monitor_retry()))
        })
        .collect()
}

/// Install the process-wide rustls provider used for `wss://` upstreams.
/// Safe to call repeatedly; only the first call installs.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Open an upstream WebSocket.
async fn connect_upstream(url: &str) -> Result<Upstream, MonitorError> {
    install_crypto_provider();
    let (ws, _) = connect_async(url).await?;
    Ok(ws)
}

/// Next text frame, skipping control frames.
async fn next_text(ws: &mut Upstream) -> Result<String, MonitorError> {
    while let Some(msg) = ws.next().await {
        match msg? {
            Message::Text(text) => return Ok(text.as_str().to_string()),
            Message::Close(_) => return Err(MonitorError::Closed),
            _ => continue,
        }
    }
    Err(MonitorError::Closed)
}

async fn send_text(ws: &mut Upstream, text: impl Into<String>) -> Result<(), MonitorError> {
    ws.send(Message::Text(text.into().into())).await?;
    Ok(())
}
