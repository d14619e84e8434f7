#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use roomwatch_api::config::Config;
use roomwatch_api::AppState;
use tokio::net::TcpStream;
use tokio::time;
use tokio_tungstenite::{tungstenite, MaybeTlsStream, WebSocketStream};

pub type ClientWs = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Config that never touches the public upstream.
pub fn test_config() -> Config {
    Config {
        discover_lobby: false,
        join_delay_ms: 0,
        monitor_retry_secs: 1,
        ..Config::default()
    }
}

pub fn test_state() -> AppState {
    AppState::new(test_config())
}

/// Start the full router on an ephemeral port. The server runs in the background.
pub async fn start_server(state: AppState) -> SocketAddr {
    let app = roomwatch_api::routes::router().with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

/// Next frame from the socket, failing the test after five seconds.
pub async fn next_message<S>(ws: &mut S) -> tungstenite::Message
where
    S: Stream<Item = Result<tungstenite::Message, tungstenite::Error>> + Unpin,
{
    time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timeout waiting for message")
        .expect("stream ended")
        .expect("ws read error")
}

/// Next text frame parsed as JSON.
pub async fn next_json<S>(ws: &mut S) -> serde_json::Value
where
    S: Stream<Item = Result<tungstenite::Message, tungstenite::Error>> + Unpin,
{
    let msg = next_message(ws).await;
    let text = msg.into_text().expect("not text");
    serde_json::from_str(&text).expect("parse JSON")
}
