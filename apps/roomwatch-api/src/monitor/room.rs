//! A single room's upstream connection.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use roomwatch_common::id::{prefix, prefixed_ulid};
use roomwatch_common::{RoomEnvelope, RoomRef};
use tokio::time;

use crate::config::Config;
use crate::gateway::fanout::RoomBroadcast;

use super::protocol::{self, GAME_NAMESPACE_CONNECT, PONG};
use super::registry::MonitorRegistry;
use super::{connect_upstream, next_text, send_text, MonitorError};

/// Joins one upstream room and relays its frames to the broadcast hub.
pub struct RoomMonitor {
    monitor_id: String,
    room: RoomRef,
    upstream_url: String,
    join_delay: Duration,
    broadcast: Arc<RoomBroadcast>,
    registry: Arc<MonitorRegistry>,
}

impl RoomMonitor {
    pub fn new(
        room: RoomRef,
        config: &Config,
        broadcast: Arc<RoomBroadcast>,
        registry: Arc<MonitorRegistry>,
    ) -> Self {
        Self {
            monitor_id: prefixed_ulid(prefix::MONITOR),
            room,
            upstream_url: config.upstream_url.clone(),
            join_delay: config.join_delay(),
            broadcast,
            registry,
        }
    }

    /// Keep the room connected for the life of the process, reconnecting
    /// after `retry` whenever the upstream connection ends.
    pub async fn run(self, retry: Duration) {
        loop {
            self.registry.mark_connecting(&self.room.id);
            match self.connect().await {
                Ok(()) => tracing::info!(
                    monitor_id = %self.monitor_id,
                    room_id = %self.room.id,
                    "upstream closed room connection"
                ),
                Err(err) => tracing::warn!(
                    monitor_id = %self.monitor_id,
                    room_id = %self.room.id,
                    %err,
                    "room monitor failed"
                ),
            }
            self.registry.mark_disconnected(&self.room.id);
            time::sleep(retry).await;
        }
    }

    /// One connection: join the game namespace, enter the room, then relay
    /// until the upstream closes. A clean close returns `Ok`.
    pub async fn connect(&self) -> Result<(), MonitorError> {
        let url = protocol::ws_url(&self.upstream_url, Utc::now());
        let mut ws = connect_upstream(&url).await?;

        // Engine.IO open packet.
        next_text(&mut ws).await?;
        send_text(&mut ws, GAME_NAMESPACE_CONNECT).await?;
        time::sleep(self.join_delay).await;
        send_text(&mut ws, protocol::join_room_payload(&self.room.id)).await?;

        self.registry.mark_connected(&self.room.id);
        tracing::info!(
            monitor_id = %self.monitor_id,
            room_id = %self.room.id,
            "room monitor joined"
        );

        loop {
            let msg = match next_text(&mut ws).await {
                Ok(msg) => msg,
                Err(MonitorError::Closed) => return Ok(()),
                Err(err) => return Err(err),
            };
            if protocol::is_ping(&msg) {
                send_text(&mut ws, PONG).await?;
                continue;
            }
            self.relay(&msg);
        }
    }

    /// Publish one upstream frame if it decodes as a room event.
    pub fn relay(&self, msg: &str) -> bool {
        let frame = match roomwatch_engine::decode(msg) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::trace!(room_id = %self.room.id, %err, "not relaying upstream frame");
                return false;
            }
        };

        self.registry.record_frame(&self.room.id, &frame.event_name);
        self.broadcast.dispatch(RoomEnvelope::new(
            self.room.clone(),
            msg,
            Some(frame.event_name),
        ));
        true
    }
}
