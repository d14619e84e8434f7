pub mod config;
pub mod error;
pub mod gateway;
pub mod monitor;
pub mod routes;

use std::sync::Arc;

use config::Config;
use gateway::fanout::RoomBroadcast;
use monitor::registry::MonitorRegistry;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub broadcast: Arc<RoomBroadcast>,
    pub monitors: Arc<MonitorRegistry>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            broadcast: Arc::new(RoomBroadcast::new()),
            monitors: Arc::new(MonitorRegistry::new()),
        }
    }
}
