use std::str::FromStr;
use std::time::Duration;

use roomwatch_engine::engine::DEFAULT_ROOM_URL_BASE;

/// Roomwatch configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Upstream socket.io endpoint, without query string.
    pub upstream_url: String,
    /// Prefix for links to a room's public page.
    pub room_url_base: String,
    /// Ask the upstream lobby for open rooms at startup.
    pub discover_lobby: bool,
    /// Room ids monitored regardless of lobby discovery.
    pub watch_rooms: Vec<String>,
    /// Pause between joining the game namespace and entering the room (ms).
    pub join_delay_ms: u64,
    /// Delay before a failed room monitor reconnects (seconds).
    pub monitor_retry_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            upstream_url: "wss://richup.io/socket.io/".to_string(),
            room_url_base: DEFAULT_ROOM_URL_BASE.to_string(),
            discover_lobby: true,
            watch_rooms: Vec::new(),
            join_delay_ms: 200,
            monitor_retry_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: parsed_var("PORT").unwrap_or(defaults.port),
            upstream_url: std::env::var("UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            room_url_base: std::env::var("ROOM_URL_BASE").unwrap_or(defaults.room_url_base),
            discover_lobby: std::env::var("DISCOVER_LOBBY")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.discover_lobby),
            watch_rooms: std::env::var("WATCH_ROOMS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            join_delay_ms: parsed_var("JOIN_DELAY_MS").unwrap_or(defaults.join_delay_ms),
            monitor_retry_secs: parsed_var("MONITOR_RETRY_SECS")
                .unwrap_or(defaults.monitor_retry_secs),
        }
    }

    pub fn join_delay(&self) -> Duration {
        Duration::from_millis(self.join_delay_ms)
    }

    pub fn monitor_retry(&self) -> Duration {
        Duration::from_secs(self.monitor_retry_secs)
    }
}

fn parsed_var<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
