use ulid::Ulid;

/// Generates a new ULID-based ID with the given prefix.
///
/// # Examples
/// ```
/// let id = roomwatch_common::id::prefixed_ulid("dash");
/// assert!(id.starts_with("dash_"));
/// ```
pub fn prefixed_ulid(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new().to_string())
}

/// Well-known ID prefixes.
pub mod prefix {
    /// A dashboard gateway connection.
    pub const DASHBOARD: &str = "dash";
    /// An upstream room monitor task.
    pub const MONITOR: &str = "mon";
}
