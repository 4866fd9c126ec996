//! Known channels
//!
//! Each `[[channels]]` entry seeds the access hash store so forwards can
//! address the channel before any update about it has been seen.

use serde::Deserialize;

/// A channel the account can reach
///
/// # Example
///
/// ```toml
/// [[channels]]
/// id = -1001234
/// access_hash = 8812345678
/// title = "Announcements"
/// username = "announce"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Channel id
    pub id: i64,

    /// Access hash required to address the channel
    pub access_hash: i64,

    /// Display title (informational)
    #[serde(default)]
    pub title: Option<String>,

    /// Public username without the leading `@` (informational)
    #[serde(default)]
    pub username: Option<String>,
}

impl ChannelConfig {
    /// Human-readable label: title, then `@username`, then the bare id
    pub fn label(&self) -> String {
        match (&self.title, &self.username) {
            (Some(title), _) => title.clone(),
            (None, Some(username)) => format!("@{}", username),
            (None, None) => self.id.to_string(),
        }
    }
}
