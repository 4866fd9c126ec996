//! Inbound message updates
//!
//! One JSON object per line:
//!
//! ```json
//! {"channel": -1001, "group": 9, "message": 11, "date": 1700000000}
//! ```
//!
//! `group` may be omitted or `0` for a message outside any album.

use relay_pipeline::Timestamp;
use relay_routing::{ChannelId, GroupId, MessageId};
use serde::Deserialize;

/// A new channel message as seen by the update stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MessageEvent {
    /// Channel the message was posted in
    pub channel: ChannelId,
    /// Album id, `0` when the message stands alone
    #[serde(default)]
    pub group: GroupId,
    /// Message id within the channel
    pub message: MessageId,
    /// Message date (unix seconds)
    pub date: Timestamp,
}

/// Parse one input line
///
/// Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> serde_json::Result<Option<MessageEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}
