//! Channel, group and message identifiers
//!
//! Thin `Copy` newtypes over the integers the transport hands us, so a
//! channel id can never be passed where a group id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Channel identifier (source or destination)
///
/// # Example
///
/// ```
/// use relay_routing::ChannelId;
///
/// let id: ChannelId = "1001".parse().unwrap();
/// assert_eq!(id, ChannelId::new(1001));
/// assert_eq!(id.to_string(), "1001");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(i64);

impl ChannelId {
    /// Create a channel ID from its raw value
    #[inline]
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw value
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChannelId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<i64> for ChannelId {
    #[inline]
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

impl From<ChannelId> for i64 {
    #[inline]
    fn from(id: ChannelId) -> Self {
        id.0
    }
}

/// Album/group identifier
///
/// Messages posted together share a group id. Messages posted alone carry
/// `GroupId::NONE`; they still occupy a group slot of their own in the
/// accumulator, keyed by that value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(i64);

impl GroupId {
    /// Sentinel for messages that are not part of an album
    pub const NONE: GroupId = GroupId(0);

    /// Create a group ID from its raw value
    #[inline]
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw value
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether this is the "no group" sentinel
    #[inline]
    #[must_use]
    pub const fn is_singleton(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for GroupId {
    #[inline]
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

/// Message identifier, unique within its channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(i32);

impl MessageId {
    /// Create a message ID from its raw value
    #[inline]
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Get the raw value
    #[inline]
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for MessageId {
    #[inline]
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_id_parse() {
        assert_eq!("42".parse::<ChannelId>().unwrap(), ChannelId::new(42));
        assert_eq!("-1001".parse::<ChannelId>().unwrap(), ChannelId::new(-1001));
        assert!("abc".parse::<ChannelId>().is_err());
        assert!("".parse::<ChannelId>().is_err());
    }

    #[test]
    fn test_channel_id_display() {
        assert_eq!(ChannelId::new(123).to_string(), "123");
    }

    #[test]
    fn test_channel_id_conversions() {
        let id: ChannelId = 7i64.into();
        let raw: i64 = id.into();
        assert_eq!(raw, 7);
        assert_eq!(id.get(), 7);
    }

    #[test]
    fn test_group_id_singleton() {
        assert!(GroupId::NONE.is_singleton());
        assert!(GroupId::default().is_singleton());
        assert!(!GroupId::new(13_000_000_000).is_singleton());
    }

    #[test]
    fn test_group_ordering() {
        assert!(GroupId::new(8) < GroupId::new(9));
    }

    #[test]
    fn test_message_id() {
        let id: MessageId = 11.into();
        assert_eq!(id.get(), 11);
        assert_eq!(id.to_string(), "11");
    }

    #[test]
    fn test_serde_transparent() {
        let id: ChannelId = serde_json::from_str("1001").unwrap();
        assert_eq!(id, ChannelId::new(1001));
        assert_eq!(serde_json::to_string(&MessageId::new(5)).unwrap(), "5");
        let group: GroupId = serde_json::from_str("0").unwrap();
        assert!(group.is_singleton());
    }

    #[test]
    fn test_size() {
        assert_eq!(std::mem::size_of::<ChannelId>(), 8);
        assert_eq!(std::mem::size_of::<MessageId>(), 4);
    }
}
