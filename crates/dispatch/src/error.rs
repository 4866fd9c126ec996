//! Dispatch error types

use std::fmt;

use thiserror::Error;

use relay_routing::ChannelId;

/// Result type for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Which side of a forward is missing something
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Channel the messages come from
    Source,
    /// Channel the messages go to
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Destination => f.write_str("destination"),
        }
    }
}

/// Errors raised while forwarding a released group
///
/// None of these ever reach the scheduler; the dispatcher logs them and
/// drops the group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Released channel has no destination configured
    #[error("source channel {channel} has no destination configured")]
    Unrouted {
        /// Source channel of the released group
        channel: ChannelId,
    },

    /// No access hash is known for one side of the forward
    #[error("{endpoint} channel {channel} access hash unknown")]
    MissingAccessHash {
        /// Channel without credentials
        channel: ChannelId,
        /// Which side it is on
        endpoint: Endpoint,
    },

    /// The transport rejected or failed the forward call
    #[error("forward failed: {0}")]
    Transport(String),
}

impl DispatchError {
    /// Create an Unrouted error
    #[inline]
    pub fn unrouted(channel: ChannelId) -> Self {
        Self::Unrouted { channel }
    }

    /// Create a MissingAccessHash error
    #[inline]
    pub fn missing_access_hash(channel: ChannelId, endpoint: Endpoint) -> Self {
        Self::MissingAccessHash { channel, endpoint }
    }

    /// Create a Transport error
    #[inline]
    pub fn transport(message: impl fmt::Display) -> Self {
        Self::Transport(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrouted_error() {
        let err = DispatchError::unrouted(ChannelId::new(5));
        assert!(err.to_string().contains("channel 5"));
        assert!(err.to_string().contains("no destination"));
    }

    #[test]
    fn test_missing_access_hash_error() {
        let err = DispatchError::missing_access_hash(ChannelId::new(100), Endpoint::Destination);
        assert_eq!(err.to_string(), "destination channel 100 access hash unknown");

        let err = DispatchError::missing_access_hash(ChannelId::new(1), Endpoint::Source);
        assert!(err.to_string().starts_with("source channel 1"));
    }

    #[test]
    fn test_transport_error() {
        let err = DispatchError::transport("FLOOD_WAIT_30");
        assert!(err.to_string().contains("FLOOD_WAIT_30"));
    }
}
