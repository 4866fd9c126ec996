//! Routing error types

use thiserror::Error;

use crate::ChannelId;

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, RoutingError>;

/// Errors that can occur while compiling a routing map
///
/// All of these are configuration errors: fatal at startup, no partial
/// table is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The routing map is empty
    #[error("routing map is empty, expected 'dest:src[,src...]|...'")]
    Empty,

    /// A group or identifier could not be parsed
    #[error("group '{group}': invalid token '{token}': {reason}")]
    Format {
        /// Group the token belongs to
        group: String,
        /// Offending token
        token: String,
        /// What was expected
        reason: &'static str,
    },

    /// A source channel is mapped to more than one destination
    #[error("source channel {channel} is mapped to both {first} and {second}")]
    DuplicateSource {
        /// The repeated source channel
        channel: ChannelId,
        /// Destination it was first mapped to
        first: ChannelId,
        /// Destination of the conflicting group
        second: ChannelId,
    },

    /// A channel is used both as a source and as a destination
    #[error("group '{group}': channel {channel} is both a source and a destination, cyclic forwards are not supported")]
    CyclicRoute {
        /// The channel on both sides
        channel: ChannelId,
        /// Group where the cycle was detected
        group: String,
    },
}

impl RoutingError {
    /// Create a Format error
    #[inline]
    pub fn format(group: impl Into<String>, token: impl Into<String>, reason: &'static str) -> Self {
        Self::Format {
            group: group.into(),
            token: token.into(),
            reason,
        }
    }

    /// Create a DuplicateSource error
    #[inline]
    pub fn duplicate_source(channel: ChannelId, first: ChannelId, second: ChannelId) -> Self {
        Self::DuplicateSource {
            channel,
            first,
            second,
        }
    }

    /// Create a CyclicRoute error
    #[inline]
    pub fn cyclic_route(channel: ChannelId, group: impl Into<String>) -> Self {
        Self::CyclicRoute {
            channel,
            group: group.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_error() {
        let err = RoutingError::Empty;
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_format_error_names_token() {
        let err = RoutingError::format("100:abc", "abc", "channel id must be an integer");
        assert!(err.to_string().contains("'abc'"));
        assert!(err.to_string().contains("100:abc"));
        assert!(err.to_string().contains("integer"));
    }

    #[test]
    fn test_duplicate_source_error_names_destinations() {
        let err =
            RoutingError::duplicate_source(ChannelId::new(1), ChannelId::new(100), ChannelId::new(200));
        let msg = err.to_string();
        assert!(msg.contains("source channel 1"));
        assert!(msg.contains("100"));
        assert!(msg.contains("200"));
    }

    #[test]
    fn test_cyclic_route_error() {
        let err = RoutingError::cyclic_route(ChannelId::new(100), "1:100");
        assert!(err.to_string().contains("channel 100"));
        assert!(err.to_string().contains("cyclic"));
    }
}
