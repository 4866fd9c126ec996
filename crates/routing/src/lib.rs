//! Relay - Routing
//!
//! Immutable source→destination channel routing, compiled once at startup.
//!
//! # Design
//!
//! The routing map is a single configuration string:
//!
//! ```text
//! dest:src[,src...]|dest:src[,src...]|...
//! ```
//!
//! Parsing rejects every configuration that could forward a message twice or
//! in a loop:
//!
//! - a source listed more than once (ambiguous destination)
//! - a channel that is both a source and a destination (cycle)
//!
//! Once built, `RoutingTable` is read-only and lookups are O(1).
//!
//! # Example
//!
//! ```
//! use relay_routing::{ChannelId, RoutingTable};
//!
//! let table: RoutingTable = "100:1,2|200:3".parse().unwrap();
//!
//! assert_eq!(table.destination(ChannelId::new(1)), Some(ChannelId::new(100)));
//! assert_eq!(table.destination(ChannelId::new(3)), Some(ChannelId::new(200)));
//! assert_eq!(table.destination(ChannelId::new(100)), None);
//! ```

mod error;
mod ids;
mod table;


pub use error::{Result, RoutingError};
pub use ids::{ChannelId, GroupId, MessageId};
pub use table::{RoutingTable, RoutingTableBuilder};

/// Separator between `dest:sources` groups
pub const GROUP_DELIMITER: char = '|';

/// Separator between a destination and its sources
pub const ROUTE_DELIMITER: char = ':';

/// Separator between sources of one group
pub const SOURCE_DELIMITER: char = ',';
