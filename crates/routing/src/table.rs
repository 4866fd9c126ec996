//! Routing table for O(1) source→destination lookup
//!
//! The routing table is compiled once at startup from the routing map string
//! and never mutated afterwards. Validation happens entirely at build time so
//! the forwarding path only ever sees a consistent table.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, RoutingError};
use crate::{ChannelId, GROUP_DELIMITER, ROUTE_DELIMITER, SOURCE_DELIMITER};

/// Immutable source→destination channel mapping
///
/// # Invariants
///
/// - every source maps to exactly one destination
/// - no channel is both a source and a destination
///
/// # Example
///
/// ```
/// use relay_routing::{ChannelId, RoutingTable};
///
/// let table = RoutingTable::parse("100:1,2|200:3").unwrap();
///
/// assert_eq!(table.len(), 3);
/// assert!(table.is_source(ChannelId::new(2)));
/// assert!(table.is_destination(ChannelId::new(200)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    /// source → destination
    routes: HashMap<ChannelId, ChannelId>,
}

impl RoutingTable {
    /// Create an empty routing table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a routing map
    ///
    /// Format: `dest:src[,src...]|dest:src[,src...]|...`, integer channel
    /// ids, whitespace around tokens ignored.
    ///
    /// # Errors
    ///
    /// - `Empty` if the map has no content
    /// - `Format` for malformed groups or non-integer ids
    /// - `DuplicateSource` if a source appears more than once
    /// - `CyclicRoute` if a channel is both a source and a destination
    pub fn parse(map: &str) -> Result<Self> {
        let map = map.trim();
        if map.is_empty() {
            return Err(RoutingError::Empty);
        }

        let mut builder = RoutingTableBuilder::new();

        for group in map.split(GROUP_DELIMITER) {
            let group = group.trim();
            let mut parts = group.split(ROUTE_DELIMITER);

            let (Some(dest), Some(sources), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(RoutingError::format(
                    group,
                    group,
                    "expected 'dest:src[,src...]'",
                ));
            };

            let dest = parse_channel(group, dest)?;
            let sources = sources
                .split(SOURCE_DELIMITER)
                .map(|source| parse_channel(group, source))
                .collect::<Result<Vec<_>>>()?;

            builder.insert_group(group, dest, &sources)?;
        }

        Ok(builder.build())
    }

    /// Destination for a source channel, if it is routed
    #[inline]
    pub fn destination(&self, source: ChannelId) -> Option<ChannelId> {
        self.routes.get(&source).copied()
    }

    /// Check if a channel is a configured source
    #[inline]
    pub fn is_source(&self, channel: ChannelId) -> bool {
        self.routes.contains_key(&channel)
    }

    /// Check if a channel is a configured destination
    pub fn is_destination(&self, channel: ChannelId) -> bool {
        self.routes.values().any(|&dest| dest == channel)
    }

    /// All source channels, sorted
    pub fn sources(&self) -> Vec<ChannelId> {
        let mut sources: Vec<ChannelId> = self.routes.keys().copied().collect();
        sources.sort_unstable();
        sources
    }

    /// All destination channels, sorted and deduplicated
    pub fn destinations(&self) -> Vec<ChannelId> {
        let mut destinations: Vec<ChannelId> = self.routes.values().copied().collect();
        destinations.sort_unstable();
        destinations.dedup();
        destinations
    }

    /// Number of routed sources
    #[inline]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if no sources are routed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterate over `(source, destination)` pairs in no particular order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (ChannelId, ChannelId)> + '_ {
        self.routes.iter().map(|(&src, &dst)| (src, dst))
    }
}

impl FromStr for RoutingTable {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Renders the table back into canonical routing map form
///
/// Groups are ordered by destination and sources sorted, so the output is
/// stable and parses back into an equal table.
impl fmt::Display for RoutingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut groups: BTreeMap<ChannelId, Vec<ChannelId>> = BTreeMap::new();
        for (src, dst) in self.iter() {
            groups.entry(dst).or_default().push(src);
        }

        for (i, (dst, sources)) in groups.iter_mut().enumerate() {
            if i > 0 {
                write!(f, "{GROUP_DELIMITER}")?;
            }
            sources.sort_unstable();
            write!(f, "{dst}{ROUTE_DELIMITER}")?;
            for (j, src) in sources.iter().enumerate() {
                if j > 0 {
                    write!(f, "{SOURCE_DELIMITER}")?;
                }
                write!(f, "{src}")?;
            }
        }
        Ok(())
    }
}

/// Builder that validates routing groups as they are added
///
/// `RoutingTable::parse` is built on top of this; use it directly when the
/// routes come from somewhere other than a map string.
#[derive(Debug, Default)]
pub struct RoutingTableBuilder {
    /// source → destination
    routes: HashMap<ChannelId, ChannelId>,

    /// Every destination seen so far
    destinations: HashSet<ChannelId>,
}

impl RoutingTableBuilder {
    /// Create a new builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route every channel in `sources` to `dest`
    ///
    /// On error the builder is left unchanged.
    ///
    /// # Errors
    ///
    /// `DuplicateSource` or `CyclicRoute` under the same rules as
    /// `RoutingTable::parse`.
    pub fn add_group(&mut self, dest: ChannelId, sources: &[ChannelId]) -> Result<&mut Self> {
        let label = group_label(dest, sources);
        self.insert_group(&label, dest, sources)?;
        Ok(self)
    }

    /// Validate the whole group first, then commit it
    fn insert_group(&mut self, group: &str, dest: ChannelId, sources: &[ChannelId]) -> Result<()> {
        if self.routes.contains_key(&dest) {
            return Err(RoutingError::cyclic_route(dest, group));
        }

        let mut seen: HashMap<ChannelId, ChannelId> = HashMap::with_capacity(sources.len());
        for &source in sources {
            if source == dest || self.destinations.contains(&source) {
                return Err(RoutingError::cyclic_route(source, group));
            }
            if let Some(&first) = self.routes.get(&source).or_else(|| seen.get(&source)) {
                return Err(RoutingError::duplicate_source(source, first, dest));
            }
            seen.insert(source, dest);
        }

        self.routes.extend(seen);
        self.destinations.insert(dest);
        Ok(())
    }

    /// Build the routing table
    #[must_use]
    pub fn build(self) -> RoutingTable {
        RoutingTable {
            routes: self.routes,
        }
    }
}

fn parse_channel(group: &str, token: &str) -> Result<ChannelId> {
    let token = token.trim();
    token
        .parse()
        .map_err(|_| RoutingError::format(group, token, "channel id must be an integer"))
}

fn group_label(dest: ChannelId, sources: &[ChannelId]) -> String {
    let sources: Vec<String> = sources.iter().map(ChannelId::to_string).collect();
    format!(
        "{dest}{ROUTE_DELIMITER}{}",
        sources.join(&SOURCE_DELIMITER.to_string())
    )
}
