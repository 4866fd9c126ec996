//! Pending groups and the per-channel buffer that holds them

use std::collections::HashMap;

use relay_routing::{GroupId, MessageId};

/// Unix timestamp (seconds) as delivered by the inbound feed
pub type Timestamp = i64;

/// A group of messages waiting to be released
///
/// Never empty while it sits in a buffer: it is created by the first
/// message of its group and removed whole on release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGroup {
    /// Album id (or `GroupId::NONE` for a lone message)
    pub group_id: GroupId,

    /// Message ids in arrival order
    pub message_ids: Vec<MessageId>,

    /// Timestamp of the first message; later messages never move it
    pub first_seen: Timestamp,
}

impl PendingGroup {
    fn new(group_id: GroupId, first: MessageId, first_seen: Timestamp) -> Self {
        Self {
            group_id,
            message_ids: vec![first],
            first_seen,
        }
    }

    /// Release ordering key: oldest first, ties broken by group id
    #[inline]
    fn age_key(&self) -> (Timestamp, GroupId) {
        (self.first_seen, self.group_id)
    }
}

/// All pending groups of one channel
#[derive(Debug, Default)]
pub struct ChannelBuffer {
    groups: HashMap<GroupId, PendingGroup>,
}

impl ChannelBuffer {
    /// Create an empty buffer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to its group, opening the group if needed
    ///
    /// Returns `true` if this message opened a new group.
    pub fn append(&mut self, group_id: GroupId, message: MessageId, seen_at: Timestamp) -> bool {
        match self.groups.get_mut(&group_id) {
            Some(group) => {
                group.message_ids.push(message);
                false
            }
            None => {
                self.groups
                    .insert(group_id, PendingGroup::new(group_id, message, seen_at));
                true
            }
        }
    }

    /// Remove and return the oldest group
    ///
    /// O(n) in the number of pending groups.
    pub fn take_oldest(&mut self) -> Option<PendingGroup> {
        let oldest = self.groups.values().min_by_key(|g| g.age_key())?.group_id;
        self.groups.remove(&oldest)
    }

    /// Remove up to `limit` groups, oldest first
    pub fn take_oldest_n(&mut self, limit: usize) -> Vec<PendingGroup> {
        let mut taken = Vec::with_capacity(limit.min(self.groups.len()));
        while taken.len() < limit {
            match self.take_oldest() {
                Some(group) => taken.push(group),
                None => break,
            }
        }
        taken
    }

    /// Get a pending group by id
    #[cfg(test)]
    fn get(&self, group_id: GroupId) -> Option<&PendingGroup> {
        self.groups.get(&group_id)
    }

    /// Number of pending groups
    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if no groups are pending
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of pending messages across all groups
    #[cfg(test)]
    fn message_count(&self) -> usize {
        self.groups.values().map(|g| g.message_ids.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: i32) -> MessageId {
        MessageId::new(id)
    }

    #[test]
    fn test_append_opens_group_once() {
        let mut buffer = ChannelBuffer::new();

        assert!(buffer.append(GroupId::new(9), msg(11), 0));
        assert!(!buffer.append(GroupId::new(9), msg(12), 1));

        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.message_count(), 2);
    }

    #[test]
    fn test_append_keeps_arrival_order_and_first_seen() {
        let mut buffer = ChannelBuffer::new();
        buffer.append(GroupId::new(9), msg(12), 5);
        buffer.append(GroupId::new(9), msg(11), 7);
        buffer.append(GroupId::new(9), msg(13), 2);

        let group = buffer.get(GroupId::new(9)).unwrap();
        assert_eq!(group.message_ids, vec![msg(12), msg(11), msg(13)]);
        assert_eq!(group.first_seen, 5);
    }

    #[test]
    fn test_take_oldest_by_first_seen() {
        let mut buffer = ChannelBuffer::new();
        buffer.append(GroupId::new(1), msg(1), 30);
        buffer.append(GroupId::new(2), msg(2), 10);
        buffer.append(GroupId::new(3), msg(3), 20);

        assert_eq!(buffer.take_oldest().unwrap().group_id, GroupId::new(2));
        assert_eq!(buffer.take_oldest().unwrap().group_id, GroupId::new(3));
        assert_eq!(buffer.take_oldest().unwrap().group_id, GroupId::new(1));
        assert!(buffer.take_oldest().is_none());
    }

    #[test]
    fn test_take_oldest_ties_broken_by_group_id() {
        let mut buffer = ChannelBuffer::new();
        buffer.append(GroupId::new(7), msg(1), 10);
        buffer.append(GroupId::new(3), msg(2), 10);
        buffer.append(GroupId::NONE, msg(3), 10);

        assert_eq!(buffer.take_oldest().unwrap().group_id, GroupId::NONE);
        assert_eq!(buffer.take_oldest().unwrap().group_id, GroupId::new(3));
        assert_eq!(buffer.take_oldest().unwrap().group_id, GroupId::new(7));
    }

    #[test]
    fn test_singleton_messages_share_the_none_slot() {
        let mut buffer = ChannelBuffer::new();
        buffer.append(GroupId::NONE, msg(1), 0);
        buffer.append(GroupId::NONE, msg(2), 1);

        let group = buffer.take_oldest().unwrap();
        assert_eq!(group.message_ids, vec![msg(1), msg(2)]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_take_oldest_n() {
        let mut buffer = ChannelBuffer::new();
        for i in 0..5 {
            buffer.append(GroupId::new(i), msg(i as i32), 100 - i);
        }

        let taken = buffer.take_oldest_n(2);
        let ids: Vec<GroupId> = taken.iter().map(|g| g.group_id).collect();
        assert_eq!(ids, vec![GroupId::new(4), GroupId::new(3)]);
        assert_eq!(buffer.len(), 3);

        assert_eq!(buffer.take_oldest_n(10).len(), 3);
        assert!(buffer.take_oldest_n(1).is_empty());
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = ChannelBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.message_count(), 0);
    }
}
