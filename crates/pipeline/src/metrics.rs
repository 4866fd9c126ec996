//! Scheduler metrics
//!
//! Atomic counters for the accumulator and the pacing loops.
//! All operations use relaxed ordering; values are eventually consistent.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by registration and every pacing loop
#[derive(Debug, Default)]
pub struct SchedulerMetrics {
    /// Messages accepted by `register`
    messages_registered: AtomicU64,

    /// Groups created by a first message
    groups_opened: AtomicU64,

    /// Groups handed to the release handler
    groups_released: AtomicU64,

    /// Messages inside released groups
    messages_released: AtomicU64,

    /// Groups discarded at shutdown
    groups_dropped: AtomicU64,

    /// Pacing loops spawned
    loops_started: AtomicU64,

    /// Pacing loops that exited (empty buffer or shutdown)
    loops_terminated: AtomicU64,
}

impl SchedulerMetrics {
    /// Create new metrics instance with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            messages_registered: AtomicU64::new(0),
            groups_opened: AtomicU64::new(0),
            groups_released: AtomicU64::new(0),
            messages_released: AtomicU64::new(0),
            groups_dropped: AtomicU64::new(0),
            loops_started: AtomicU64::new(0),
            loops_terminated: AtomicU64::new(0),
        }
    }

    /// Record an accepted message
    #[inline]
    pub fn record_registered(&self, opened_group: bool) {
        self.messages_registered.fetch_add(1, Ordering::Relaxed);
        if opened_group {
            self.groups_opened.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a released group
    #[inline]
    pub fn record_released(&self, message_count: u64) {
        self.groups_released.fetch_add(1, Ordering::Relaxed);
        self.messages_released
            .fetch_add(message_count, Ordering::Relaxed);
    }

    /// Record groups discarded at shutdown
    #[inline]
    pub fn record_dropped(&self, group_count: u64) {
        self.groups_dropped.fetch_add(group_count, Ordering::Relaxed);
    }

    /// Record a spawned pacing loop
    #[inline]
    pub fn record_loop_started(&self) {
        self.loops_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an exited pacing loop
    #[inline]
    pub fn record_loop_terminated(&self) {
        self.loops_terminated.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of all counters
    #[inline]
    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            messages_registered: self.messages_registered.load(Ordering::Relaxed),
            groups_opened: self.groups_opened.load(Ordering::Relaxed),
            groups_released: self.groups_released.load(Ordering::Relaxed),
            messages_released: self.messages_released.load(Ordering::Relaxed),
            groups_dropped: self.groups_dropped.load(Ordering::Relaxed),
            loops_started: self.loops_started.load(Ordering::Relaxed),
            loops_terminated: self.loops_terminated.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of scheduler metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerSnapshot {
    /// Messages accepted by `register`
    pub messages_registered: u64,
    /// Groups created by a first message
    pub groups_opened: u64,
    /// Groups handed to the release handler
    pub groups_released: u64,
    /// Messages inside released groups
    pub messages_released: u64,
    /// Groups discarded at shutdown
    pub groups_dropped: u64,
    /// Pacing loops spawned
    pub loops_started: u64,
    /// Pacing loops that exited
    pub loops_terminated: u64,
}

impl SchedulerSnapshot {
    /// Pacing loops currently alive
    #[inline]
    pub fn active_loops(&self) -> u64 {
        self.loops_started.saturating_sub(self.loops_terminated)
    }

    /// Groups opened but neither released nor dropped
    #[inline]
    pub fn pending_groups(&self) -> u64 {
        self.groups_opened
            .saturating_sub(self.groups_released)
            .saturating_sub(self.groups_dropped)
    }
}
