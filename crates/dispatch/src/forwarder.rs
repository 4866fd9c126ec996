//! Forward requests and the transport seam

use async_trait::async_trait;
use relay_routing::{ChannelId, MessageId};

use crate::access::AccessHash;
use crate::error::Result;

/// A channel addressed the way the transport expects it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputChannel {
    /// Channel id
    pub id: ChannelId,
    /// Access hash for the channel
    pub access_hash: AccessHash,
}

/// One forward call: copy `message_ids` from `from` into `to`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardRequest {
    /// Source channel
    pub from: InputChannel,

    /// Destination channel
    pub to: InputChannel,

    /// Messages to forward, in album order
    pub message_ids: Vec<MessageId>,

    /// One random id per message, used by the transport for deduplication
    pub random_ids: Vec<i64>,

    /// Hide the original author
    pub drop_author: bool,

    /// Deliver without notification
    pub silent: bool,

    /// Send as a background message
    pub background: bool,
}

impl ForwardRequest {
    /// Build a request with fresh random ids and the default flags
    ///
    /// Defaults: author dropped, not silent, background.
    pub fn new(from: InputChannel, to: InputChannel, message_ids: Vec<MessageId>) -> Self {
        let random_ids = message_ids.iter().map(|_| rand::random::<i64>()).collect();
        Self {
            from,
            to,
            message_ids,
            random_ids,
            drop_author: true,
            silent: false,
            background: true,
        }
    }
}

/// Transport that executes forward calls
///
/// No retries are expected: a failed forward is reported and the group is
/// gone.
#[async_trait]
pub trait Forwarder: Send + Sync + 'static {
    /// Execute one forward call
    async fn forward(&self, request: &ForwardRequest) -> Result<()>;
}

/// Forwarder that only logs what it would send
///
/// Used when no transport is wired in (dry runs, local testing).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogForwarder;

#[async_trait]
impl Forwarder for LogForwarder {
    async fn forward(&self, request: &ForwardRequest) -> Result<()> {
        let ids: Vec<i32> = request.message_ids.iter().map(|m| m.get()).collect();
        tracing::info!(
            from = %request.from.id,
            to = %request.to.id,
            message_ids = ?ids,
            drop_author = request.drop_author,
            "forward (dry run)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: i64, hash: i64) -> InputChannel {
        InputChannel {
            id: ChannelId::new(id),
            access_hash: AccessHash::new(hash),
        }
    }

    #[test]
    fn test_request_defaults() {
        let ids = vec![MessageId::new(11), MessageId::new(12)];
        let request = ForwardRequest::new(input(1, 10), input(100, 1000), ids.clone());

        assert_eq!(request.message_ids, ids);
        assert_eq!(request.random_ids.len(), 2);
        assert!(request.drop_author);
        assert!(!request.silent);
        assert!(request.background);
    }

    #[tokio::test]
    async fn test_log_forwarder_accepts() {
        let request = ForwardRequest::new(input(1, 10), input(100, 1000), vec![MessageId::new(1)]);
        assert!(LogForwarder.forward(&request).await.is_ok());
    }
}
