//! ForwardDispatcher tests

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use relay_pipeline::{ReleaseHandler, ReleasedGroup};
use relay_routing::{ChannelId, GroupId, MessageId, RoutingTable};

use crate::{
    AccessHash, AccessHashStore, DispatchError, Endpoint, ForwardDispatcher, ForwardRequest,
    Forwarder, Result,
};

/// Forwarder that records requests and optionally fails them
#[derive(Clone, Default)]
struct RecordingForwarder {
    requests: Arc<Mutex<Vec<ForwardRequest>>>,
    fail: bool,
}

impl RecordingForwarder {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn requests(&self) -> Vec<ForwardRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Forwarder for RecordingForwarder {
    async fn forward(&self, request: &ForwardRequest) -> Result<()> {
        self.requests.lock().push(request.clone());
        if self.fail {
            return Err(DispatchError::transport("CHAT_WRITE_FORBIDDEN"));
        }
        Ok(())
    }
}

fn ch(id: i64) -> ChannelId {
    ChannelId::new(id)
}

fn released(channel: i64, ids: &[i32]) -> ReleasedGroup {
    ReleasedGroup {
        channel: ch(channel),
        group: GroupId::new(9),
        message_ids: ids.iter().copied().map(MessageId::new).collect(),
        first_seen: 0,
    }
}

/// Routes 1,2 → 100 and 3 → 200; knows hashes for 1, 3, 100
fn create_dispatcher(forwarder: RecordingForwarder) -> ForwardDispatcher<RecordingForwarder> {
    let routes = Arc::new(RoutingTable::parse("100:1,2|200:3").unwrap());
    let access: AccessHashStore = [
        (ch(1), AccessHash::new(11)),
        (ch(3), AccessHash::new(33)),
        (ch(100), AccessHash::new(1000)),
    ]
    .into_iter()
    .collect();

    ForwardDispatcher::new(routes, Arc::new(access), forwarder)
}

// ============================================================================
// Request building
// ============================================================================

#[test]
fn test_build_request() {
    let dispatcher = create_dispatcher(RecordingForwarder::default());

    let request = dispatcher.build_request(&released(1, &[11, 12])).unwrap();

    assert_eq!(request.from.id, ch(1));
    assert_eq!(request.from.access_hash, AccessHash::new(11));
    assert_eq!(request.to.id, ch(100));
    assert_eq!(request.to.access_hash, AccessHash::new(1000));
    assert_eq!(request.message_ids, vec![MessageId::new(11), MessageId::new(12)]);
    assert_eq!(request.random_ids.len(), 2);
}

#[test]
fn test_build_request_unrouted() {
    let dispatcher = create_dispatcher(RecordingForwarder::default());

    let err = dispatcher.build_request(&released(7, &[1])).unwrap_err();
    assert_eq!(err, DispatchError::unrouted(ch(7)));
}

#[test]
fn test_build_request_missing_source_hash() {
    let dispatcher = create_dispatcher(RecordingForwarder::default());

    let err = dispatcher.build_request(&released(2, &[1])).unwrap_err();
    assert_eq!(err, DispatchError::missing_access_hash(ch(2), Endpoint::Source));
}

#[test]
fn test_build_request_missing_destination_hash() {
    let dispatcher = create_dispatcher(RecordingForwarder::default());

    let err = dispatcher.build_request(&released(3, &[1])).unwrap_err();
    assert_eq!(
        err,
        DispatchError::missing_access_hash(ch(200), Endpoint::Destination)
    );
}

// ============================================================================
// Release handling
// ============================================================================

#[tokio::test]
async fn test_release_forwards_exact_group() {
    let forwarder = RecordingForwarder::default();
    let dispatcher = create_dispatcher(forwarder.clone());
    let metrics = dispatcher.metrics_handle();

    dispatcher.release(released(1, &[5, 6, 7])).await;

    let requests = forwarder.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].message_ids,
        vec![MessageId::new(5), MessageId::new(6), MessageId::new(7)]
    );

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.groups_forwarded, 1);
    assert_eq!(snapshot.messages_forwarded, 3);
    assert_eq!(snapshot.failed(), 0);
}

#[tokio::test]
async fn test_release_unrouted_is_dropped() {
    let forwarder = RecordingForwarder::default();
    let dispatcher = create_dispatcher(forwarder.clone());
    let metrics = dispatcher.metrics_handle();

    dispatcher.release(released(7, &[1])).await;

    assert!(forwarder.requests().is_empty());
    assert_eq!(metrics.snapshot().unrouted, 1);
}

#[tokio::test]
async fn test_release_missing_hash_is_dropped() {
    let forwarder = RecordingForwarder::default();
    let dispatcher = create_dispatcher(forwarder.clone());
    let metrics = dispatcher.metrics_handle();

    dispatcher.release(released(2, &[1])).await;
    dispatcher.release(released(3, &[1])).await;

    assert!(forwarder.requests().is_empty());
    assert_eq!(metrics.snapshot().missing_access_hash, 2);
}

#[tokio::test]
async fn test_release_transport_error_is_counted() {
    let forwarder = RecordingForwarder::failing();
    let dispatcher = create_dispatcher(forwarder.clone());
    let metrics = dispatcher.metrics_handle();

    dispatcher.release(released(1, &[1])).await;
    dispatcher.release(released(1, &[2])).await;

    // each group tried exactly once, no retries
    assert_eq!(forwarder.requests().len(), 2);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.transport_errors, 2);
    assert_eq!(snapshot.groups_forwarded, 0);
    assert_eq!(snapshot.failed(), 2);
}

#[tokio::test]
async fn test_access_hash_learned_later() {
    let forwarder = RecordingForwarder::default();
    let routes = Arc::new(RoutingTable::parse("100:1").unwrap());
    let access = Arc::new(AccessHashStore::new());
    let dispatcher = ForwardDispatcher::new(routes, Arc::clone(&access), forwarder.clone());

    dispatcher.release(released(1, &[1])).await;
    assert!(forwarder.requests().is_empty());

    access.set(ch(1), AccessHash::new(1));
    access.set(ch(100), AccessHash::new(2));
    dispatcher.release(released(1, &[2])).await;
    assert_eq!(forwarder.requests().len(), 1);
}
