//! Relay - Dispatch
//!
//! Executes released album groups as forward calls.
//!
//! `ForwardDispatcher` is the release handler plugged into the group
//! registry. It resolves the destination from the routing table and the
//! access hashes of both channels, then hands a `ForwardRequest` to a
//! `Forwarder`. Errors are logged and counted, never retried.
//!
//! # Example
//!
//! ```ignore
//! let dispatcher = ForwardDispatcher::new(routes, access, LogForwarder);
//! let metrics = dispatcher.metrics_handle();
//! let registry = GroupRegistry::new(dispatcher, PacerConfig::default(), cancel);
//! ```

mod access;
mod dispatcher;
mod error;
mod forwarder;

#[cfg(test)]
mod dispatcher_test;

pub use access::{AccessHash, AccessHashStore};
pub use dispatcher::{DispatchMetrics, DispatchSnapshot, ForwardDispatcher};
pub use error::{DispatchError, Endpoint, Result};
pub use forwarder::{ForwardRequest, Forwarder, InputChannel, LogForwarder};
