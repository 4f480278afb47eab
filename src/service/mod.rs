//! Service layer: the broker and its operations.
//!
//! [`Broker`] holds all shared state behind one lock. Its operations are
//! split by concern: registration in `broker`, the request/answer
//! handshake in `pairing`, payload forwarding in `relay`, and
//! connect/disconnect in `lifecycle`.

mod broker;
mod lifecycle;
mod pairing;
mod relay;

pub use broker::{Broker, BrokerStats};

#[cfg(test)]
pub(crate) use broker::test_support;
