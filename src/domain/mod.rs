//! Domain layer: identities, codes, the registry, the pair table, and the
//! outbound event model.
//!
//! Everything here is synchronous plain data. Concurrency control lives
//! one layer up in [`crate::service::Broker`], which owns one instance of
//! each structure behind a single lock.

pub mod broker_event;
pub mod code;
pub mod connection_id;
pub mod mailbox;
pub mod pair_table;
pub mod registry;

pub use broker_event::ServerEvent;
pub use code::{CodeGenerator, PairingCode};
pub use connection_id::ConnectionId;
pub use mailbox::Mailbox;
pub use pair_table::{PairTable, Role};
pub use registry::{ConnectionRegistry, Registration};
