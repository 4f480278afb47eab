//! WebSocket layer: upgrade handling, the per-connection loop, and the
//! client frame vocabulary.
//!
//! The endpoint at `/ws` carries registration, pairing, and relay traffic
//! for one client.

pub mod connection;
pub mod handler;
pub mod messages;
