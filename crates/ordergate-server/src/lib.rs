//! ordergate broadcast server library entry.
//!
//! Wires the WebSocket transport, the broadcast stream handler and the
//! in-process chain resources (registry, filters, sinks) into a runnable
//! server. Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod broadcast;
pub mod chain;
pub mod config;
pub mod filter;
pub mod obs;
pub mod ops;
pub mod router;
pub mod transport;
