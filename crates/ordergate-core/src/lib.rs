//! ordergate core: transport-agnostic broadcast protocol primitives and errors.
//!
//! This crate defines the envelope codec, header validation, status codes and
//! error surface shared by the broadcast server and its clients. It carries
//! no transport or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible paths
//! surface as `OrderGateError`/`Result` so malformed client input never
//! crashes the orderer.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{OrderGateError, Result};
pub use protocol::envelope::{ChannelHeader, Envelope, HeaderType};
pub use protocol::status::{BroadcastResponse, Status};
