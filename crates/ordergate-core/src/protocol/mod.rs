//! Wire vocabulary for the broadcast protocol.
//!
//! - `envelope`: signed envelope frame, payload/header codec and validation.
//! - `status`: per-envelope status codes and the JSON response.
//! - `block`: committed block + validity bitmap, for downstream consumers.
//! - `event`: transaction data section carrying an optional chaincode event.
//!
//! All parsers are panic-free: malformed input is reported as
//! `OrderGateError` instead of panicking or indexing raw buffers.

pub mod block;
pub mod envelope;
pub mod event;
pub mod status;
