//! Transport layer (WebSocket).
//!
//! Exposes the WS upgrade handler and the codec that turns binary frames into
//! envelopes before they reach the broadcast handler.

pub mod codec;
pub mod ws;

pub use ws::WsBroadcastStream;
