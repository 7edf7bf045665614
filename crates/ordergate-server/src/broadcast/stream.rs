//! Bidirectional envelope stream seen by the handler.

use async_trait::async_trait;

use ordergate_core::error::Result;
use ordergate_core::protocol::envelope::Envelope;
use ordergate_core::protocol::status::BroadcastResponse;

/// One client connection: envelopes in, responses out.
///
/// Both directions fail with `OrderGateError::Transport` only.
#[async_trait]
pub trait BroadcastStream: Send {
    /// Next envelope, or `Ok(None)` once the client finished sending.
    async fn recv(&mut self) -> Result<Option<Envelope>>;

    async fn send(&mut self, resp: BroadcastResponse) -> Result<()>;
}
