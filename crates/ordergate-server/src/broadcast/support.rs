//! Collaborator contracts consumed by the broadcast handler.
//!
//! Implementations are injected as trait objects so that the registry,
//! processor, filters and sink can each be swapped independently.

use std::sync::Arc;

use async_trait::async_trait;

use ordergate_core::error::Result;
use ordergate_core::protocol::envelope::Envelope;

/// Turns a `CONFIG_UPDATE` envelope into a committable envelope.
pub trait ConfigUpdateProcessor: Send + Sync {
    /// Err means the update is semantically invalid (client fault).
    fn process(&self, env: &Envelope) -> Result<Envelope>;
}

/// Channel id -> per-channel resources. Looked up concurrently by every
/// active stream.
pub trait ChainRegistry: Send + Sync {
    fn get_chain(&self, channel_id: &str) -> Option<Arc<dyn ChainSupport>>;
}

/// Composite admission decision; the handler only sees accept or reject.
pub trait FilterChain: Send + Sync {
    fn apply(&self, env: &Envelope) -> Result<()>;
}

/// Acceptance interface of the ordering backend.
#[async_trait]
pub trait OrderingSink: Send + Sync {
    /// `false` means the backend is shutting down.
    async fn enqueue(&self, env: Envelope) -> bool;
}

/// Per-channel bundle: filters + sink. Owned by the registry.
pub trait ChainSupport: Send + Sync {
    fn filters(&self) -> &dyn FilterChain;
    fn sink(&self) -> &dyn OrderingSink;
}
