//! Broadcast ingestion: the per-connection stream handler and the
//! collaborator contracts it is wired with.

pub mod handler;
pub mod stream;
pub mod support;

pub use handler::BroadcastHandler;
pub use stream::BroadcastStream;
pub use support::{ChainRegistry, ChainSupport, ConfigUpdateProcessor, FilterChain, OrderingSink};
