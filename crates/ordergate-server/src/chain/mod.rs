//! In-process chain resources: registry, per-channel support, ordering sink
//! and the default config update processor.

pub mod config_update;
pub mod registry;
pub mod sink;
pub mod support;

pub use config_update::ConfigUpdateWrapper;
pub use registry::ChainManager;
pub use sink::QueueSink;
pub use support::LocalChain;
