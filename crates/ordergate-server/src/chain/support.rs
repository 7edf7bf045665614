use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::broadcast::support::{ChainSupport, FilterChain, OrderingSink};
use crate::chain::sink::{spawn_drain, QueueSink};
use crate::config::ChannelConfig;
use crate::filter::RuleSet;
use crate::obs::metrics::ServerMetrics;

/// One channel served in-process: standard rule set + queue sink.
pub struct LocalChain {
    channel_id: String,
    filters: RuleSet,
    sink: QueueSink,
    height: Arc<AtomicU64>,
}

impl LocalChain {
    /// Build the chain and spawn its drain task (needs a tokio runtime).
    pub fn start(cfg: &ChannelConfig, metrics: Arc<ServerMetrics>) -> Self {
        let (sink, rx) = QueueSink::new(cfg.queue_depth);
        let height = Arc::new(AtomicU64::new(0));
        spawn_drain(cfg.id.clone(), rx, Arc::clone(&height), metrics);

        Self {
            channel_id: cfg.id.clone(),
            filters: RuleSet::standard(cfg.max_message_bytes),
            sink,
            height,
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Number of envelopes drained so far.
    pub fn height(&self) -> u64 {
        self.height.load(Ordering::Relaxed)
    }

    pub fn halt(&self) {
        self.sink.halt();
    }
}

impl ChainSupport for LocalChain {
    fn filters(&self) -> &dyn FilterChain {
        &self.filters
    }

    fn sink(&self) -> &dyn OrderingSink {
        &self.sink
    }
}
