use std::sync::Arc;

use dashmap::DashMap;

use ordergate_core::error::{OrderGateError, Result};

use crate::broadcast::support::{ChainRegistry, ChainSupport};
use crate::chain::support::LocalChain;
use crate::config::ServerConfig;
use crate::obs::metrics::ServerMetrics;

/// Registry of locally served channels (read-mostly, concurrent lookups).
#[derive(Default)]
pub struct ChainManager {
    chains: DashMap<String, Arc<LocalChain>>,
}

impl ChainManager {
    pub fn new() -> Self {
        Self {
            chains: DashMap::new(),
        }
    }

    /// Start every configured channel.
    pub fn from_config(cfg: &ServerConfig, metrics: &Arc<ServerMetrics>) -> Result<Self> {
        let mgr = Self::new();
        for ch in &cfg.channels {
            mgr.register(Arc::new(LocalChain::start(ch, Arc::clone(metrics))))?;
        }
        Ok(mgr)
    }

    pub fn register(&self, chain: Arc<LocalChain>) -> Result<()> {
        let id = chain.channel_id().to_string();
        if self.chains.contains_key(&id) {
            return Err(OrderGateError::Config(format!(
                "channel registered twice: {id}"
            )));
        }
        tracing::info!(channel = %id, "channel registered");
        self.chains.insert(id, chain);
        Ok(())
    }

    pub fn local(&self, channel_id: &str) -> Option<Arc<LocalChain>> {
        self.chains.get(channel_id).map(|c| Arc::clone(c.value()))
    }

    pub fn channel_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.chains.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Halt every sink; later enqueues are refused.
    pub fn halt_all(&self) {
        for c in self.chains.iter() {
            c.value().halt();
        }
    }
}

impl ChainRegistry for ChainManager {
    fn get_chain(&self, channel_id: &str) -> Option<Arc<dyn ChainSupport>> {
        self.local(channel_id)
            .map(|c| c as Arc<dyn ChainSupport>)
    }
}
