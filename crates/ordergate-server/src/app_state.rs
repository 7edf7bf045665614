//! Shared application state for the broadcast server.
//!
//! Wires the chain registry, config update processor and metrics into one
//! `BroadcastHandler` shared by every connection. Startup errors are returned
//! as `Result` instead of panicking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ordergate_core::error::Result;

use crate::broadcast::BroadcastHandler;
use crate::chain::{ChainManager, ConfigUpdateWrapper};
use crate::config::ServerConfig;
use crate::obs::ServerMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    chains: Arc<ChainManager>,
    handler: Arc<BroadcastHandler>,
    metrics: Arc<ServerMetrics>,
}

struct AppStateInner {
    cfg: ServerConfig,
    session_seq: AtomicU64,
}

impl AppState {
    /// Build application state. Spawns one drain task per channel, so this
    /// must run inside a tokio runtime.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        let metrics = Arc::new(ServerMetrics::default());

        // 1) Start configured channels
        let chains = Arc::new(ChainManager::from_config(&cfg, &metrics)?);

        // 2) Config update processing goes through the same registry
        let processor = Arc::new(ConfigUpdateWrapper::new(
            chains.clone(),
            &cfg.gateway.orderer_id,
        ));

        let handler = Arc::new(BroadcastHandler::new(
            chains.clone(),
            processor,
            Arc::clone(&metrics),
        ));

        tracing::info!(channels = ?chains.channel_ids(), "broadcast state ready");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                session_seq: AtomicU64::new(1),
            }),
            chains,
            handler,
            metrics,
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn handler(&self) -> Arc<BroadcastHandler> {
        Arc::clone(&self.handler)
    }

    pub fn chains(&self) -> Arc<ChainManager> {
        Arc::clone(&self.chains)
    }

    pub fn metrics(&self) -> &ServerMetrics {
        &self.metrics
    }

    pub fn next_session_id(&self) -> u64 {
        self.inner.session_seq.fetch_add(1, Ordering::Relaxed)
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Stop taking new streams and refuse further enqueues.
    pub fn begin_drain(&self) {
        self.metrics.set_draining();
        self.chains.halt_all();
        tracing::info!("draining: new streams refused, sinks halted");
    }
}
