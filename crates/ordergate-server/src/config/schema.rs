use std::collections::HashSet;
use std::net::SocketAddr;

use serde::Deserialize;
use ordergate_core::error::{OrderGateError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(OrderGateError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        if self.channels.is_empty() {
            return Err(OrderGateError::Config("channels must not be empty".into()));
        }

        self.gateway.validate()?;

        let mut seen = HashSet::new();
        for ch in &self.channels {
            ch.validate(self.gateway.max_frame_bytes)?;
            if !seen.insert(ch.id.as_str()) {
                return Err(OrderGateError::Config(format!(
                    "duplicate channel id: {}",
                    ch.id
                )));
            }
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.gateway.listen_addr()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Upper bound for one WebSocket message (one envelope frame).
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Creator identity stamped on wrapped config envelopes.
    #[serde(default = "default_orderer_id")]
    pub orderer_id: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_frame_bytes: default_max_frame_bytes(),
            orderer_id: default_orderer_id(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(1024..=64 * 1024 * 1024).contains(&self.max_frame_bytes) {
            return Err(OrderGateError::Config(
                "gateway.max_frame_bytes must be between 1024 and 67108864".into(),
            ));
        }
        if self.orderer_id.trim().is_empty() {
            return Err(OrderGateError::Config("gateway.orderer_id must not be empty".into()));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            OrderGateError::Config(format!(
                "gateway.listen must be a valid socket address: {}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:7050".into()
}
fn default_max_frame_bytes() -> usize {
    1024 * 1024
}
fn default_orderer_id() -> String {
    "orderer0".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    pub id: String,

    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,

    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

impl ChannelConfig {
    fn validate(&self, max_frame_bytes: usize) -> Result<()> {
        if self.id.is_empty() {
            return Err(OrderGateError::Config("channel id must not be empty".into()));
        }
        if self.max_message_bytes == 0 || self.max_message_bytes > max_frame_bytes {
            return Err(OrderGateError::Config(format!(
                "channel {}: max_message_bytes must be in 1..={max_frame_bytes}",
                self.id
            )));
        }
        if !(1..=100_000).contains(&self.queue_depth) {
            return Err(OrderGateError::Config(format!(
                "channel {}: queue_depth must be between 1 and 100000",
                self.id
            )));
        }
        Ok(())
    }
}

fn default_max_message_bytes() -> usize {
    100 * 1024
}
fn default_queue_depth() -> usize {
    1000
}
