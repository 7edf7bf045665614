//! Default config update processor.
//!
//! Wraps a `CONFIG_UPDATE` envelope into a `CONFIG` envelope for the same
//! channel, signed-header by this orderer. The original envelope frame becomes
//! the data section. Channel creation is not supported: updates must target a
//! channel that is already served.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;

use ordergate_core::error::{OrderGateError, Result};
use ordergate_core::protocol::envelope::{
    decode_payload, encode_envelope, encode_payload, ChannelHeader, Envelope, Header, HeaderType,
    Payload, SignatureHeader,
};

use crate::broadcast::support::{ChainRegistry, ConfigUpdateProcessor};

pub struct ConfigUpdateWrapper {
    registry: Arc<dyn ChainRegistry>,
    creator: Bytes,
    nonce: AtomicU64,
}

impl ConfigUpdateWrapper {
    pub fn new(registry: Arc<dyn ChainRegistry>, orderer_id: &str) -> Self {
        Self {
            registry,
            creator: Bytes::copy_from_slice(orderer_id.as_bytes()),
            nonce: AtomicU64::new(0),
        }
    }
}

fn reject(msg: impl Into<String>) -> OrderGateError {
    OrderGateError::ConfigUpdateRejected(msg.into())
}

impl ConfigUpdateProcessor for ConfigUpdateWrapper {
    fn process(&self, env: &Envelope) -> Result<Envelope> {
        let payload = decode_payload(env.payload.clone()).map_err(|e| reject(e.to_string()))?;
        let chdr = payload
            .header
            .and_then(|h| h.channel_header)
            .ok_or_else(|| reject("missing channel header"))?;

        if !chdr.is_config_update() {
            return Err(reject("not a config update"));
        }
        if payload.data.is_empty() {
            return Err(reject("empty config update"));
        }
        if self.registry.get_chain(&chdr.channel_id).is_none() {
            return Err(reject(format!("unknown channel: {}", chdr.channel_id)));
        }

        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        let wrapped = Payload {
            header: Some(Header {
                channel_header: Some(ChannelHeader {
                    header_type: HeaderType::Config.as_i32(),
                    version: chdr.version,
                    channel_id: chdr.channel_id,
                    tx_id: chdr.tx_id,
                    epoch: chdr.epoch,
                    extension: Bytes::new(),
                }),
                signature_header: SignatureHeader {
                    creator: self.creator.clone(),
                    nonce: Bytes::copy_from_slice(&nonce.to_le_bytes()),
                },
            }),
            data: encode_envelope(env)?,
        };

        Ok(Envelope {
            payload: encode_payload(&wrapped)?,
            signature: Bytes::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use ordergate_core::protocol::envelope::{build_envelope, decode_envelope, parse_channel_header};

    use super::*;
    use crate::chain::registry::ChainManager;
    use crate::chain::support::LocalChain;
    use crate::config::ChannelConfig;
    use crate::obs::metrics::ServerMetrics;

    fn wrapper_for(channel: &str) -> ConfigUpdateWrapper {
        let mgr = ChainManager::new();
        let cfg = ChannelConfig {
            id: channel.to_string(),
            max_message_bytes: 1024,
            queue_depth: 4,
        };
        mgr.register(Arc::new(LocalChain::start(&cfg, Arc::new(ServerMetrics::default()))))
            .unwrap();
        ConfigUpdateWrapper::new(Arc::new(mgr), "orderer0")
    }

    #[tokio::test]
    async fn wraps_update_into_config_envelope() {
        let w = wrapper_for("mychannel");
        let update = build_envelope(
            HeaderType::ConfigUpdate,
            "mychannel",
            "tx-9",
            Bytes::from_static(b"new-policy"),
        )
        .unwrap();

        let out = w.process(&update).unwrap();
        let chdr = parse_channel_header(&out).unwrap();
        assert_eq!(chdr.kind(), Some(HeaderType::Config));
        assert_eq!(chdr.channel_id, "mychannel");
        assert_eq!(chdr.tx_id, "tx-9");

        let payload = decode_payload(out.payload).unwrap();
        let sig = payload.header.unwrap().signature_header;
        assert_eq!(&sig.creator[..], b"orderer0");
        assert_eq!(decode_envelope(payload.data).unwrap(), update);
    }

    #[tokio::test]
    async fn rejects_unknown_channel_and_empty_update() {
        let w = wrapper_for("mychannel");

        let other = build_envelope(
            HeaderType::ConfigUpdate,
            "elsewhere",
            "tx-1",
            Bytes::from_static(b"x"),
        )
        .unwrap();
        let err = w.process(&other).expect_err("unknown channel");
        assert!(matches!(err, OrderGateError::ConfigUpdateRejected(_)));

        let empty = build_envelope(HeaderType::ConfigUpdate, "mychannel", "tx-2", Bytes::new())
            .unwrap();
        assert!(w.process(&empty).is_err());
    }

    #[tokio::test]
    async fn rejects_non_update_envelopes() {
        let w = wrapper_for("mychannel");
        let msg = build_envelope(
            HeaderType::EndorserTransaction,
            "mychannel",
            "tx-3",
            Bytes::from_static(b"x"),
        )
        .unwrap();
        assert!(w.process(&msg).is_err());
    }
}
