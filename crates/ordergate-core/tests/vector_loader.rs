//! JSON test vector loader for header validation tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use bytes::Bytes;
use serde::Deserialize;

use ordergate_core::protocol::envelope::{
    encode_payload, ChannelHeader, Envelope, Header, Payload, SignatureHeader,
};

#[derive(Debug, Deserialize)]
pub struct TestVector {
    pub description: String,
    pub envelope: EnvelopeSpec,
    #[serde(default)]
    pub expect: Option<serde_json::Value>,
    #[serde(default)]
    pub expect_error: Option<ExpectError>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectError {
    pub status: String,
}

/// Declarative envelope description; `raw_payload` overrides everything else.
#[derive(Debug, Deserialize)]
pub struct EnvelopeSpec {
    #[serde(default = "yes")]
    pub header: bool,
    #[serde(default = "yes")]
    pub channel_header: bool,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub tx_id: String,
    #[serde(default, rename = "type")]
    pub header_type: i32,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub truncate_to: Option<usize>,
    #[serde(default)]
    pub raw_payload: Option<Vec<u8>>,
}

fn yes() -> bool {
    true
}

impl EnvelopeSpec {
    pub fn build(&self) -> Envelope {
        if let Some(raw) = &self.raw_payload {
            return Envelope {
                payload: Bytes::from(raw.clone()),
                signature: Bytes::new(),
            };
        }

        let header = self.header.then(|| Header {
            channel_header: self.channel_header.then(|| ChannelHeader {
                header_type: self.header_type,
                channel_id: self.channel_id.clone(),
                tx_id: self.tx_id.clone(),
                ..ChannelHeader::default()
            }),
            signature_header: SignatureHeader::default(),
        });

        let mut payload = encode_payload(&Payload {
            header,
            data: Bytes::from(self.data.clone().into_bytes()),
        })
        .unwrap();

        if let Some(n) = self.truncate_to {
            payload = payload.slice(0..n.min(payload.len()));
        }

        Envelope {
            payload,
            signature: Bytes::from_static(b"sig"),
        }
    }
}
