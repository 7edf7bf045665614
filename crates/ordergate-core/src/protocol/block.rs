//! Committed block vocabulary shared with downstream consumers.
//!
//! Blocks carry one encoded envelope per transaction slot plus a validity bit
//! array. A set bit marks the transaction in that slot as invalid.

use bytes::Bytes;

use super::envelope::{decode_envelope, decode_payload, Envelope, HeaderType, Payload};
use super::event::{decode_tx_data, ChaincodeEvent};

/// Per-transaction validity bit array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxValidationFilter {
    bits: Vec<u8>,
}

impl TxValidationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self { bits: b.to_vec() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Mark slot `i` invalid, growing the array as needed.
    pub fn set(&mut self, i: usize) {
        let byte = i / 8;
        if byte >= self.bits.len() {
            self.bits.resize(byte + 1, 0);
        }
        self.bits[byte] |= 1 << (i % 8);
    }

    /// Slots beyond the array are treated as valid.
    pub fn is_set(&self, i: usize) -> bool {
        self.bits
            .get(i / 8)
            .map(|b| b & (1 << (i % 8)) != 0)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub number: u64,
    /// Encoded envelope frames, one per transaction slot.
    pub data: Vec<Bytes>,
    pub tx_filter: TxValidationFilter,
}

/// Result of inspecting one transaction slot.
#[derive(Debug, Clone)]
pub enum TxSlot {
    Invalid {
        index: usize,
        /// Present when the invalid transaction still decodes.
        tx_id: Option<String>,
    },
    Valid {
        index: usize,
        envelope: Envelope,
        /// Decoded payload; `None` if the payload does not decode.
        payload: Option<Payload>,
        /// Chaincode event of an endorser transaction that passed the
        /// chaincode filter.
        event: Option<ChaincodeEvent>,
    },
    /// Slot bytes are not an envelope frame at all.
    Undecodable { index: usize },
}

/// Walk every transaction slot of a block, honoring the validity filter.
///
/// With `chaincode` set, only events emitted by that chaincode are surfaced;
/// `None` surfaces every event found in a valid endorser transaction.
pub fn scan_block(block: &Block, chaincode: Option<&str>) -> Vec<TxSlot> {
    block
        .data
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let Ok(envelope) = decode_envelope(raw.clone()) else {
                return TxSlot::Undecodable { index };
            };
            let payload = decode_payload(envelope.payload.clone()).ok();

            if block.tx_filter.is_set(index) {
                let tx_id = payload
                    .and_then(|p| p.header)
                    .and_then(|h| h.channel_header)
                    .map(|ch| ch.tx_id);
                TxSlot::Invalid { index, tx_id }
            } else {
                let event = payload
                    .as_ref()
                    .and_then(chaincode_event)
                    .filter(|ev| chaincode.map_or(true, |id| ev.chaincode_id == id));
                TxSlot::Valid {
                    index,
                    envelope,
                    payload,
                    event,
                }
            }
        })
        .collect()
}

/// Event carried by an endorser transaction, if its data section has one.
fn chaincode_event(payload: &Payload) -> Option<ChaincodeEvent> {
    let kind = payload
        .header
        .as_ref()
        .and_then(|h| h.channel_header.as_ref())
        .and_then(|ch| ch.kind());
    if kind != Some(HeaderType::EndorserTransaction) {
        return None;
    }
    decode_tx_data(payload.data.clone()).ok()?.event
}
