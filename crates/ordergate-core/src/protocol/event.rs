//! Transaction data section of `ENDORSER_TRANSACTION` payloads.
//!
//! Layout (little-endian):
//!
//! ```text
//! tx_data : u8 flags | [event] | body (rest)
//!   flags bit0 : chaincode event present
//! event   : u16+chaincode_id | u16+tx_id | u16+event_name | u32+payload
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::envelope::{get_bytes_u32, get_string_u16, get_u8, put_bytes_u32, put_string_u16};
use crate::error::Result;

/// Tx data flag: chaincode event is present.
pub const TX_FLAG_EVENT: u8 = 0x01;

/// Application-level event emitted by a chaincode while endorsing a tx.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChaincodeEvent {
    pub chaincode_id: String,
    pub tx_id: String,
    pub event_name: String,
    pub payload: Bytes,
}

/// Decoded data section of an endorser transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxData {
    pub event: Option<ChaincodeEvent>,
    pub body: Bytes,
}

pub fn decode_tx_data(mut buf: Bytes) -> Result<TxData> {
    let flags = get_u8(&mut buf, "tx data flags")?;
    let event = if flags & TX_FLAG_EVENT != 0 {
        Some(ChaincodeEvent {
            chaincode_id: get_string_u16(&mut buf, "chaincode id")?,
            tx_id: get_string_u16(&mut buf, "event tx id")?,
            event_name: get_string_u16(&mut buf, "event name")?,
            payload: get_bytes_u32(&mut buf, "event payload")?,
        })
    } else {
        None
    };
    let body = buf.copy_to_bytes(buf.remaining());
    Ok(TxData { event, body })
}

pub fn encode_tx_data(d: &TxData) -> Result<Bytes> {
    let mut out = BytesMut::with_capacity(16 + d.body.len());
    match &d.event {
        Some(ev) => {
            out.put_u8(TX_FLAG_EVENT);
            put_string_u16(&mut out, &ev.chaincode_id)?;
            put_string_u16(&mut out, &ev.tx_id)?;
            put_string_u16(&mut out, &ev.event_name)?;
            put_bytes_u32(&mut out, &ev.payload)?;
        }
        None => out.put_u8(0),
    }
    out.put_slice(&d.body);
    Ok(out.freeze())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::error::OrderGateError;

    #[test]
    fn eventless_data_keeps_body() {
        let d = decode_tx_data(Bytes::from_static(&[0, b'x', b'y'])).unwrap();
        assert_eq!(d.event, None);
        assert_eq!(&d.body[..], b"xy");
    }

    #[test]
    fn truncated_event_is_malformed() {
        // event flag set, chaincode id claims 5 bytes but carries 1
        let err = decode_tx_data(Bytes::from_static(&[TX_FLAG_EVENT, 5, 0, b'c'])).unwrap_err();
        assert!(matches!(err, OrderGateError::Malformed(_)));
    }
}
