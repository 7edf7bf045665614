//! Envelope / payload binary codec and header validation (panic-free).
//!
//! Parsing rules:
//! - Never index (`buf[0]`); always check `remaining()` before `Buf` reads.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.
//!
//! Layout (little-endian):
//!
//! ```text
//! envelope       : u32 payload_len | payload | signature (rest)
//! payload        : u8 version | u8 flags | [header] | data (rest)
//! header         : u8 flags | [channel_header] | signature_header
//! channel_header : i32 type | i32 version | u16+channel_id | u16+tx_id
//!                  | u64 epoch | u32+extension
//! signature_hdr  : u32+creator | u32+nonce
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{OrderGateError, Result};

/// Payload encoding version.
pub const PAYLOAD_VERSION: u8 = 1;

/// Payload flag: header is present.
pub const PAYLOAD_FLAG_HEADER: u8 = 0x01;
/// Header flag: channel header is present.
pub const HEADER_FLAG_CHANNEL: u8 = 0x01;

/// Known transaction kinds carried in [`ChannelHeader::header_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderType {
    Message,
    Config,
    /// Reconfiguration request; must be preprocessed before admission.
    ConfigUpdate,
    EndorserTransaction,
    OrdererTransaction,
    DeliverSeekInfo,
    ChaincodePackage,
}

impl HeaderType {
    pub fn as_i32(self) -> i32 {
        match self {
            HeaderType::Message => 0,
            HeaderType::Config => 1,
            HeaderType::ConfigUpdate => 2,
            HeaderType::EndorserTransaction => 3,
            HeaderType::OrdererTransaction => 4,
            HeaderType::DeliverSeekInfo => 5,
            HeaderType::ChaincodePackage => 6,
        }
    }

    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            0 => Some(HeaderType::Message),
            1 => Some(HeaderType::Config),
            2 => Some(HeaderType::ConfigUpdate),
            3 => Some(HeaderType::EndorserTransaction),
            4 => Some(HeaderType::OrdererTransaction),
            5 => Some(HeaderType::DeliverSeekInfo),
            6 => Some(HeaderType::ChaincodePackage),
            _ => None,
        }
    }
}

/// Signed container: opaque payload bytes + signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    pub payload: Bytes,
    pub signature: Bytes,
}

/// Decoded envelope payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    pub header: Option<Header>,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub channel_header: Option<ChannelHeader>,
    pub signature_header: SignatureHeader,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelHeader {
    /// Raw transaction kind; see [`HeaderType`].
    pub header_type: i32,
    pub version: i32,
    pub channel_id: String,
    pub tx_id: String,
    pub epoch: u64,
    /// Opaque, type-dependent extension.
    pub extension: Bytes,
}

impl ChannelHeader {
    pub fn kind(&self) -> Option<HeaderType> {
        HeaderType::from_i32(self.header_type)
    }

    pub fn is_config_update(&self) -> bool {
        self.header_type == HeaderType::ConfigUpdate.as_i32()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureHeader {
    pub creator: Bytes,
    pub nonce: Bytes,
}

// --------------------
// Validation
// --------------------

/// Extract and validate the channel header of an envelope.
///
/// Fails with [`OrderGateError::Malformed`] when the payload does not decode,
/// or the header, channel header or channel id is absent/empty.
pub fn parse_channel_header(env: &Envelope) -> Result<ChannelHeader> {
    let payload = decode_payload(env.payload.clone())?;
    let header = payload
        .header
        .ok_or_else(|| OrderGateError::Malformed("missing header".into()))?;
    let chdr = header
        .channel_header
        .ok_or_else(|| OrderGateError::Malformed("missing channel header".into()))?;
    if chdr.channel_id.is_empty() {
        return Err(OrderGateError::Malformed("empty channel id".into()));
    }
    Ok(chdr)
}

// --------------------
// Envelope frame
// --------------------

/// Split an envelope frame into payload and signature.
pub fn decode_envelope(mut buf: Bytes) -> Result<Envelope> {
    let len = get_u32(&mut buf, "payload length")? as usize;
    if buf.remaining() < len {
        return Err(OrderGateError::Malformed(
            "envelope payload truncated".into(),
        ));
    }
    let payload = buf.split_to(len);
    Ok(Envelope {
        payload,
        signature: buf,
    })
}

pub fn encode_envelope(env: &Envelope) -> Result<Bytes> {
    let len = u32::try_from(env.payload.len())
        .map_err(|_| OrderGateError::Malformed("payload too large".into()))?;
    let mut out = BytesMut::with_capacity(4 + env.payload.len() + env.signature.len());
    out.put_u32_le(len);
    out.put_slice(&env.payload);
    out.put_slice(&env.signature);
    Ok(out.freeze())
}

// --------------------
// Payload
// --------------------

pub fn decode_payload(mut buf: Bytes) -> Result<Payload> {
    let v = get_u8(&mut buf, "payload version")?;
    if v != PAYLOAD_VERSION {
        return Err(OrderGateError::Malformed(format!(
            "unsupported payload version {v}"
        )));
    }
    let flags = get_u8(&mut buf, "payload flags")?;

    let header = if flags & PAYLOAD_FLAG_HEADER != 0 {
        Some(decode_header(&mut buf)?)
    } else {
        None
    };

    let data = buf.copy_to_bytes(buf.remaining());
    Ok(Payload { header, data })
}

pub fn encode_payload(p: &Payload) -> Result<Bytes> {
    let mut out = BytesMut::with_capacity(64 + p.data.len());
    out.put_u8(PAYLOAD_VERSION);
    match &p.header {
        Some(h) => {
            out.put_u8(PAYLOAD_FLAG_HEADER);
            encode_header(h, &mut out)?;
        }
        None => out.put_u8(0),
    }
    out.put_slice(&p.data);
    Ok(out.freeze())
}

fn decode_header(buf: &mut Bytes) -> Result<Header> {
    let flags = get_u8(buf, "header flags")?;
    let channel_header = if flags & HEADER_FLAG_CHANNEL != 0 {
        Some(decode_channel_header(buf)?)
    } else {
        None
    };
    let creator = get_bytes_u32(buf, "creator")?;
    let nonce = get_bytes_u32(buf, "nonce")?;
    Ok(Header {
        channel_header,
        signature_header: SignatureHeader { creator, nonce },
    })
}

fn encode_header(h: &Header, out: &mut BytesMut) -> Result<()> {
    match &h.channel_header {
        Some(ch) => {
            out.put_u8(HEADER_FLAG_CHANNEL);
            encode_channel_header(ch, out)?;
        }
        None => out.put_u8(0),
    }
    put_bytes_u32(out, &h.signature_header.creator)?;
    put_bytes_u32(out, &h.signature_header.nonce)?;
    Ok(())
}

fn decode_channel_header(buf: &mut Bytes) -> Result<ChannelHeader> {
    if buf.remaining() < 8 {
        return Err(OrderGateError::Malformed("channel header too short".into()));
    }
    let header_type = buf.get_i32_le();
    let version = buf.get_i32_le();
    let channel_id = get_string_u16(buf, "channel id")?;
    let tx_id = get_string_u16(buf, "tx id")?;
    if buf.remaining() < 8 {
        return Err(OrderGateError::Malformed("missing epoch".into()));
    }
    let epoch = buf.get_u64_le();
    let extension = get_bytes_u32(buf, "extension")?;
    Ok(ChannelHeader {
        header_type,
        version,
        channel_id,
        tx_id,
        epoch,
        extension,
    })
}

fn encode_channel_header(ch: &ChannelHeader, out: &mut BytesMut) -> Result<()> {
    out.put_i32_le(ch.header_type);
    out.put_i32_le(ch.version);
    put_string_u16(out, &ch.channel_id)?;
    put_string_u16(out, &ch.tx_id)?;
    out.put_u64_le(ch.epoch);
    put_bytes_u32(out, &ch.extension)?;
    Ok(())
}

// --------------------
// Primitive helpers
// --------------------

pub(crate) fn get_u8(buf: &mut Bytes, what: &str) -> Result<u8> {
    if buf.remaining() < 1 {
        return Err(OrderGateError::Malformed(format!("missing {what}")));
    }
    Ok(buf.get_u8())
}

fn get_u32(buf: &mut Bytes, what: &str) -> Result<u32> {
    if buf.remaining() < 4 {
        return Err(OrderGateError::Malformed(format!("missing {what}")));
    }
    Ok(buf.get_u32_le())
}

pub(crate) fn get_bytes_u32(buf: &mut Bytes, what: &str) -> Result<Bytes> {
    let len = get_u32(buf, what)? as usize;
    if buf.remaining() < len {
        return Err(OrderGateError::Malformed(format!("{what} truncated")));
    }
    Ok(buf.split_to(len))
}

pub(crate) fn get_string_u16(buf: &mut Bytes, what: &str) -> Result<String> {
    if buf.remaining() < 2 {
        return Err(OrderGateError::Malformed(format!("missing {what}")));
    }
    let len = buf.get_u16_le() as usize;
    if buf.remaining() < len {
        return Err(OrderGateError::Malformed(format!("{what} truncated")));
    }
    let raw = buf.split_to(len);
    String::from_utf8(raw.to_vec())
        .map_err(|_| OrderGateError::Malformed(format!("{what} is not utf-8")))
}

pub(crate) fn put_bytes_u32(out: &mut BytesMut, b: &[u8]) -> Result<()> {
    let len = u32::try_from(b.len())
        .map_err(|_| OrderGateError::Malformed("field exceeds u32 length".into()))?;
    out.put_u32_le(len);
    out.put_slice(b);
    Ok(())
}

pub(crate) fn put_string_u16(out: &mut BytesMut, s: &str) -> Result<()> {
    let len = u16::try_from(s.len())
        .map_err(|_| OrderGateError::Malformed("string exceeds u16 length".into()))?;
    out.put_u16_le(len);
    out.put_slice(s.as_bytes());
    Ok(())
}

// --------------------
// Builders
// --------------------

/// Build an unsigned envelope with a full header for `channel_id`.
pub fn build_envelope(
    header_type: HeaderType,
    channel_id: &str,
    tx_id: &str,
    data: Bytes,
) -> Result<Envelope> {
    let payload = Payload {
        header: Some(Header {
            channel_header: Some(ChannelHeader {
                header_type: header_type.as_i32(),
                channel_id: channel_id.to_string(),
                tx_id: tx_id.to_string(),
                ..ChannelHeader::default()
            }),
            signature_header: SignatureHeader::default(),
        }),
        data,
    };
    Ok(Envelope {
        payload: encode_payload(&payload)?,
        signature: Bytes::new(),
    })
}
