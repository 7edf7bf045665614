//! Decode-once codec for WebSocket messages.
//!
//! - Binary frames => Envelope (panic-free frame split)
//! - Text frames are not part of the protocol
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use bytes::Bytes;

use ordergate_core::error::{OrderGateError, Result};
use ordergate_core::protocol::envelope::{decode_envelope, Envelope};

#[derive(Debug)]
pub enum Inbound {
    Envelope(Envelope),
    Ping,
    Pong,
    Close,
}

/// Decode one message. Errors are transport-level: an undecodable frame
/// cannot be answered with a status.
pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Binary(b) => {
            let env = decode_envelope(Bytes::from(b))
                .map_err(|e| OrderGateError::Transport(format!("bad envelope frame: {e}")))?;
            Ok(Inbound::Envelope(env))
        }
        Message::Text(_) => Err(OrderGateError::Transport(
            "text frames are not supported".into(),
        )),
        Message::Ping(_) => Ok(Inbound::Ping),
        Message::Pong(_) => Ok(Inbound::Pong),
        Message::Close(_) => Ok(Inbound::Close),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use ordergate_core::protocol::envelope::{build_envelope, encode_envelope, HeaderType};

    use super::*;

    #[test]
    fn binary_frame_decodes_to_envelope() {
        let env = build_envelope(HeaderType::Message, "c", "t", Bytes::from_static(b"d")).unwrap();
        let frame = encode_envelope(&env).unwrap();
        match decode(Message::Binary(frame.to_vec())).unwrap() {
            Inbound::Envelope(got) => assert_eq!(got, env),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn text_and_short_frames_are_transport_errors() {
        assert!(decode(Message::Text("hi".into())).unwrap_err().is_transport());
        assert!(decode(Message::Binary(vec![1])).unwrap_err().is_transport());
    }
}
