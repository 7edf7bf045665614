//! Shared error type across ordergate crates.

use thiserror::Error;

use crate::protocol::status::Status;

/// Shared result type.
pub type Result<T> = std::result::Result<T, OrderGateError>;

/// Unified error type used by core and server.
///
/// Every variant that can end a broadcast session maps to exactly one wire
/// [`Status`]; transport and startup failures map to none.
#[derive(Debug, Error)]
pub enum OrderGateError {
    /// Payload, header, channel header or channel id missing/empty.
    #[error("malformed envelope: {0}")]
    Malformed(String),
    /// The config update processor judged the update invalid.
    #[error("config update rejected: {0}")]
    ConfigUpdateRejected(String),
    /// The config update processor produced an envelope that does not parse.
    #[error("config update processor produced a bad envelope: {0}")]
    ConfigUpdateBug(String),
    #[error("channel not found: {0}")]
    ChannelNotFound(String),
    #[error("rejected by filter: {0}")]
    FilterRejected(String),
    /// Ordering backend refused the envelope (shutting down).
    #[error("ordering backend unavailable")]
    BackendUnavailable,
    /// Receive/send failure on the underlying stream.
    #[error("transport: {0}")]
    Transport(String),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl OrderGateError {
    /// Map an error to the status sent back to the client.
    ///
    /// `None` means no response is attempted and the connection just ends.
    pub fn status(&self) -> Option<Status> {
        match self {
            OrderGateError::Malformed(_) => Some(Status::BadRequest),
            OrderGateError::ConfigUpdateRejected(_) => Some(Status::BadRequest),
            OrderGateError::ConfigUpdateBug(_) => Some(Status::InternalServerError),
            OrderGateError::ChannelNotFound(_) => Some(Status::NotFound),
            OrderGateError::FilterRejected(_) => Some(Status::BadRequest),
            OrderGateError::BackendUnavailable => Some(Status::ServiceUnavailable),
            OrderGateError::Transport(_) => None,
            OrderGateError::Config(_) => None,
            OrderGateError::Internal(_) => Some(Status::InternalServerError),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, OrderGateError::Transport(_))
    }
}
