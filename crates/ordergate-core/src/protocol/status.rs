//! Broadcast status codes and the per-envelope response.

use serde::{Deserialize, Serialize};

/// Outcome of one broadcast envelope (stable wire API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    BadRequest,
    NotFound,
    InternalServerError,
    ServiceUnavailable,
}

impl Status {
    /// String representation used in JSON responses and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::BadRequest => "BAD_REQUEST",
            Status::NotFound => "NOT_FOUND",
            Status::InternalServerError => "INTERNAL_SERVER_ERROR",
            Status::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    /// Numeric code (HTTP-like).
    pub fn code(self) -> u16 {
        match self {
            Status::Success => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::InternalServerError => 500,
            Status::ServiceUnavailable => 503,
        }
    }

    /// Only `Success` keeps the session open.
    pub fn is_terminal(self) -> bool {
        self != Status::Success
    }
}

/// Response emitted for each processed envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub status: Status,
    pub code: u16,
}

impl BroadcastResponse {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            code: status.code(),
        }
    }

    pub fn to_json(&self) -> String {
        // Two plain fields; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"status\":\"{}\",\"code\":{}}}",
                self.status.as_str(),
                self.code
            )
        })
    }
}

impl From<Status> for BroadcastResponse {
    fn from(status: Status) -> Self {
        Self::new(status)
    }
}
