//! Broadcast stream handler.
//!
//! Per envelope: validate header -> (config update: process + re-validate)
//! -> chain lookup -> filters -> enqueue -> respond.
//!
//! Protocol contract:
//! - `SUCCESS` keeps the stream open for the next envelope.
//! - Any other status is sent once and ends the stream.
//! - Receive/send failures end the stream without a response.

use std::sync::Arc;
use std::time::Instant;

use ordergate_core::error::{OrderGateError, Result};
use ordergate_core::protocol::envelope::{parse_channel_header, Envelope};
use ordergate_core::protocol::status::{BroadcastResponse, Status};

use crate::broadcast::stream::BroadcastStream;
use crate::broadcast::support::{ChainRegistry, ConfigUpdateProcessor};
use crate::obs::metrics::ServerMetrics;

/// Stateless across connections; share one instance via `Arc`.
pub struct BroadcastHandler {
    registry: Arc<dyn ChainRegistry>,
    processor: Arc<dyn ConfigUpdateProcessor>,
    metrics: Arc<ServerMetrics>,
}

impl BroadcastHandler {
    pub fn new(
        registry: Arc<dyn ChainRegistry>,
        processor: Arc<dyn ConfigUpdateProcessor>,
        metrics: Arc<ServerMetrics>,
    ) -> Self {
        Self {
            registry,
            processor,
            metrics,
        }
    }

    /// Serve one connection until the client stops sending, a terminal status
    /// was sent, or the transport fails.
    pub async fn handle<S>(&self, stream: &mut S) -> Result<()>
    where
        S: BroadcastStream + ?Sized,
    {
        let _active = ActiveStream::enter(&self.metrics);
        self.serve(stream).await
    }

    async fn serve<S>(&self, stream: &mut S) -> Result<()>
    where
        S: BroadcastStream + ?Sized,
    {
        loop {
            let Some(env) = stream.recv().await? else {
                tracing::debug!("client finished sending");
                return Ok(());
            };

            match self.admit(env).await {
                Ok(channel_id) => {
                    tracing::debug!(channel = %channel_id, "envelope enqueued");
                    self.respond(stream, Status::Success).await?;
                }
                Err(e) => {
                    let status = e.status().unwrap_or(Status::InternalServerError);
                    tracing::debug!(error = %e, status = status.as_str(), "closing broadcast stream");
                    return self.respond(stream, status).await;
                }
            }
        }
    }

    async fn respond<S>(&self, stream: &mut S, status: Status) -> Result<()>
    where
        S: BroadcastStream + ?Sized,
    {
        self.metrics
            .broadcast_responses
            .inc(&[("status", status.as_str())]);
        stream.send(BroadcastResponse::new(status)).await
    }

    /// Run one envelope through the pipeline. Ok carries the channel id it
    /// was enqueued on.
    async fn admit(&self, mut env: Envelope) -> Result<String> {
        let mut chdr = parse_channel_header(&env)?;

        if chdr.is_config_update() {
            tracing::debug!(channel = %chdr.channel_id, "preprocessing config update");
            let next = self.processor.process(&env).map_err(|e| {
                self.metrics.config_updates.inc(&[("outcome", "rejected")]);
                match e {
                    e @ OrderGateError::ConfigUpdateRejected(_) => e,
                    other => OrderGateError::ConfigUpdateRejected(other.to_string()),
                }
            })?;

            chdr = parse_channel_header(&next).map_err(|e| {
                self.metrics.config_updates.inc(&[("outcome", "bug")]);
                tracing::error!(
                    channel = %chdr.channel_id,
                    error = %e,
                    "config update processor generated an invalid envelope"
                );
                OrderGateError::ConfigUpdateBug(e.to_string())
            })?;

            self.metrics.config_updates.inc(&[("outcome", "processed")]);
            env = next;
        }

        let channel_id = chdr.channel_id;
        let support = self
            .registry
            .get_chain(&channel_id)
            .ok_or_else(|| OrderGateError::ChannelNotFound(channel_id.clone()))?;

        tracing::debug!(channel = %channel_id, "filtering envelope");
        support.filters().apply(&env).map_err(|e| match e {
            e @ OrderGateError::FilterRejected(_) => e,
            other => OrderGateError::FilterRejected(other.to_string()),
        })?;

        let started = Instant::now();
        let accepted = support.sink().enqueue(env).await;
        self.metrics
            .enqueue_duration
            .observe(&[("channel", channel_id.as_str())], started.elapsed());

        if !accepted {
            tracing::debug!(channel = %channel_id, "ordering backend is shutting down");
            return Err(OrderGateError::BackendUnavailable);
        }

        Ok(channel_id)
    }
}

/// Holds the `streams_active` gauge up for as long as a connection is served,
/// including when the handler future is dropped mid-await.
struct ActiveStream<'a> {
    metrics: &'a ServerMetrics,
}

impl<'a> ActiveStream<'a> {
    fn enter(metrics: &'a ServerMetrics) -> Self {
        metrics.streams_active.inc(&[]);
        Self { metrics }
    }
}

impl Drop for ActiveStream<'_> {
    fn drop(&mut self) {
        self.metrics.streams_active.dec(&[]);
    }
}
