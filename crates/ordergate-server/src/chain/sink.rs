//! Bounded in-process ordering sink.
//!
//! `enqueue` waits for a queue slot (backpressure) and returns `false` once
//! the sink is halted or the drain side is gone.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use ordergate_core::protocol::envelope::Envelope;

use crate::broadcast::support::OrderingSink;
use crate::obs::metrics::ServerMetrics;

pub struct QueueSink {
    tx: mpsc::Sender<Envelope>,
    halted: AtomicBool,
}

impl QueueSink {
    /// Sink plus the receiving end the backend drains.
    pub fn new(depth: usize) -> (Self, mpsc::Receiver<Envelope>) {
        let (tx, rx) = mpsc::channel(depth.max(1));
        (
            Self {
                tx,
                halted: AtomicBool::new(false),
            },
            rx,
        )
    }

    /// Stop accepting work. Already queued envelopes still drain.
    pub fn halt(&self) {
        self.halted.store(true, Ordering::Relaxed);
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl OrderingSink for QueueSink {
    async fn enqueue(&self, env: Envelope) -> bool {
        if self.is_halted() {
            return false;
        }
        let Ok(permit) = self.tx.reserve().await else {
            return false;
        };
        // halt() may have run while waiting for the slot
        if self.is_halted() {
            return false;
        }
        permit.send(env);
        true
    }
}

/// Drain task: number each envelope in arrival order and count it.
pub fn spawn_drain(
    channel_id: String,
    mut rx: mpsc::Receiver<Envelope>,
    height: Arc<AtomicU64>,
    metrics: Arc<ServerMetrics>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(env) = rx.recv().await {
            let seq = height.fetch_add(1, Ordering::Relaxed) + 1;
            metrics
                .envelopes_ordered
                .inc(&[("channel", channel_id.as_str())]);
            tracing::debug!(
                channel = %channel_id,
                seq,
                bytes = env.payload.len(),
                "envelope ordered"
            );
        }
        tracing::debug!(channel = %channel_id, "drain stopped");
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use bytes::Bytes;

    use super::*;

    fn env() -> Envelope {
        Envelope {
            payload: Bytes::from_static(b"p"),
            signature: Bytes::new(),
        }
    }

    #[tokio::test]
    async fn accepts_until_halted() {
        let (sink, mut rx) = QueueSink::new(4);
        assert!(sink.enqueue(env()).await);
        assert_eq!(rx.recv().await.map(|e| e.payload), Some(Bytes::from_static(b"p")));

        sink.halt();
        assert!(!sink.enqueue(env()).await);
    }

    #[tokio::test]
    async fn enqueue_waiting_for_a_slot_is_refused_after_halt() {
        let (sink, mut rx) = QueueSink::new(1);
        let sink = Arc::new(sink);
        assert!(sink.enqueue(env()).await);

        let parked = tokio::spawn({
            let sink = Arc::clone(&sink);
            async move { sink.enqueue(env()).await }
        });
        // let the second enqueue block on the full queue
        tokio::task::yield_now().await;
        assert!(!parked.is_finished());

        sink.halt();
        assert!(rx.recv().await.is_some());

        assert!(!parked.await.unwrap());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn refuses_when_drain_is_gone() {
        let (sink, rx) = QueueSink::new(1);
        drop(rx);
        assert!(!sink.enqueue(env()).await);
    }

    #[tokio::test]
    async fn drain_numbers_envelopes() {
        let (sink, rx) = QueueSink::new(8);
        let height = Arc::new(AtomicU64::new(0));
        let metrics = Arc::new(ServerMetrics::default());
        let task = spawn_drain("c".into(), rx, Arc::clone(&height), Arc::clone(&metrics));

        for _ in 0..3 {
            assert!(sink.enqueue(env()).await);
        }
        drop(sink);
        task.await.ok();

        assert_eq!(height.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.envelopes_ordered.get(&[("channel", "c")]), 3);
    }
}
