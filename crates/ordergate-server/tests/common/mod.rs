//! Test doubles for the broadcast handler collaborators.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use ordergate_core::error::{OrderGateError, Result};
use ordergate_core::protocol::envelope::{
    build_envelope, encode_payload, ChannelHeader, Envelope, Header, HeaderType, Payload,
    SignatureHeader,
};
use ordergate_core::protocol::status::{BroadcastResponse, Status};
use ordergate_server::broadcast::{
    BroadcastHandler, BroadcastStream, ChainRegistry, ChainSupport, ConfigUpdateProcessor,
    FilterChain, OrderingSink,
};
use ordergate_server::obs::ServerMetrics;

// --------------------
// Envelopes
// --------------------

pub fn tx(channel: &str) -> Envelope {
    build_envelope(
        HeaderType::EndorserTransaction,
        channel,
        "tx",
        Bytes::from_static(b"data"),
    )
    .unwrap()
}

pub fn config_update(channel: &str) -> Envelope {
    build_envelope(
        HeaderType::ConfigUpdate,
        channel,
        "cfg-tx",
        Bytes::from_static(b"update"),
    )
    .unwrap()
}

pub fn headerless() -> Envelope {
    Envelope {
        payload: encode_payload(&Payload {
            header: None,
            data: Bytes::from_static(b"data"),
        })
        .unwrap(),
        signature: Bytes::new(),
    }
}

pub fn without_channel_header() -> Envelope {
    Envelope {
        payload: encode_payload(&Payload {
            header: Some(Header {
                channel_header: None,
                signature_header: SignatureHeader::default(),
            }),
            data: Bytes::new(),
        })
        .unwrap(),
        signature: Bytes::new(),
    }
}

pub fn with_header(chdr: ChannelHeader) -> Envelope {
    Envelope {
        payload: encode_payload(&Payload {
            header: Some(Header {
                channel_header: Some(chdr),
                signature_header: SignatureHeader::default(),
            }),
            data: Bytes::from_static(b"data"),
        })
        .unwrap(),
        signature: Bytes::new(),
    }
}

// --------------------
// Stream
// --------------------

/// Scripted inbound side, recorded outbound side.
#[derive(Default)]
pub struct ScriptedStream {
    inbound: VecDeque<Result<Envelope>>,
    pub sent: Vec<Status>,
    pub recv_calls: usize,
    pub fail_send: bool,
}

impl ScriptedStream {
    pub fn new(envs: Vec<Envelope>) -> Self {
        Self {
            inbound: envs.into_iter().map(Ok).collect(),
            ..Self::default()
        }
    }

    pub fn push_error(&mut self, msg: &str) {
        self.inbound
            .push_back(Err(OrderGateError::Transport(msg.to_string())));
    }

    /// Envelopes the handler never read.
    pub fn unread(&self) -> usize {
        self.inbound.len()
    }
}

#[async_trait]
impl BroadcastStream for ScriptedStream {
    async fn recv(&mut self) -> Result<Option<Envelope>> {
        self.recv_calls += 1;
        match self.inbound.pop_front() {
            Some(Ok(env)) => Ok(Some(env)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    async fn send(&mut self, resp: BroadcastResponse) -> Result<()> {
        if self.fail_send {
            return Err(OrderGateError::Transport("peer gone".into()));
        }
        self.sent.push(resp.status);
        Ok(())
    }
}

// --------------------
// Collaborators
// --------------------

#[derive(Default)]
pub struct Calls(AtomicUsize);

impl Calls {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct FixedFilter {
    pub accept: bool,
    pub calls: Calls,
}

impl FilterChain for FixedFilter {
    fn apply(&self, _env: &Envelope) -> Result<()> {
        self.calls.hit();
        if self.accept {
            Ok(())
        } else {
            Err(OrderGateError::FilterRejected("always reject".into()))
        }
    }
}

pub struct FixedSink {
    pub accept: bool,
    pub calls: Calls,
    pub received: std::sync::Mutex<Vec<Envelope>>,
}

#[async_trait]
impl OrderingSink for FixedSink {
    async fn enqueue(&self, env: Envelope) -> bool {
        self.calls.hit();
        self.received.lock().unwrap().push(env);
        self.accept
    }
}

pub struct TestChain {
    pub filter: FixedFilter,
    pub sink: FixedSink,
}

impl TestChain {
    pub fn new(filter_accepts: bool, sink_accepts: bool) -> Arc<Self> {
        Arc::new(Self {
            filter: FixedFilter {
                accept: filter_accepts,
                calls: Calls::default(),
            },
            sink: FixedSink {
                accept: sink_accepts,
                calls: Calls::default(),
                received: std::sync::Mutex::new(Vec::new()),
            },
        })
    }
}

impl ChainSupport for TestChain {
    fn filters(&self) -> &dyn FilterChain {
        &self.filter
    }
    fn sink(&self) -> &dyn OrderingSink {
        &self.sink
    }
}

#[derive(Default)]
pub struct StaticRegistry {
    chains: HashMap<String, Arc<TestChain>>,
    pub lookups: Calls,
}

impl StaticRegistry {
    pub fn with(channel: &str, chain: Arc<TestChain>) -> Self {
        let mut chains = HashMap::new();
        chains.insert(channel.to_string(), chain);
        Self {
            chains,
            lookups: Calls::default(),
        }
    }
}

impl ChainRegistry for StaticRegistry {
    fn get_chain(&self, channel_id: &str) -> Option<Arc<dyn ChainSupport>> {
        self.lookups.hit();
        self.chains
            .get(channel_id)
            .map(|c| c.clone() as Arc<dyn ChainSupport>)
    }
}

/// What the processor double does with an update.
pub enum ProcessorMode {
    /// Rewrites the update into a CONFIG envelope for `channel`.
    Retarget(String),
    /// Reports the update as semantically invalid.
    Reject,
    /// Returns an envelope whose channel id is empty.
    Buggy,
}

pub struct FakeProcessor {
    pub mode: ProcessorMode,
    pub calls: Calls,
}

impl FakeProcessor {
    pub fn new(mode: ProcessorMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: Calls::default(),
        })
    }
}

impl ConfigUpdateProcessor for FakeProcessor {
    fn process(&self, _env: &Envelope) -> Result<Envelope> {
        self.calls.hit();
        match &self.mode {
            ProcessorMode::Retarget(channel) => Ok(build_envelope(
                HeaderType::Config,
                channel,
                "wrapped",
                Bytes::from_static(b"config"),
            )
            .unwrap()),
            ProcessorMode::Reject => Err(OrderGateError::ConfigUpdateRejected(
                "policy not satisfied".into(),
            )),
            ProcessorMode::Buggy => Ok(with_header(ChannelHeader {
                header_type: HeaderType::Config.as_i32(),
                ..ChannelHeader::default()
            })),
        }
    }
}

// --------------------
// Wiring
// --------------------

pub struct Harness {
    pub handler: BroadcastHandler,
    pub registry: Arc<StaticRegistry>,
    pub processor: Arc<FakeProcessor>,
    pub metrics: Arc<ServerMetrics>,
}

impl Harness {
    pub fn new(registry: StaticRegistry, mode: ProcessorMode) -> Self {
        let registry = Arc::new(registry);
        let processor = FakeProcessor::new(mode);
        let metrics = Arc::new(ServerMetrics::default());
        let handler = BroadcastHandler::new(
            registry.clone(),
            processor.clone(),
            metrics.clone(),
        );
        Self {
            handler,
            registry,
            processor,
            metrics,
        }
    }
}
