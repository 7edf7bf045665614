use ordergate_core::error::{OrderGateError, Result};
use ordergate_core::protocol::envelope::Envelope;

use crate::broadcast::support::FilterChain;

/// Decision from a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(&'static str),
    Forward,
}

pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, env: &Envelope) -> Verdict;
}

/// Rejects envelopes with an empty payload.
pub struct EmptyRejectRule;

impl Rule for EmptyRejectRule {
    fn name(&self) -> &'static str {
        "empty_reject"
    }

    fn apply(&self, env: &Envelope) -> Verdict {
        if env.payload.is_empty() {
            Verdict::Reject("empty payload")
        } else {
            Verdict::Forward
        }
    }
}

/// Rejects payloads larger than `max_bytes`.
pub struct SizeFilter {
    max_bytes: usize,
}

impl SizeFilter {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

impl Rule for SizeFilter {
    fn name(&self) -> &'static str {
        "size"
    }

    fn apply(&self, env: &Envelope) -> Verdict {
        if env.payload.len() > self.max_bytes {
            Verdict::Reject("payload exceeds max_message_bytes")
        } else {
            Verdict::Forward
        }
    }
}

/// Terminal rule that accepts anything that got this far.
pub struct AcceptRule;

impl Rule for AcceptRule {
    fn name(&self) -> &'static str {
        "accept"
    }

    fn apply(&self, _env: &Envelope) -> Verdict {
        Verdict::Accept
    }
}

/// Ordered rule list. Construct once per channel, then share via Arc.
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Empty-reject, size limit, then accept.
    pub fn standard(max_message_bytes: usize) -> Self {
        Self::new(vec![
            Box::new(EmptyRejectRule),
            Box::new(SizeFilter::new(max_message_bytes)),
            Box::new(AcceptRule),
        ])
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

impl FilterChain for RuleSet {
    fn apply(&self, env: &Envelope) -> Result<()> {
        for rule in &self.rules {
            match rule.apply(env) {
                Verdict::Accept => return Ok(()),
                Verdict::Reject(msg) => {
                    tracing::debug!(rule = rule.name(), reason = msg, "filter rejected envelope");
                    return Err(OrderGateError::FilterRejected(format!(
                        "{}: {msg}",
                        rule.name()
                    )));
                }
                Verdict::Forward => continue,
            }
        }
        // strict deny: nothing accepted
        Err(OrderGateError::FilterRejected("no rule accepted the envelope".into()))
    }
}
