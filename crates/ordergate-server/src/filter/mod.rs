//! Default admission filter rules.
//!
//! A [`RuleSet`] walks its rules in order; the first `Accept` or `Reject`
//! decides, `Forward` defers to the next rule.

pub mod rules;

pub use rules::{AcceptRule, EmptyRejectRule, Rule, RuleSet, SizeFilter, Verdict};
