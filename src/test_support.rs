//! Shared fixtures for unit tests

use crate::label::BuildLabel;
use crate::rule::RuleEntry;
use std::collections::BTreeMap;

/// Output base used by pipeline contexts built with `PipelineContext::with_mocks`
pub const MOCK_OUTPUT_BASE: &str = "/cache/output";

pub fn label(value: &str) -> BuildLabel {
    BuildLabel::parse(value).unwrap()
}

pub fn rule(value: &str, kind: &str) -> RuleEntry {
    RuleEntry::new(label(value), kind)
}

pub fn rule_map(entries: Vec<RuleEntry>) -> BTreeMap<BuildLabel, RuleEntry> {
    entries
        .into_iter()
        .map(|entry| (entry.label.clone(), entry))
        .collect()
}
