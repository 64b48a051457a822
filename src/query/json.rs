use super::RuleLookup;
use crate::label::BuildLabel;
use crate::rule::RuleEntry;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleDump {
    Wrapped { rules: Vec<RuleEntry> },
    Bare(Vec<RuleEntry>),
}

/// Rule lookup backed by a JSON dump of the build graph
///
/// The dump is either a list of rule entries or an object with a `rules`
/// list. Resolving a label returns its entry together with every rule
/// reachable through dependencies, suite members and linked hosts.
#[derive(Debug, Clone, Default)]
pub struct JsonRuleLookup {
    rules: BTreeMap<BuildLabel, RuleEntry>,
}

impl JsonRuleLookup {
    pub fn new(entries: impl IntoIterator<Item = RuleEntry>) -> Self {
        Self {
            rules: entries
                .into_iter()
                .map(|entry| (entry.label.clone(), entry))
                .collect(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read rule dump {:?}", path))?;
        Self::from_json(&contents).with_context(|| format!("Invalid rule dump {:?}", path))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let dump: RuleDump = serde_json::from_str(contents).context("Failed to parse rule dump")?;
        let entries = match dump {
            RuleDump::Wrapped { rules } => rules,
            RuleDump::Bare(rules) => rules,
        };
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RuleLookup for JsonRuleLookup {
    fn resolve(
        &self,
        labels: &BTreeSet<BuildLabel>,
        build_options: &[String],
    ) -> Result<BTreeMap<BuildLabel, RuleEntry>> {
        if !build_options.is_empty() {
            debug!(options = ?build_options, "Build options do not affect a static rule dump");
        }

        let mut resolved = BTreeMap::new();
        let mut pending: Vec<&BuildLabel> = labels.iter().collect();
        while let Some(label) = pending.pop() {
            if resolved.contains_key(label) {
                continue;
            }
            let Some(entry) = self.rules.get(label) else {
                continue;
            };
            pending.extend(entry.dependencies.iter());
            pending.extend(entry.weak_dependencies.iter());
            pending.extend(entry.linked_target_labels.iter());
            resolved.insert(label.clone(), entry.clone());
        }

        debug!(requested = labels.len(), resolved = resolved.len(), "Resolved rules from dump");
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn test_resolve_follows_relations() {
        let lookup = JsonRuleLookup::new(vec![
            rule("//app:Suite", "test_suite").with_weak_dependencies([label("//app:Tests")]),
            rule("//app:Tests", "ios_unit_test").with_linked_targets([label("//app:Host")]),
            rule("//app:Host", "ios_application"),
            rule("//other:Unrelated", "objc_library"),
        ]);

        let requested: BTreeSet<_> = [label("//app:Suite"), label("//app:Missing")].into();
        let resolved = lookup.resolve(&requested, &[]).unwrap();

        let keys: Vec<&str> = resolved.keys().map(BuildLabel::as_str).collect();
        assert_eq!(keys, vec!["//app:Host", "//app:Suite", "//app:Tests"]);
    }

    #[test]
    fn test_from_json_accepts_both_shapes() {
        let bare = r#"[{"label": "//a:A", "type": "objc_library"}]"#;
        let wrapped = r#"{"rules": [{"label": "//a:A", "type": "objc_library"}]}"#;

        assert_eq!(JsonRuleLookup::from_json(bare).unwrap().len(), 1);
        assert_eq!(JsonRuleLookup::from_json(wrapped).unwrap().len(), 1);
        assert!(JsonRuleLookup::from_json("{}").is_err());
    }
}
