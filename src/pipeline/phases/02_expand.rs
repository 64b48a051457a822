use crate::error::GeneratorError;
use crate::label::BuildLabel;
use crate::pipeline::context::{GenerationState, PipelineContext};
use crate::pipeline::phase_trait::GenerationPhase;
use crate::rule::RuleEntry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Requested labels with test aggregates flattened into their members
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Expansion {
    /// Rules to materialize as targets, including synthesized hosts
    pub targets: BTreeMap<BuildLabel, RuleEntry>,

    /// Test aggregates reached during expansion
    pub suites: BTreeMap<BuildLabel, RuleEntry>,

    /// Host application to one test that runs inside it
    pub host_links: BTreeMap<BuildLabel, BuildLabel>,

    /// Hosts that received a placeholder rule
    pub synthesized_hosts: BTreeSet<BuildLabel>,

    /// Targets reached only as members of an aggregate
    pub suite_members: BTreeSet<BuildLabel>,
}

/// Expands requested labels into real targets
///
/// Aggregates are traversed through their weak dependencies, depth first,
/// and never become targets themselves. A host linked from a target but not
/// itself a target gets a placeholder rule.
pub fn expand_targets(
    requested: &BTreeSet<BuildLabel>,
    rules: &BTreeMap<BuildLabel, RuleEntry>,
) -> Expansion {
    let mut expansion = Expansion::default();
    let mut visited: BTreeSet<BuildLabel> = BTreeSet::new();
    let mut worklist: Vec<&BuildLabel> = requested.iter().rev().collect();

    while let Some(label) = worklist.pop() {
        if !visited.insert(label.clone()) {
            continue;
        }
        let Some(entry) = rules.get(label) else {
            debug!(label = %label, "Skipping unresolved label during expansion");
            continue;
        };

        if entry.is_test_suite() {
            worklist.extend(entry.weak_dependencies.iter().rev());
            expansion.suites.insert(label.clone(), entry.clone());
        } else {
            expansion.targets.insert(label.clone(), entry.clone());
        }
    }

    expansion.suite_members = expansion
        .targets
        .keys()
        .filter(|label| !requested.contains(*label))
        .cloned()
        .collect();

    for (label, entry) in &expansion.targets {
        for host in &entry.linked_target_labels {
            expansion.host_links.insert(host.clone(), label.clone());
        }
    }

    for host in expansion.host_links.keys() {
        if !expansion.targets.contains_key(host) {
            expansion
                .targets
                .insert(host.clone(), RuleEntry::placeholder_host(host.clone()));
            expansion.synthesized_hosts.insert(host.clone());
        }
    }

    expansion
}

pub struct ExpandPhase;

impl GenerationPhase for ExpandPhase {
    fn name(&self) -> &'static str {
        "expand"
    }

    fn execute(
        &self,
        _context: &PipelineContext,
        state: &mut GenerationState,
    ) -> Result<(), GeneratorError> {
        let expansion = expand_targets(&state.requested, state.rules()?);

        for host in &expansion.synthesized_hosts {
            let test = expansion
                .host_links
                .get(host)
                .map(BuildLabel::as_str)
                .unwrap_or_default();
            state.diagnostics.warn(
                self.name(),
                format!(
                    "Test host {} for {} was not requested; generated a placeholder target without its configuration",
                    host, test
                ),
            );
        }

        info!(
            targets = expansion.targets.len(),
            suites = expansion.suites.len(),
            "Expanded targets"
        );
        state.expansion = Some(expansion);
        Ok(())
    }
}
