use crate::error::GeneratorError;
use crate::label::BuildLabel;
use crate::pipeline::context::{GenerationState, PipelineContext};
use crate::pipeline::phase_trait::GenerationPhase;
use crate::rule::RuleEntry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Requested labels the lookup has no rule for
pub fn unresolved_labels(
    requested: &BTreeSet<BuildLabel>,
    rules: &BTreeMap<BuildLabel, RuleEntry>,
) -> BTreeSet<BuildLabel> {
    requested
        .iter()
        .filter(|label| !rules.contains_key(*label))
        .cloned()
        .collect()
}

/// Queries the build tool and fails unless every requested label resolved
pub struct ResolvePhase;

impl GenerationPhase for ResolvePhase {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn execute(
        &self,
        context: &PipelineContext,
        state: &mut GenerationState,
    ) -> Result<(), GeneratorError> {
        let rules = context
            .rule_lookup
            .resolve(&state.requested, &state.config.build_options)
            .map_err(GeneratorError::RuleLookup)?;

        let missing = unresolved_labels(&state.requested, &rules);
        if !missing.is_empty() {
            return Err(GeneratorError::LabelResolutionFailed(missing));
        }

        info!(
            requested = state.requested.len(),
            resolved = rules.len(),
            "Resolved build labels"
        );
        debug!(labels = ?rules.keys().map(BuildLabel::as_str).collect::<Vec<_>>(), "Rule entries");
        state.rules = Some(rules);
        Ok(())
    }
}
