use crate::error::GeneratorError;
use crate::label::BuildLabel;
use crate::pipeline::context::{GeneratedProjectInfo, GenerationState, PipelineContext};
use crate::pipeline::phase_trait::GenerationPhase;
use crate::rule::RuleEntry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Collects `targets` and every rule they reach through strong dependencies
///
/// Targets come first in label order, followed by the dependencies that are
/// not targets themselves. Dependencies missing from `rules` are skipped.
pub fn dependency_closure<'a>(
    targets: &'a BTreeMap<BuildLabel, RuleEntry>,
    rules: &'a BTreeMap<BuildLabel, RuleEntry>,
) -> Vec<&'a RuleEntry> {
    let mut visited: BTreeSet<&BuildLabel> = targets.keys().collect();
    let mut dependencies: BTreeMap<&BuildLabel, &RuleEntry> = BTreeMap::new();
    let mut worklist: Vec<&RuleEntry> = targets.values().collect();

    while let Some(entry) = worklist.pop() {
        for dependency in &entry.dependencies {
            if !visited.insert(dependency) {
                continue;
            }
            match rules.get(dependency) {
                Some(rule) => {
                    dependencies.insert(dependency, rule);
                    worklist.push(rule);
                }
                None => debug!(label = %dependency, "Dependency has no rule entry"),
            }
        }
    }

    targets.values().chain(dependencies.into_values()).collect()
}

/// Drives the object builder over the expanded rule set
pub struct BuildProjectPhase;

impl GenerationPhase for BuildProjectPhase {
    fn name(&self) -> &'static str {
        "build_project"
    }

    fn execute(
        &self,
        context: &PipelineContext,
        state: &mut GenerationState,
    ) -> Result<(), GeneratorError> {
        let expansion = state.expansion()?;
        let rules = state.rules()?;
        let builder = &context.builder;
        let entries: Vec<&RuleEntry> = expansion.targets.values().collect();
        let indexed = dependency_closure(&expansion.targets, rules);
        debug!(
            targets = entries.len(),
            indexed = indexed.len(),
            "Collected rules for the project"
        );

        let mut project = builder.new_project(&state.config);
        builder.add_source_files(&mut project, &indexed, &state.config.additional_file_paths);
        builder.add_indexer_targets(&mut project, &indexed);
        builder
            .add_build_targets(&mut project, &entries)
            .map_err(GeneratorError::ProjectBuild)?;
        builder.add_clean_target(&mut project);
        builder.add_build_configurations(&mut project, &state.config.build_configurations);

        info!(
            project = %project.name,
            targets = project.targets.len(),
            configurations = project.build_configurations.len(),
            "Built project objects"
        );

        let info = GeneratedProjectInfo {
            project,
            build_targets: expansion.targets.clone(),
            test_suites: expansion.suites.clone(),
            suite_members: expansion.suite_members.clone(),
        };
        state.project = Some(info);
        Ok(())
    }
}
