use crate::error::GeneratorError;
use crate::label::BuildLabel;
use crate::pipeline::context::{GeneratedProjectInfo, GenerationState, PipelineContext};
use crate::pipeline::diagnostics::Diagnostics;
use crate::pipeline::phase_trait::GenerationPhase;
use crate::project::Target;
use crate::rule::{RuleEntry, TargetType};
use crate::scheme::{LaunchStyle, XcodeScheme, SCHEME_EXTENSION};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Location of shared schemes inside the project bundle
pub const SCHEMES_DIR: &str = "xcshareddata/xcschemes";

const PHASE_NAME: &str = "schemes";
const SUITE_SUFFIX: &str = "_Suite";

/// A scheme together with the file name it is written under
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedScheme {
    pub file_name: String,
    pub scheme: XcodeScheme,
}

/// Plans one scheme per real target and one per test aggregate
///
/// Tests reached only through an aggregate appear in the aggregate's
/// scheme instead of getting their own.
pub fn synthesize_schemes(
    info: &GeneratedProjectInfo,
    bundle_name: &str,
    test_prefix: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<PlannedScheme> {
    let test_configuration = format!("{}Debug", test_prefix);
    let mut planned = target_schemes(info, bundle_name, &test_configuration, diagnostics);
    planned.extend(suite_schemes(info, bundle_name, &test_configuration, diagnostics));
    planned
}

fn target_schemes(
    info: &GeneratedProjectInfo,
    bundle_name: &str,
    test_configuration: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<PlannedScheme> {
    let mut planned = Vec::new();
    for entry in info.build_targets.values() {
        if info.suite_members.contains(&entry.label) {
            debug!(label = %entry.label, "Target is covered by its suite scheme");
            continue;
        }
        let Some(target) = info.project.resolve_target(&entry.label).target() else {
            diagnostics.warn(
                PHASE_NAME,
                format!("No target was generated for {}; skipping its scheme", entry.label),
            );
            continue;
        };

        let launch_style = match entry.target_type {
            Some(TargetType::AppExtension) => LaunchStyle::AppExtension,
            _ => LaunchStyle::Normal,
        };
        let scheme = XcodeScheme::new(target, bundle_name, test_configuration)
            .with_launch_style(launch_style);
        planned.push(PlannedScheme {
            file_name: format!("{}.{}", target.name, SCHEME_EXTENSION),
            scheme,
        });
    }
    planned
}

/// Leaf test labels of `suite`, descending into nested aggregates
fn suite_members(suite: &RuleEntry, suites: &BTreeMap<BuildLabel, RuleEntry>) -> BTreeSet<BuildLabel> {
    let mut members = BTreeSet::new();
    let mut visited = BTreeSet::new();
    let mut worklist: Vec<&BuildLabel> = suite.weak_dependencies.iter().collect();

    while let Some(label) = worklist.pop() {
        if !visited.insert(label) {
            continue;
        }
        match suites.get(label) {
            Some(nested) => worklist.extend(nested.weak_dependencies.iter()),
            None => {
                members.insert(label.clone());
            }
        }
    }
    members
}

fn suite_schemes(
    info: &GeneratedProjectInfo,
    bundle_name: &str,
    test_configuration: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<PlannedScheme> {
    let mut by_short_name: BTreeMap<&str, Vec<&RuleEntry>> = BTreeMap::new();
    for suite in info.test_suites.values() {
        by_short_name
            .entry(suite.label.target_name())
            .or_default()
            .push(suite);
    }

    let project = &info.project;
    let mut planned = Vec::new();
    for (short_name, group) in by_short_name {
        let collides = group.len() > 1;
        for suite in group {
            let mut anchor: Option<&Target> = None;
            let mut tests: Vec<&Target> = Vec::new();

            for member in suite_members(suite, &info.test_suites) {
                let Some(test) = project.resolve_target(&member).target() else {
                    diagnostics.warn(
                        PHASE_NAME,
                        format!("Test {} of {} has no generated target", member, suite.label),
                    );
                    continue;
                };
                let Some(host) = project.host_for_test(test) else {
                    diagnostics.warn(
                        PHASE_NAME,
                        format!("Test {} of {} has no host application", member, suite.label),
                    );
                    continue;
                };
                anchor.get_or_insert(host);
                tests.push(test);
            }

            let Some(host) = anchor else {
                diagnostics.warn(
                    PHASE_NAME,
                    format!("No test in {} resolved to a host application; skipping its scheme", suite.label),
                );
                continue;
            };

            let base_name = if collides {
                suite.label.full_target_name()
            } else {
                short_name.to_string()
            };
            debug!(suite = %suite.label, host = %host.name, tests = tests.len(), "Planned suite scheme");
            planned.push(PlannedScheme {
                file_name: format!("{}{}.{}", base_name, SUITE_SUFFIX, SCHEME_EXTENSION),
                scheme: XcodeScheme::new(host, bundle_name, test_configuration).with_explicit_tests(tests),
            });
        }
    }
    planned
}

pub struct SchemesPhase;

impl GenerationPhase for SchemesPhase {
    fn name(&self) -> &'static str {
        PHASE_NAME
    }

    fn execute(
        &self,
        context: &PipelineContext,
        state: &mut GenerationState,
    ) -> Result<(), GeneratorError> {
        let info = state
            .project
            .as_ref()
            .ok_or(GeneratorError::MissingState("project"))?;
        let planned = synthesize_schemes(
            info,
            &state.config.bundle_name(),
            context.builder.test_configuration_prefix(),
            &mut state.diagnostics,
        );

        let schemes_dir = state.bundle_path.join(SCHEMES_DIR);
        let mut written = 0;
        for PlannedScheme { file_name, scheme } in &planned {
            let path = schemes_dir.join(file_name);
            match context.file_system.write_atomic(&path, scheme.to_xml().as_bytes()) {
                Ok(()) => written += 1,
                Err(e) => state.diagnostics.warn(
                    PHASE_NAME,
                    format!("Failed to write scheme {}: {:#}", path.display(), e),
                ),
            }
        }

        info!(planned = planned.len(), written, "Wrote schemes");
        Ok(())
    }
}
