use crate::error::GeneratorError;
use crate::pipeline::context::{GenerationState, PipelineContext};
use crate::pipeline::diagnostics::Diagnostics;
use crate::pipeline::phase_trait::GenerationPhase;
use crate::project::{Group, Reference, SourceTree};
use crate::query::ExternalPathResolver;
use tracing::{debug, info};

/// Main-group child that collects references into external repositories
pub const EXTERNAL_GROUP_NAME: &str = "external";

const PHASE_NAME: &str = "external";

/// Moves external repository groups to absolute `@<repo>` groups
///
/// Children whose path cannot be resolved stay under the external group,
/// which is dropped from the main group once nothing is left in it. Returns
/// the number of repositories moved. Running it again on a patched group is
/// a no-op.
pub fn patch_external_references(
    main_group: &mut Group,
    resolver: &dyn ExternalPathResolver,
    diagnostics: &mut Diagnostics,
) -> usize {
    let Some(index) = main_group.children.iter().position(
        |child| matches!(child, Reference::Group(group) if group.name == EXTERNAL_GROUP_NAME),
    ) else {
        return 0;
    };
    let Reference::Group(mut external) = main_group.children.remove(index) else {
        return 0;
    };

    let mut patched = 0;
    let mut remaining = Vec::new();
    for child in std::mem::take(&mut external.children) {
        let repository = match child {
            Reference::Group(repository) => repository,
            other => {
                remaining.push(other);
                continue;
            }
        };

        let synthetic = format!("{}/{}", EXTERNAL_GROUP_NAME, repository.name);
        let Some(resolved) = resolver.resolve_external_path(&synthetic) else {
            diagnostics.warn(
                PHASE_NAME,
                format!(
                    "Could not resolve a path for {}; its files stay under the build tool's external directory",
                    synthetic
                ),
            );
            remaining.push(Reference::Group(repository));
            continue;
        };

        debug!(repository = %repository.name, path = %resolved.display(), "Patched external repository");
        let patched_group = main_group.get_or_create_group(&format!("@{}", repository.name));
        patched_group.path = Some(resolved.to_string_lossy().into_owned());
        patched_group.source_tree = SourceTree::Absolute;
        patched_group.uses_name_for_display = true;
        patched_group.children.extend(repository.children);
        patched += 1;
    }

    if !remaining.is_empty() {
        external.children = remaining;
        let index = index.min(main_group.children.len());
        main_group.children.insert(index, Reference::Group(external));
    }
    patched
}

pub struct ExternalPhase;

impl GenerationPhase for ExternalPhase {
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
            .as_mut()
            .ok_or(GeneratorError::MissingState("project"))?;
        let patched = patch_external_references(
            &mut info.project.main_group,
            context.path_resolver.as_ref(),
            &mut state.diagnostics,
        );
        info!(repositories = patched, "Patched external references");
        Ok(())
    }
}
