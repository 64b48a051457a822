use crate::error::GeneratorError;
use crate::path_trie::PathTrie;
use crate::pipeline::context::{GenerationState, PipelineContext};
use crate::pipeline::phase_trait::GenerationPhase;
use crate::project::ProjectGraph;
use std::path::Path;
use tracing::info;

/// Directories that must exist before the build tool writes generated files
///
/// Collects the parent directory of every generated file reference,
/// anchored at `workspace_root`.
pub fn plan_artifact_directories(project: &ProjectGraph, workspace_root: &Path) -> PathTrie {
    let mut trie = PathTrie::new();
    project.main_group.visit_files("", &mut |visit| {
        if visit.file.is_input_file {
            return;
        }
        let Some(parent) = Path::new(&visit.path).parent() else {
            return;
        };
        if !parent.as_os_str().is_empty() {
            trie.insert(workspace_root.join(parent));
        }
    });
    trie
}

pub struct ArtifactDirsPhase;

impl GenerationPhase for ArtifactDirsPhase {
    fn name(&self) -> &'static str {
        "artifact_dirs"
    }

    fn execute(
        &self,
        context: &PipelineContext,
        state: &mut GenerationState,
    ) -> Result<(), GeneratorError> {
        let info = state.project()?;
        let trie = plan_artifact_directories(&info.project, &state.config.workspace_root);
        let leaves = trie.leaf_paths();

        let mut failures = Vec::new();
        for leaf in &leaves {
            if let Err(e) = context.file_system.create_dir_all(leaf) {
                failures.push(format!("{} ({:#})", leaf.display(), e));
            }
        }

        info!(directories = leaves.len(), failed = failures.len(), "Created artifact directories");
        if !failures.is_empty() {
            failures.sort();
            state.diagnostics.warn(
                self.name(),
                format!(
                    "Failed to create {} artifact director{}: {}",
                    failures.len(),
                    if failures.len() == 1 { "y" } else { "ies" },
                    failures.join(", ")
                ),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::fs::FileSystem;
    use crate::pipeline::context::GeneratedProjectInfo;
    use crate::project::{FileReference, Group};
    use crate::test_support::label;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::PathBuf;

    fn project() -> ProjectGraph {
        let mut project = ProjectGraph::new("Demo");
        let main = &mut project.main_group;
        main.get_or_create_group("app")
            .add_file(FileReference::new("main.m", None, true));
        let genfiles = main.get_or_create_group("bazel-genfiles");
        let app = genfiles.get_or_create_group("app");
        app.add_file(FileReference::new("Gen.m", None, false));
        app.get_or_create_group("proto")
            .add_file(FileReference::new("Msg.pb.m", None, false));
        genfiles
            .get_or_create_group("lib")
            .add_file(FileReference::new("Lib.m", None, false));
        project
    }

    fn state_with(project: ProjectGraph, workspace_root: &str) -> GenerationState {
        let mut config = GeneratorConfig::new("Demo", vec![label("//app:App")]);
        config.workspace_root = PathBuf::from(workspace_root);
        let mut state = GenerationState::new(config, Path::new("/out"));
        state.project = Some(GeneratedProjectInfo {
            project,
            build_targets: BTreeMap::new(),
            test_suites: BTreeMap::new(),
            suite_members: BTreeSet::new(),
        });
        state
    }

    #[test]
    fn test_plan_only_leaf_directories_of_artifacts() {
        let trie = plan_artifact_directories(&project(), Path::new("/ws"));
        let leaves: BTreeSet<PathBuf> = trie.leaf_paths().into_iter().collect();

        assert_eq!(
            leaves,
            [
                PathBuf::from("/ws/bazel-genfiles/app/proto"),
                PathBuf::from("/ws/bazel-genfiles/lib"),
            ]
            .into_iter()
            .collect()
        );
    }

    #[test]
    fn test_inputs_only_plan_nothing() {
        let mut project = ProjectGraph::new("Demo");
        project.main_group = Group::main();
        project
            .main_group
            .get_or_create_group("app")
            .add_file(FileReference::new("main.m", None, true));

        assert!(plan_artifact_directories(&project, Path::new("/ws")).is_empty());
    }

    #[test]
    fn test_phase_creates_directories() {
        let (context, fs) = PipelineContext::with_mocks(Vec::new());
        let mut state = state_with(project(), "/ws");

        ArtifactDirsPhase.execute(&context, &mut state).unwrap();

        assert!(fs.is_dir(Path::new("/ws/bazel-genfiles/app/proto")));
        assert!(fs.is_dir(Path::new("/ws/bazel-genfiles/lib")));
        assert!(state.diagnostics.is_empty());
    }

    #[test]
    fn test_failures_are_one_warning() {
        let (context, fs) = PipelineContext::with_mocks(Vec::new());
        fs.deny("/ws/bazel-genfiles");
        let mut state = state_with(project(), "/ws");

        ArtifactDirsPhase.execute(&context, &mut state).unwrap();

        assert_eq!(state.diagnostics.len(), 1);
        let message = &state.diagnostics.messages()[0];
        assert!(message.starts_with("Failed to create 2 artifact directories"));
        assert!(message.contains("/ws/bazel-genfiles/lib"));
    }
}
