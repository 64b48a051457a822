use crate::error::GeneratorError;
use crate::pipeline::context::{GenerationState, PipelineContext};
use crate::pipeline::phase_trait::GenerationPhase;
use crate::xml::{plist_dict, PlistValue};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const PROJECT_FILE_NAME: &str = "project.pbxproj";
const SETTINGS_FILE_NAME: &str = "WorkspaceSettings.xcsettings";

/// Creates the bundle directory and writes the serialized project
///
/// Both steps are fatal. Workspace settings follow: the shared file is
/// always replaced, the per-user file only written when absent.
pub struct WriteProjectPhase;

impl WriteProjectPhase {
    fn shared_settings_path(state: &GenerationState) -> PathBuf {
        state
            .bundle_path
            .join("project.xcworkspace/xcshareddata")
            .join(SETTINGS_FILE_NAME)
    }

    fn user_settings_path(state: &GenerationState, user: &str) -> PathBuf {
        state
            .bundle_path
            .join("project.xcworkspace/xcuserdata")
            .join(format!("{}.xcuserdatad", user))
            .join(SETTINGS_FILE_NAME)
    }

    fn write_workspace_settings(&self, context: &PipelineContext, state: &mut GenerationState) {
        let fs = &context.file_system;

        let shared_path = Self::shared_settings_path(state);
        let shared = plist_dict(&[
            ("BuildSystemType", PlistValue::from("Original")),
            ("IDEWorkspaceSharedSettings_AutocreateContextsIfNeeded", false.into()),
        ]);
        if let Err(e) = fs.write_atomic(&shared_path, shared.as_bytes()) {
            state.diagnostics.warn(
                self.name(),
                format!("Failed to write workspace settings {}: {:#}", shared_path.display(), e),
            );
        }

        let user_path = Self::user_settings_path(state, &context.config.settings.user);
        if fs.exists(&user_path) {
            debug!(path = %user_path.display(), "Keeping existing user workspace settings");
            return;
        }
        let user = plist_dict(&[
            ("IDEWorkspaceUserSettings_HasAskedToTakeAutomaticSnapshotBeforeSignificantChanges", true.into()),
            ("IDEWorkspaceUserSettings_SnapshotAutomaticallyBeforeSignificantChanges", false.into()),
        ]);
        if let Err(e) = fs.write_atomic(&user_path, user.as_bytes()) {
            warn!(path = %user_path.display(), "Failed to write user workspace settings: {:#}", e);
        }
    }
}

impl GenerationPhase for WriteProjectPhase {
    fn name(&self) -> &'static str {
        "write_project"
    }

    fn execute(
        &self,
        context: &PipelineContext,
        state: &mut GenerationState,
    ) -> Result<(), GeneratorError> {
        let info = state.project()?;
        let fs = &context.file_system;

        fs.create_dir_all(&state.bundle_path)
            .map_err(|source| GeneratorError::ProjectDirectory {
                path: state.bundle_path.clone(),
                source,
            })?;

        let bytes = context
            .serializer
            .serialize(&info.project)
            .map_err(GeneratorError::Serialization)?;

        let project_path = state.bundle_path.join(PROJECT_FILE_NAME);
        fs.write_atomic(&project_path, &bytes)
            .map_err(|source| GeneratorError::ProjectWrite {
                path: project_path.clone(),
                source,
            })?;
        info!(path = %project_path.display(), bytes = bytes.len(), "Wrote project file");

        self.write_workspace_settings(context, state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::fs::FileSystem;
    use crate::pipeline::context::GeneratedProjectInfo;
    use crate::project::{ProjectGraph, ProjectSerializer};
    use crate::test_support::label;
    use anyhow::{bail, Result};
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::Path;
    use std::sync::Arc;

    fn state() -> GenerationState {
        let config = GeneratorConfig::new("Demo", vec![label("//a:A")]);
        let mut state = GenerationState::new(config, Path::new("/out"));
        state.project = Some(GeneratedProjectInfo {
            project: ProjectGraph::new("Demo"),
            build_targets: BTreeMap::new(),
            test_suites: BTreeMap::new(),
            suite_members: BTreeSet::new(),
        });
        state
    }

    #[test]
    fn test_writes_project_and_settings() {
        let (context, fs) = PipelineContext::with_mocks(Vec::new());
        let mut state = state();

        WriteProjectPhase.execute(&context, &mut state).unwrap();

        let project = fs.contents_string("/out/Demo.xcodeproj/project.pbxproj").unwrap();
        assert!(project.contains("\"name\": \"Demo\""));
        assert!(fs
            .contents_string("/out/Demo.xcodeproj/project.xcworkspace/xcshareddata/WorkspaceSettings.xcsettings")
            .unwrap()
            .contains("BuildSystemType"));
        assert!(fs.exists(Path::new(
            "/out/Demo.xcodeproj/project.xcworkspace/xcuserdata/tester.xcuserdatad/WorkspaceSettings.xcsettings"
        )));
        assert!(state.diagnostics.is_empty());
    }

    #[test]
    fn test_existing_user_settings_are_kept() {
        let (context, fs) = PipelineContext::with_mocks(Vec::new());
        let user_settings =
            "/out/Demo.xcodeproj/project.xcworkspace/xcuserdata/tester.xcuserdatad/WorkspaceSettings.xcsettings";
        fs.add_file(user_settings, "custom");
        let shared = "/out/Demo.xcodeproj/project.xcworkspace/xcshareddata/WorkspaceSettings.xcsettings";
        fs.add_file(shared, "stale");

        WriteProjectPhase.execute(&context, &mut state()).unwrap();

        assert_eq!(fs.contents_string(user_settings).unwrap(), "custom");
        assert_ne!(fs.contents_string(shared).unwrap(), "stale");
    }

    #[test]
    fn test_user_settings_failure_is_swallowed() {
        let (context, fs) = PipelineContext::with_mocks(Vec::new());
        fs.deny("/out/Demo.xcodeproj/project.xcworkspace/xcuserdata");
        let mut state = state();

        WriteProjectPhase.execute(&context, &mut state).unwrap();
        assert!(state.diagnostics.is_empty());
    }

    #[test]
    fn test_directory_failure_is_fatal() {
        let (context, fs) = PipelineContext::with_mocks(Vec::new());
        fs.deny("/out");

        let error = WriteProjectPhase.execute(&context, &mut state()).unwrap_err();
        assert!(matches!(error, GeneratorError::ProjectDirectory { .. }));
        assert!(fs.file_paths().is_empty());
    }

    struct FailingSerializer;

    impl ProjectSerializer for FailingSerializer {
        fn serialize(&self, _project: &ProjectGraph) -> Result<Vec<u8>> {
            bail!("codec failure")
        }
    }

    #[test]
    fn test_serialization_failure_is_fatal() {
        let (context, fs) = PipelineContext::with_mocks(Vec::new());
        let context = context.with_serializer(Arc::new(FailingSerializer));

        let error = WriteProjectPhase.execute(&context, &mut state()).unwrap_err();
        assert!(matches!(error, GeneratorError::Serialization(_)));
        assert!(!fs.exists(Path::new("/out/Demo.xcodeproj/project.pbxproj")));
    }
}
