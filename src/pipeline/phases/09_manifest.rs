use crate::error::GeneratorError;
use crate::pipeline::context::{GenerationState, PipelineContext};
use crate::pipeline::phase_trait::GenerationPhase;
use crate::project::builder::VERSIONED_MODEL_FILE_TYPE;
use crate::project::ProjectGraph;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Bump on any breaking change to the meaning of the manifest lists
pub const MANIFEST_VERSION: u32 = 1;

pub const MANIFEST_FILE_NAME: &str = "generatorManifest.json";

/// File types whose whole directory tree is the artifact
const BUNDLE_FILE_TYPES: &[&str] = &[
    "wrapper.cfbundle",
    "wrapper.application",
    "wrapper.app-extension",
    "wrapper.framework",
    "wrapper.xcframework",
    "wrapper.plug-in",
    "folder.assetcatalog",
];

const RECURSIVE_SUFFIX: &str = "/**";

/// Summary of a generated project's inputs, targets and outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorManifest {
    pub manifest_version: u32,
    pub file_references: BTreeSet<String>,
    pub targets: BTreeSet<String>,
    pub artifacts: BTreeSet<String>,
}

impl GeneratorManifest {
    pub fn from_graph(project: &ProjectGraph) -> Self {
        let mut file_references = BTreeSet::new();
        let mut artifacts = BTreeSet::new();

        project.main_group.visit_files("", &mut |visit| {
            if visit.file.is_input_file {
                file_references.insert(visit.path);
                return;
            }

            let file_type = visit.file.file_type.as_deref();
            let versioned_parent = visit.version_group.as_ref().filter(|(group, _)| {
                file_type == Some(VERSIONED_MODEL_FILE_TYPE)
                    && group.version_group_type == VERSIONED_MODEL_FILE_TYPE
            });

            let artifact = match versioned_parent {
                Some((_, parent_path)) => format!("{}{}", parent_path, RECURSIVE_SUFFIX),
                None if file_type.map_or(false, |t| BUNDLE_FILE_TYPES.contains(&t)) => {
                    format!("{}{}", visit.path, RECURSIVE_SUFFIX)
                }
                None => visit.path,
            };
            artifacts.insert(artifact);
        });

        Self {
            manifest_version: MANIFEST_VERSION,
            file_references,
            targets: project.targets.iter().map(|t| t.name.clone()).collect(),
            artifacts,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self).context("Failed to encode manifest")?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Derives the manifest and writes it; write failures are only logged
pub struct ManifestPhase;

impl GenerationPhase for ManifestPhase {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn execute(
        &self,
        context: &PipelineContext,
        state: &mut GenerationState,
    ) -> Result<(), GeneratorError> {
        let manifest = GeneratorManifest::from_graph(&state.project()?.project);
        let path = state.support_dir().join(MANIFEST_FILE_NAME);

        let written = manifest
            .to_json()
            .and_then(|bytes| context.file_system.write_atomic(&path, &bytes));
        match written {
            Ok(()) => info!(
                path = %path.display(),
                files = manifest.file_references.len(),
                artifacts = manifest.artifacts.len(),
                "Wrote generator manifest"
            ),
            Err(e) => warn!(path = %path.display(), "Failed to write generator manifest: {:#}", e),
        }

        state.manifest = Some(manifest);
        Ok(())
    }
}
