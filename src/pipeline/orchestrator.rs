use super::context::{GenerationState, PipelineContext};
use super::phase_trait::GenerationPhase;
use super::phases::{
    artifact_dirs::ArtifactDirsPhase, build_project::BuildProjectPhase, expand::ExpandPhase,
    external::ExternalPhase, manifest::ManifestPhase, resolve::ResolvePhase,
    schemes::SchemesPhase, support_files::SupportFilesPhase, write_project::WriteProjectPhase,
};
use crate::config::GeneratorConfig;
use crate::error::GeneratorError;
use crate::label::BuildLabel;
use crate::pipeline::GeneratorManifest;
use crate::progress::ProgressEvent;
use crate::rule::RuleEntry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, info_span};

/// Outcome of a successful generation run
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Path of the generated `.xcodeproj` bundle
    pub project_path: PathBuf,

    /// Non-fatal problems, in the order they were found
    pub warnings: Vec<String>,

    pub manifest: Option<GeneratorManifest>,
}

pub struct PipelineOrchestrator {
    context: PipelineContext,
}

impl PipelineOrchestrator {
    pub fn new(context: PipelineContext) -> Self {
        Self { context }
    }

    fn phases() -> Vec<Box<dyn GenerationPhase>> {
        vec![
            Box::new(ResolvePhase),
            Box::new(ExpandPhase),
            Box::new(BuildProjectPhase),
            Box::new(ExternalPhase),
            Box::new(WriteProjectPhase),
            Box::new(SchemesPhase),
            Box::new(SupportFilesPhase),
            Box::new(ArtifactDirsPhase),
            Box::new(ManifestPhase),
        ]
    }

    /// Generates `<output_dir>/<project>.xcodeproj` for `config`
    ///
    /// Stops at the first fatal error; files written before it stay on disk.
    pub fn generate(
        &self,
        config: &GeneratorConfig,
        output_dir: &Path,
    ) -> Result<GenerationReport, GeneratorError> {
        let start = Instant::now();
        let progress = &self.context.config.progress;
        info!(
            "Starting project generation for: {}",
            config.project_name
        );
        progress.on_progress(&ProgressEvent::Started {
            project_name: config.project_name.clone(),
            targets: config.build_targets.len(),
        });

        let mut state = GenerationState::new(config.clone(), output_dir);
        for phase in Self::phases() {
            if let Err(error) = self.run_phase(phase.as_ref(), &mut state) {
                progress.on_progress(&ProgressEvent::Failed {
                    error: error.to_string(),
                });
                return Err(error);
            }
        }

        let report = GenerationReport {
            project_path: state.bundle_path.clone(),
            warnings: state.diagnostics.messages(),
            manifest: state.manifest.take(),
        };
        info!(
            "Generation complete: {} ({} warning(s))",
            report.project_path.display(),
            report.warnings.len()
        );
        progress.on_progress(&ProgressEvent::Completed {
            project_path: report.project_path.display().to_string(),
            warnings: report.warnings.len(),
            total_time: start.elapsed(),
        });
        Ok(report)
    }

    /// Runs only label resolution and returns the resolved rules
    pub fn resolve(
        &self,
        config: &GeneratorConfig,
    ) -> Result<BTreeMap<BuildLabel, RuleEntry>, GeneratorError> {
        let mut state = GenerationState::new(config.clone(), Path::new(""));
        self.run_phase(&ResolvePhase, &mut state)?;
        state.rules.take().ok_or(GeneratorError::MissingState("rules"))
    }

    fn run_phase(
        &self,
        phase: &dyn GenerationPhase,
        state: &mut GenerationState,
    ) -> Result<(), GeneratorError> {
        let progress = &self.context.config.progress;
        let name = phase.name();
        info!("Phase: {}", name);
        progress.on_progress(&ProgressEvent::PhaseStarted {
            phase: name.to_string(),
        });

        let span = info_span!("phase", name);
        let _guard = span.enter();
        let phase_start = Instant::now();
        let warnings_before = state.diagnostics.len();

        phase.execute(&self.context, state)?;

        for diagnostic in state.diagnostics.since(warnings_before) {
            progress.on_progress(&ProgressEvent::Warning {
                phase: diagnostic.phase.clone(),
                message: diagnostic.message.clone(),
            });
        }
        progress.on_progress(&ProgressEvent::PhaseComplete {
            phase: name.to_string(),
            duration: phase_start.elapsed(),
        });
        debug!("Phase {} complete", name);
        Ok(())
    }
}
