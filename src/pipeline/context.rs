//! Pipeline context and per-run state

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::GeneratorConfig;
use crate::error::GeneratorError;
use crate::fs::FileSystem;
use crate::label::BuildLabel;
use crate::project::{DefaultProjectBuilder, JsonProjectSerializer, ProjectGraph, ProjectObjectBuilder, ProjectSerializer};
use crate::query::{ExternalPathResolver, RuleLookup};
use crate::rule::RuleEntry;

use super::config::PipelineConfig;
use super::diagnostics::Diagnostics;
use super::phases::expand::Expansion;
use super::phases::manifest::GeneratorManifest;

/// Directory inside the bundle holding generator support files
pub const SUPPORT_DIR: &str = ".tulsi";

/// Context that owns all long-lived pipeline dependencies
#[derive(Clone)]
pub struct PipelineContext {
    /// Build tool rule query
    pub rule_lookup: Arc<dyn RuleLookup>,

    /// Locator for external repository checkouts
    pub path_resolver: Arc<dyn ExternalPathResolver>,

    pub builder: Arc<dyn ProjectObjectBuilder>,

    pub serializer: Arc<dyn ProjectSerializer>,

    /// File system abstraction
    pub file_system: Arc<dyn FileSystem>,

    /// Pipeline configuration
    pub config: PipelineConfig,
}

impl PipelineContext {
    /// Create a context using the default project builder and serializer
    pub fn new(
        rule_lookup: Arc<dyn RuleLookup>,
        path_resolver: Arc<dyn ExternalPathResolver>,
        file_system: Arc<dyn FileSystem>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            rule_lookup,
            path_resolver,
            builder: Arc::new(DefaultProjectBuilder::new()),
            serializer: Arc::new(JsonProjectSerializer),
            file_system,
            config,
        }
    }

    pub fn with_builder(mut self, builder: Arc<dyn ProjectObjectBuilder>) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn ProjectSerializer>) -> Self {
        self.serializer = serializer;
        self
    }
}

/// The materialized project and the rule entries it was built from
#[derive(Debug, Clone)]
pub struct GeneratedProjectInfo {
    pub project: ProjectGraph,

    /// Rules that became real targets
    pub build_targets: BTreeMap<BuildLabel, RuleEntry>,

    /// Test aggregates that get a suite scheme
    pub test_suites: BTreeMap<BuildLabel, RuleEntry>,

    /// Targets that only appear in suite schemes
    pub suite_members: BTreeSet<BuildLabel>,
}

/// State threaded through the phases of one generation run
#[derive(Debug)]
pub struct GenerationState {
    pub config: GeneratorConfig,
    pub bundle_path: PathBuf,
    pub requested: BTreeSet<BuildLabel>,
    pub rules: Option<BTreeMap<BuildLabel, RuleEntry>>,
    pub expansion: Option<Expansion>,
    pub project: Option<GeneratedProjectInfo>,
    pub manifest: Option<GeneratorManifest>,
    pub diagnostics: Diagnostics,
}

impl GenerationState {
    pub fn new(config: GeneratorConfig, output_dir: &Path) -> Self {
        let bundle_path = output_dir.join(config.bundle_name());
        let requested = config.build_targets.iter().cloned().collect();
        Self {
            config,
            bundle_path,
            requested,
            rules: None,
            expansion: None,
            project: None,
            manifest: None,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn support_dir(&self) -> PathBuf {
        self.bundle_path.join(SUPPORT_DIR)
    }

    pub fn rules(&self) -> Result<&BTreeMap<BuildLabel, RuleEntry>, GeneratorError> {
        self.rules.as_ref().ok_or(GeneratorError::MissingState("rules"))
    }

    pub fn expansion(&self) -> Result<&Expansion, GeneratorError> {
        self.expansion
            .as_ref()
            .ok_or(GeneratorError::MissingState("expansion"))
    }

    pub fn project(&self) -> Result<&GeneratedProjectInfo, GeneratorError> {
        self.project
            .as_ref()
            .ok_or(GeneratorError::MissingState("project"))
    }
}
