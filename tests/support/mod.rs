//! Shared fixtures for integration tests

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tulsigen::fs::{FileSystem, RealFileSystem};
use tulsigen::query::{JsonRuleLookup, OutputBaseResolver};
use tulsigen::rule::{SourceFile, TargetType, TEST_SUITE_KIND};
use tulsigen::{
    BuildLabel, GeneratorConfig, GeneratorSettings, PipelineConfig, PipelineContext,
    PipelineOrchestrator, RuleEntry,
};

pub const TEST_USER: &str = "tester";

pub fn label(value: &str) -> BuildLabel {
    BuildLabel::parse(value).unwrap()
}

/// Temporary workspace with an output directory and a build tool output base
pub struct Workspace {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl Workspace {
    pub fn new() -> Self {
        let workspace = Self {
            dir: TempDir::new().unwrap(),
        };
        std::fs::create_dir_all(workspace.output_base().join("external/deps")).unwrap();
        workspace
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("workspace")
    }

    pub fn output(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    pub fn output_base(&self) -> PathBuf {
        self.dir.path().join("output_base")
    }

    pub fn bundle(&self, project_name: &str) -> PathBuf {
        self.output().join(format!("{}.xcodeproj", project_name))
    }

    pub fn config(&self, project_name: &str, targets: &[&str]) -> GeneratorConfig {
        let mut config =
            GeneratorConfig::new(project_name, targets.iter().map(|t| label(t)).collect());
        config.build_options = vec!["--config=ios".to_string()];
        config.workspace_root = self.root();
        config
    }

    pub fn context(&self, rules: Vec<RuleEntry>) -> PipelineContext {
        self.context_with(rules, Arc::new(RealFileSystem::new()))
    }

    pub fn context_with(
        &self,
        rules: Vec<RuleEntry>,
        file_system: Arc<dyn FileSystem>,
    ) -> PipelineContext {
        let settings = GeneratorSettings {
            user: TEST_USER.to_string(),
            log_level: "info".to_string(),
            output_base: Some(self.output_base()),
        };
        PipelineContext::new(
            Arc::new(JsonRuleLookup::new(rules)),
            Arc::new(OutputBaseResolver::new(
                settings.output_base.clone(),
                file_system.clone(),
            )),
            file_system,
            PipelineConfig::new().with_settings(settings),
        )
    }

    pub fn orchestrator(&self, rules: Vec<RuleEntry>) -> PipelineOrchestrator {
        PipelineOrchestrator::new(self.context(rules))
    }
}

/// An app with a generated source and an external dependency, plus a test
/// suite whose two members share the app as host
#[allow(dead_code)]
pub fn app_with_suite() -> Vec<RuleEntry> {
    let mut host = RuleEntry::new(label("//app:Host"), "ios_application")
        .with_target_type(TargetType::Application)
        .with_sources(["app/main.m", "app/AppDelegate.m"])
        .with_dependencies([label("//lib:Lib")]);
    host.source_files.push(SourceFile::generated("app/Model.pb.m"));

    vec![
        host,
        RuleEntry::new(label("//lib:Lib"), "objc_library")
            .with_target_type(TargetType::StaticLibrary)
            .with_sources(["external/deps/Dep.m"]),
        RuleEntry::new(label("//t:Suite"), TEST_SUITE_KIND)
            .with_weak_dependencies([label("//t:ATests"), label("//t:BTests")]),
        RuleEntry::new(label("//t:ATests"), "ios_unit_test")
            .with_target_type(TargetType::UnitTest)
            .with_sources(["t/ATests.m"])
            .with_linked_targets([label("//app:Host")]),
        RuleEntry::new(label("//t:BTests"), "ios_unit_test")
            .with_target_type(TargetType::UnitTest)
            .with_sources(["t/BTests.m"])
            .with_linked_targets([label("//app:Host")]),
    ]
}

#[allow(dead_code)]
pub fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path.as_ref())
        .unwrap_or_else(|e| panic!("Failed to read {:?}: {}", path.as_ref(), e))
}
