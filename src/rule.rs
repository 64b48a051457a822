//! Resolved build units as reported by the build tool

use crate::label::BuildLabel;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Rule kind of a test aggregate (a `test_suite`)
pub const TEST_SUITE_KIND: &str = "test_suite";

/// Rule kind given to synthesized placeholder test hosts
pub const TEST_HOST_PLACEHOLDER_KIND: &str = "_test_host_";

/// Hint describing what kind of product a rule builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Application,
    AppExtension,
    WatchApp,
    UnitTest,
    UiTest,
    StaticLibrary,
    Framework,
}

impl TargetType {
    pub fn is_test(&self) -> bool {
        matches!(self, TargetType::UnitTest | TargetType::UiTest)
    }
}

/// A single input file of a rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    /// Path relative to the workspace root (or the generated-files root when generated)
    pub path: String,

    /// Produced by the build tool rather than checked into the workspace
    #[serde(default)]
    pub is_generated: bool,
}

impl SourceFile {
    pub fn source(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_generated: false,
        }
    }

    pub fn generated(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_generated: true,
        }
    }
}

/// A resolved build unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntry {
    pub label: BuildLabel,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub source_files: Vec<SourceFile>,

    #[serde(default)]
    pub non_arc_source_files: Vec<SourceFile>,

    #[serde(default)]
    pub dependencies: BTreeSet<BuildLabel>,

    /// Members of a test aggregate; traversed during expansion, never built
    #[serde(default)]
    pub weak_dependencies: BTreeSet<BuildLabel>,

    /// Applications or extensions that host this (test) rule
    #[serde(default)]
    pub linked_target_labels: BTreeSet<BuildLabel>,

    #[serde(default)]
    pub target_type: Option<TargetType>,
}

impl RuleEntry {
    pub fn new(label: BuildLabel, kind: impl Into<String>) -> Self {
        Self {
            label,
            kind: kind.into(),
            attributes: BTreeMap::new(),
            source_files: Vec::new(),
            non_arc_source_files: Vec::new(),
            dependencies: BTreeSet::new(),
            weak_dependencies: BTreeSet::new(),
            linked_target_labels: BTreeSet::new(),
            target_type: None,
        }
    }

    /// Minimal stand-in for a test host that was not part of the requested targets
    pub fn placeholder_host(label: BuildLabel) -> Self {
        let mut entry = Self::new(label, TEST_HOST_PLACEHOLDER_KIND);
        entry.target_type = Some(TargetType::Application);
        entry
    }

    pub fn is_test_suite(&self) -> bool {
        self.kind == TEST_SUITE_KIND
    }

    pub fn is_placeholder_host(&self) -> bool {
        self.kind == TEST_HOST_PLACEHOLDER_KIND
    }

    /// All sources, ARC and non-ARC, in declaration order
    pub fn all_source_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.source_files.iter().chain(self.non_arc_source_files.iter())
    }

    pub fn with_sources<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_files
            .extend(paths.into_iter().map(SourceFile::source));
        self
    }

    pub fn with_target_type(mut self, target_type: TargetType) -> Self {
        self.target_type = Some(target_type);
        self
    }

    pub fn with_dependencies(mut self, labels: impl IntoIterator<Item = BuildLabel>) -> Self {
        self.dependencies.extend(labels);
        self
    }

    pub fn with_weak_dependencies(mut self, labels: impl IntoIterator<Item = BuildLabel>) -> Self {
        self.weak_dependencies.extend(labels);
        self
    }

    pub fn with_linked_targets(mut self, labels: impl IntoIterator<Item = BuildLabel>) -> Self {
        self.linked_target_labels.extend(labels);
        self
    }
}
