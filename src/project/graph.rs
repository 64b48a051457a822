//! In-memory object graph of a generated project
//!
//! The graph mirrors the structure the IDE expects: a tree of groups and file
//! references rooted at the main group, a flat list of targets and the
//! project-level build configurations. It is owned by one generation run and
//! only handed to the serializer at the end.

use crate::label::BuildLabel;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Derives a stable 96-bit object identifier from a seed string
pub fn global_id(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    hex::encode_upper(&digest[..12])
}

/// Identifier of the file reference at `path` below the main group
pub fn file_id(path: &str) -> String {
    global_id(&format!("file:{}", path))
}

/// Identifier of the version group at `path` below the main group
pub fn version_group_id(path: &str) -> String {
    global_id(&format!("version-group:{}", path))
}

/// How a reference's `path` is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceTree {
    /// Relative to the enclosing group
    Group,
    /// Absolute filesystem path
    Absolute,
    /// Relative to the workspace root
    SourceRoot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    pub id: String,
    pub path: String,
    pub source_tree: SourceTree,
    pub file_type: Option<String>,
    /// Checked-in source as opposed to a build-tool output
    pub is_input_file: bool,
}

impl FileReference {
    pub fn new(path: impl Into<String>, file_type: Option<String>, is_input_file: bool) -> Self {
        let path = path.into();
        Self {
            id: file_id(&path),
            path,
            source_tree: SourceTree::Group,
            file_type,
            is_input_file,
        }
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Container of versioned model files (e.g. an `.xcdatamodeld`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionGroup {
    pub id: String,
    pub path: String,
    pub source_tree: SourceTree,
    pub version_group_type: String,
    pub is_input_file: bool,
    pub children: Vec<FileReference>,
}

impl VersionGroup {
    pub fn new(path: impl Into<String>, version_group_type: impl Into<String>, is_input_file: bool) -> Self {
        let path = path.into();
        Self {
            id: version_group_id(&path),
            path,
            source_tree: SourceTree::Group,
            version_group_type: version_group_type.into(),
            is_input_file,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "isa", rename_all = "camelCase")]
pub enum Reference {
    Group(Group),
    VersionGroup(VersionGroup),
    File(FileReference),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub name: String,
    pub path: Option<String>,
    pub source_tree: SourceTree,
    /// Show `name` in the navigator instead of a path-derived title
    pub uses_name_for_display: bool,
    pub children: Vec<Reference>,
}

impl Group {
    /// Group named after the directory it maps to
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: Some(name.clone()),
            name,
            source_tree: SourceTree::Group,
            uses_name_for_display: false,
            children: Vec::new(),
        }
    }

    pub fn main() -> Self {
        Self {
            name: "mainGroup".to_string(),
            path: None,
            source_tree: SourceTree::SourceRoot,
            uses_name_for_display: false,
            children: Vec::new(),
        }
    }

    pub fn child_group(&self, name: &str) -> Option<&Group> {
        self.children.iter().find_map(|child| match child {
            Reference::Group(group) if group.name == name => Some(group),
            _ => None,
        })
    }

    /// Returns the named child group, creating a plain directory group if absent
    pub fn get_or_create_group(&mut self, name: &str) -> &mut Group {
        let index = match self.group_index(name) {
            Some(index) => index,
            None => {
                self.children.push(Reference::Group(Group::new(name)));
                self.children.len() - 1
            }
        };
        match &mut self.children[index] {
            Reference::Group(group) => group,
            _ => unreachable!("group_index only matches groups"),
        }
    }

    pub fn add_group(&mut self, group: Group) {
        self.children.push(Reference::Group(group));
    }

    /// Adds a file reference unless one with the same path already exists
    pub fn add_file(&mut self, file: FileReference) -> bool {
        let exists = self.children.iter().any(|child| match child {
            Reference::File(existing) => existing.path == file.path,
            _ => false,
        });
        if !exists {
            self.children.push(Reference::File(file));
        }
        !exists
    }

    pub fn version_group_mut(&mut self, path: &str, version_group_type: &str, is_input_file: bool) -> &mut VersionGroup {
        let position = self.children.iter().position(|child| {
            matches!(child, Reference::VersionGroup(vg) if vg.path == path)
        });
        let index = match position {
            Some(index) => index,
            None => {
                self.children.push(Reference::VersionGroup(VersionGroup::new(
                    path,
                    version_group_type,
                    is_input_file,
                )));
                self.children.len() - 1
            }
        };
        match &mut self.children[index] {
            Reference::VersionGroup(vg) => vg,
            _ => unreachable!("position only matches version groups"),
        }
    }

    fn group_index(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|child| matches!(child, Reference::Group(group) if group.name == name))
    }

    /// Visits every file reference below this group with its effective path
    ///
    /// `parent_path` is the effective path of this group's parent. Files that
    /// live inside a version group receive that group and its path as context.
    pub fn visit_files<'a, F>(&'a self, parent_path: &str, visitor: &mut F)
    where
        F: FnMut(FileVisit<'a>),
    {
        let own_path = effective_path(parent_path, self.path.as_deref(), self.source_tree);
        for child in &self.children {
            match child {
                Reference::Group(group) => group.visit_files(&own_path, visitor),
                Reference::VersionGroup(version_group) => {
                    let vg_path = effective_path(&own_path, Some(&version_group.path), version_group.source_tree);
                    for file in &version_group.children {
                        visitor(FileVisit {
                            path: effective_path(&vg_path, Some(&file.path), file.source_tree),
                            file,
                            version_group: Some((version_group, vg_path.clone())),
                        });
                    }
                }
                Reference::File(file) => visitor(FileVisit {
                    path: effective_path(&own_path, Some(&file.path), file.source_tree),
                    file,
                    version_group: None,
                }),
            }
        }
    }
}

/// A file reference reached while walking the group tree
#[derive(Debug)]
pub struct FileVisit<'a> {
    pub path: String,
    pub file: &'a FileReference,
    pub version_group: Option<(&'a VersionGroup, String)>,
}

fn effective_path(parent: &str, path: Option<&str>, source_tree: SourceTree) -> String {
    match (path, source_tree) {
        (None, SourceTree::Group) => parent.to_string(),
        (None, _) => String::new(),
        (Some(path), SourceTree::Group) if parent.is_empty() => path.to_string(),
        (Some(path), SourceTree::Group) => format!("{}/{}", parent, path),
        (Some(path), _) => path.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductType {
    Application,
    AppExtension,
    WatchApp,
    UnitTest,
    UiTest,
    StaticLibrary,
    Framework,
}

impl ProductType {
    pub fn identifier(&self) -> &'static str {
        match self {
            ProductType::Application => "com.apple.product-type.application",
            ProductType::AppExtension => "com.apple.product-type.app-extension",
            ProductType::WatchApp => "com.apple.product-type.application.watchapp2",
            ProductType::UnitTest => "com.apple.product-type.bundle.unit-test",
            ProductType::UiTest => "com.apple.product-type.bundle.ui-testing",
            ProductType::StaticLibrary => "com.apple.product-type.library.static",
            ProductType::Framework => "com.apple.product-type.framework",
        }
    }

    pub fn product_name(&self, target_name: &str) -> String {
        match self {
            ProductType::Application | ProductType::WatchApp => format!("{}.app", target_name),
            ProductType::AppExtension => format!("{}.appex", target_name),
            ProductType::UnitTest | ProductType::UiTest => format!("{}.xctest", target_name),
            ProductType::StaticLibrary => format!("lib{}.a", target_name),
            ProductType::Framework => format!("{}.framework", target_name),
        }
    }

    pub fn is_test(&self) -> bool {
        matches!(self, ProductType::UnitTest | ProductType::UiTest)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TargetKind {
    Native { product_type: ProductType },
    Legacy { build_tool_path: String, arguments: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum BuildPhase {
    Sources { files: Vec<String> },
    ShellScript { name: String, script: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: String,
    pub name: String,
    pub kind: TargetKind,
    pub label: Option<BuildLabel>,
    pub build_phases: Vec<BuildPhase>,
    pub build_settings: BTreeMap<String, String>,
}

impl Target {
    pub fn native(name: impl Into<String>, product_type: ProductType, label: Option<BuildLabel>) -> Self {
        let name = name.into();
        Self {
            id: global_id(&format!("target:{}", name)),
            name,
            kind: TargetKind::Native { product_type },
            label,
            build_phases: Vec::new(),
            build_settings: BTreeMap::new(),
        }
    }

    pub fn legacy(name: impl Into<String>, build_tool_path: impl Into<String>, arguments: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: global_id(&format!("target:{}", name)),
            name,
            kind: TargetKind::Legacy {
                build_tool_path: build_tool_path.into(),
                arguments: arguments.into(),
            },
            label: None,
            build_phases: Vec::new(),
            build_settings: BTreeMap::new(),
        }
    }

    pub fn product_type(&self) -> Option<ProductType> {
        match self.kind {
            TargetKind::Native { product_type } => Some(product_type),
            TargetKind::Legacy { .. } => None,
        }
    }

    /// File name of the product, used for scheme buildable references
    pub fn product_name(&self) -> String {
        match self.product_type() {
            Some(product_type) => product_type.product_name(&self.name),
            None => self.name.clone(),
        }
    }

    fn answers_for(&self, label: &BuildLabel) -> bool {
        self.label.as_ref() == Some(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfiguration {
    pub name: String,
    pub build_settings: BTreeMap<String, String>,
}

/// Outcome of looking up the target generated for a label
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetLookup<'a> {
    /// Found under the label's short name
    Short(&'a Target),
    /// Found under the repository and package qualified name
    Qualified(&'a Target),
    NotFound,
}

impl<'a> TargetLookup<'a> {
    pub fn target(self) -> Option<&'a Target> {
        match self {
            TargetLookup::Short(target) | TargetLookup::Qualified(target) => Some(target),
            TargetLookup::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGraph {
    pub name: String,
    pub main_group: Group,
    pub targets: Vec<Target>,
    pub build_configurations: Vec<BuildConfiguration>,
    /// Test target name to host application target name
    pub test_host_links: BTreeMap<String, String>,
}

impl ProjectGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            main_group: Group::main(),
            targets: Vec::new(),
            build_configurations: Vec::new(),
            test_host_links: BTreeMap::new(),
        }
    }

    pub fn target_named(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|target| target.name == name)
    }

    /// Finds the target for `label`, trying the short name before the qualified one
    ///
    /// A short-name hit that belongs to a different label counts as ambiguous
    /// and falls through to the qualified name.
    pub fn resolve_target(&self, label: &BuildLabel) -> TargetLookup<'_> {
        if let Some(target) = self.target_named(label.target_name()) {
            if target.answers_for(label) {
                return TargetLookup::Short(target);
            }
        }
        match self.target_named(&label.full_target_name()) {
            Some(target) if target.answers_for(label) => TargetLookup::Qualified(target),
            _ => TargetLookup::NotFound,
        }
    }

    pub fn link_test_host(&mut self, test_target: &str, host_target: &str) {
        self.test_host_links
            .insert(test_target.to_string(), host_target.to_string());
    }

    pub fn host_for_test(&self, test_target: &Target) -> Option<&Target> {
        self.test_host_links
            .get(&test_target.name)
            .and_then(|host| self.target_named(host))
    }
}
