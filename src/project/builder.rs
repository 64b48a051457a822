//! Construction of the project object graph from rule entries

use super::graph::{
    file_id, version_group_id, BuildConfiguration, BuildPhase, FileReference, Group, ProductType,
    ProjectGraph, Target,
};
use crate::config::GeneratorConfig;
use crate::rule::{RuleEntry, SourceFile, TargetType};
use anyhow::{bail, Result};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Root under which build-tool outputs are referenced in the project
pub const GENERATED_FILES_ROOT: &str = "bazel-genfiles";

/// Name of the target that runs the build tool's clean command
pub const CLEAN_TARGET_NAME: &str = "_bazel_clean_";

const BUILD_SCRIPT: &str = "${PROJECT_FILE_PATH}/.tulsi/Scripts/bazel_build.sh";
const CLEAN_SCRIPT: &str = "${PROJECT_FILE_PATH}/.tulsi/Scripts/bazel_clean.sh";
const TEST_RUNNER_CONFIG_PREFIX: &str = "__TulsiTestRunner_";

/// Versioned model containers and their member type
const VERSIONED_MODEL_EXTENSION: &str = "xcdatamodeld";
pub const VERSIONED_MODEL_FILE_TYPE: &str = "wrapper.xcdatamodel";

/// Directory extensions that the IDE treats as a single opaque file
const BUNDLE_EXTENSIONS: &[&str] = &[
    "app",
    "appex",
    "bundle",
    "framework",
    "xcassets",
    "xcframework",
    "xcdatamodel",
];

/// Builds the low-level object graph for a set of rule entries
///
/// The pipeline drives the builder step by step; implementations only
/// translate rule entries into graph objects and never decide which rules
/// take part in the project.
pub trait ProjectObjectBuilder: Send + Sync {
    fn new_project(&self, config: &GeneratorConfig) -> ProjectGraph;

    fn add_source_files(
        &self,
        project: &mut ProjectGraph,
        entries: &[&RuleEntry],
        additional_files: &[String],
    );

    fn add_indexer_targets(&self, project: &mut ProjectGraph, entries: &[&RuleEntry]);

    fn add_build_targets(&self, project: &mut ProjectGraph, entries: &[&RuleEntry]) -> Result<()>;

    fn add_clean_target(&self, project: &mut ProjectGraph);

    fn add_build_configurations(&self, project: &mut ProjectGraph, names: &[String]);

    /// Prefix of the build configurations used by test actions
    fn test_configuration_prefix(&self) -> &str;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultProjectBuilder;

impl DefaultProjectBuilder {
    pub fn new() -> Self {
        Self
    }

    fn add_file(main_group: &mut Group, file: &SourceFile) {
        let full_path = if file.is_generated {
            format!("{}/{}", GENERATED_FILES_ROOT, file.path)
        } else {
            file.path.clone()
        };
        add_path(main_group, &full_path, !file.is_generated);
    }
}

impl ProjectObjectBuilder for DefaultProjectBuilder {
    fn new_project(&self, config: &GeneratorConfig) -> ProjectGraph {
        ProjectGraph::new(config.project_name.clone())
    }

    fn add_source_files(
        &self,
        project: &mut ProjectGraph,
        entries: &[&RuleEntry],
        additional_files: &[String],
    ) {
        for entry in entries {
            for file in entry.all_source_files() {
                Self::add_file(&mut project.main_group, file);
            }
        }
        for path in additional_files {
            add_path(&mut project.main_group, path, true);
        }
    }

    fn add_indexer_targets(&self, project: &mut ProjectGraph, entries: &[&RuleEntry]) {
        for entry in entries {
            let sources: Vec<String> = entry
                .all_source_files()
                .filter(|file| !file.is_generated)
                .map(|file| file.path.clone())
                .collect();
            if sources.is_empty() {
                continue;
            }

            let name = format!(
                "_idx_{}_{}",
                entry.label.target_name(),
                short_hash(entry.label.as_str())
            );
            let mut target = Target::native(name.clone(), ProductType::StaticLibrary, None);
            target
                .build_settings
                .insert("PRODUCT_NAME".to_string(), name);
            target.build_phases.push(BuildPhase::Sources { files: sources });
            project.targets.push(target);
        }
    }

    fn add_build_targets(&self, project: &mut ProjectGraph, entries: &[&RuleEntry]) -> Result<()> {
        let mut short_name_counts: HashMap<&str, usize> = HashMap::new();
        for entry in entries {
            *short_name_counts
                .entry(entry.label.target_name())
                .or_default() += 1;
        }

        let mut names_by_label = BTreeMap::new();
        for entry in entries {
            let short = entry.label.target_name();
            let name = if short_name_counts.get(short).copied().unwrap_or(0) > 1 {
                entry.label.full_target_name()
            } else {
                short.to_string()
            };
            if project.target_named(&name).is_some() {
                bail!("Duplicate target name '{}' for {}", name, entry.label);
            }

            let product_type = product_type_for(entry);
            let mut target = Target::native(name.clone(), product_type, Some(entry.label.clone()));
            target
                .build_settings
                .insert("BAZEL_TARGET".to_string(), entry.label.to_string());
            target
                .build_settings
                .insert("PRODUCT_NAME".to_string(), name.clone());
            target.build_phases.push(BuildPhase::ShellScript {
                name: "Build with Bazel".to_string(),
                script: format!("\"{}\" {}", BUILD_SCRIPT, entry.label),
            });
            project.targets.push(target);
            names_by_label.insert(entry.label.clone(), name);
        }

        for entry in entries {
            if !product_type_for(entry).is_test() {
                continue;
            }
            let Some(test_name) = names_by_label.get(&entry.label) else {
                continue;
            };
            let host_name = entry
                .linked_target_labels
                .iter()
                .find_map(|host| names_by_label.get(host));
            match host_name {
                Some(host_name) => {
                    let host_name = host_name.clone();
                    if let Some(test_target) =
                        project.targets.iter_mut().find(|t| &t.name == test_name)
                    {
                        test_target.build_settings.insert(
                            "TEST_HOST".to_string(),
                            format!("$(BUILT_PRODUCTS_DIR)/{}.app/{}", host_name, host_name),
                        );
                    }
                    project.link_test_host(test_name, &host_name);
                }
                None => debug!(test = %entry.label, "No host target generated for test"),
            }
        }

        Ok(())
    }

    fn add_clean_target(&self, project: &mut ProjectGraph) {
        if project.target_named(CLEAN_TARGET_NAME).is_some() {
            return;
        }
        project
            .targets
            .push(Target::legacy(CLEAN_TARGET_NAME, "/bin/bash", format!("-c \"{}\"", CLEAN_SCRIPT)));
    }

    fn add_build_configurations(&self, project: &mut ProjectGraph, names: &[String]) {
        let mut configurations = Vec::new();
        for name in names {
            let mut settings = BTreeMap::new();
            settings.insert("ALWAYS_SEARCH_USER_PATHS".to_string(), "NO".to_string());
            settings.insert("ONLY_ACTIVE_ARCH".to_string(), "YES".to_string());
            settings.insert("TULSI_BUILD_CONFIGURATION".to_string(), name.clone());
            configurations.push(BuildConfiguration {
                name: name.clone(),
                build_settings: settings.clone(),
            });

            settings.insert("TULSI_TEST_RUNNER_ONLY".to_string(), "YES".to_string());
            configurations.push(BuildConfiguration {
                name: format!("{}{}", TEST_RUNNER_CONFIG_PREFIX, name),
                build_settings: settings,
            });
        }
        project.build_configurations = configurations;
    }

    fn test_configuration_prefix(&self) -> &str {
        TEST_RUNNER_CONFIG_PREFIX
    }
}

fn short_hash(value: &str) -> String {
    hex::encode(&Sha256::digest(value.as_bytes())[..4])
}

fn product_type_for(entry: &RuleEntry) -> ProductType {
    if let Some(hint) = entry.target_type {
        return match hint {
            TargetType::Application => ProductType::Application,
            TargetType::AppExtension => ProductType::AppExtension,
            TargetType::WatchApp => ProductType::WatchApp,
            TargetType::UnitTest => ProductType::UnitTest,
            TargetType::UiTest => ProductType::UiTest,
            TargetType::StaticLibrary => ProductType::StaticLibrary,
            TargetType::Framework => ProductType::Framework,
        };
    }

    let kind = entry.kind.as_str();
    if kind.contains("ui_test") {
        ProductType::UiTest
    } else if kind.contains("test") {
        ProductType::UnitTest
    } else if kind.contains("extension") {
        ProductType::AppExtension
    } else if kind.contains("application") {
        ProductType::Application
    } else if kind.contains("framework") {
        ProductType::Framework
    } else {
        ProductType::StaticLibrary
    }
}

/// Guesses the IDE file type from a file or directory name
pub fn file_type_for(name: &str) -> Option<&'static str> {
    let extension = name.rsplit_once('.').map(|(_, ext)| ext)?;
    let file_type = match extension {
        "m" => "sourcecode.c.objc",
        "mm" => "sourcecode.cpp.objcpp",
        "c" => "sourcecode.c.c",
        "cc" | "cpp" | "cxx" => "sourcecode.cpp.cpp",
        "h" | "hpp" => "sourcecode.c.h",
        "swift" => "sourcecode.swift",
        "plist" => "text.plist.xml",
        "json" => "text.json",
        "strings" => "text.plist.strings",
        "storyboard" => "file.storyboard",
        "xib" => "file.xib",
        "png" => "image.png",
        "app" => "wrapper.application",
        "appex" => "wrapper.app-extension",
        "bundle" => "wrapper.cfbundle",
        "framework" => "wrapper.framework",
        "xcframework" => "wrapper.xcframework",
        "xcassets" => "folder.assetcatalog",
        "xcdatamodel" => VERSIONED_MODEL_FILE_TYPE,
        _ => return None,
    };
    Some(file_type)
}

fn has_extension(component: &str, extension: &str) -> bool {
    component
        .rsplit_once('.')
        .map_or(false, |(_, ext)| ext == extension)
}

/// Inserts `path` below `group`, creating directory groups along the way
///
/// Bundle directories end the walk and become a single file reference;
/// versioned model containers become version groups holding their model.
/// Identifiers are seeded from the path below `group`, so equally named files
/// in different directories stay distinct.
fn add_path(group: &mut Group, path: &str, is_input_file: bool) {
    let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
    let mut current = group;

    for (index, component) in components.iter().enumerate() {
        let is_last = index + 1 == components.len();
        let prefix = components[..=index].join("/");

        if has_extension(component, VERSIONED_MODEL_EXTENSION) {
            let version_group =
                current.version_group_mut(component, VERSIONED_MODEL_FILE_TYPE, is_input_file);
            version_group.id = version_group_id(&prefix);
            if let Some(model) = components.get(index + 1) {
                let exists = version_group.children.iter().any(|c| c.path == *model);
                if !exists {
                    let mut file = FileReference::new(
                        *model,
                        file_type_for(model).map(str::to_string),
                        is_input_file,
                    );
                    file.id = file_id(&format!("{}/{}", prefix, model));
                    version_group.children.push(file);
                }
            }
            return;
        }

        let is_bundle = BUNDLE_EXTENSIONS
            .iter()
            .any(|extension| has_extension(component, extension));
        if is_last || is_bundle {
            let mut file = FileReference::new(
                *component,
                file_type_for(component).map(str::to_string),
                is_input_file,
            );
            file.id = file_id(&prefix);
            current.add_file(file);
            return;
        }

        current = current.get_or_create_group(component);
    }
}
