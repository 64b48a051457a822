//! End-to-end generation against a real temporary directory

mod support;

use std::collections::BTreeSet;
use std::os::unix::fs::PermissionsExt;
use support::{app_with_suite, label, read, Workspace, TEST_USER};
use tulsigen::rule::TargetType;
use tulsigen::{GeneratorManifest, RuleEntry};

fn testable_names(scheme_xml: &str) -> Vec<String> {
    let doc = roxmltree::Document::parse(scheme_xml).unwrap();
    doc.descendants()
        .filter(|n| n.has_tag_name("TestableReference"))
        .filter_map(|n| n.children().find(|c| c.has_tag_name("BuildableReference")))
        .filter_map(|n| n.attribute("BlueprintName").map(str::to_string))
        .collect()
}

#[test]
fn test_generates_complete_bundle() {
    let workspace = Workspace::new();
    let config = workspace.config("Demo", &["//app:Host", "//t:Suite"]);

    let report = workspace
        .orchestrator(app_with_suite())
        .generate(&config, &workspace.output())
        .unwrap();

    let bundle = workspace.bundle("Demo");
    assert_eq!(report.project_path, bundle);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    let project: serde_json::Value = serde_json::from_str(&read(bundle.join("project.pbxproj"))).unwrap();
    assert_eq!(project["name"], "Demo");
    assert!(bundle
        .join("project.xcworkspace/xcshareddata/WorkspaceSettings.xcsettings")
        .is_file());
    assert!(bundle
        .join(format!(
            "project.xcworkspace/xcuserdata/{}.xcuserdatad/WorkspaceSettings.xcsettings",
            TEST_USER
        ))
        .is_file());
}

#[test]
fn test_suite_sharing_a_host_gets_one_scheme() {
    let workspace = Workspace::new();
    let config = workspace.config("Demo", &["//app:Host", "//t:Suite"]);

    workspace
        .orchestrator(app_with_suite())
        .generate(&config, &workspace.output())
        .unwrap();

    let schemes = workspace.bundle("Demo").join("xcshareddata/xcschemes");
    assert!(schemes.join("Host.xcscheme").is_file());
    assert!(!schemes.join("ATests.xcscheme").exists());
    assert!(!schemes.join("BTests.xcscheme").exists());

    let suite = read(schemes.join("Suite_Suite.xcscheme"));
    assert_eq!(testable_names(&suite), vec!["ATests", "BTests"]);

    let doc = roxmltree::Document::parse(&suite).unwrap();
    let launch = doc
        .descendants()
        .find(|n| n.has_tag_name("LaunchAction"))
        .unwrap();
    let launched = launch
        .descendants()
        .find(|n| n.has_tag_name("BuildableReference"))
        .and_then(|n| n.attribute("BlueprintName"));
    assert_eq!(launched, Some("Host"));
}

#[test]
fn test_external_repository_is_redirected() {
    let workspace = Workspace::new();
    let config = workspace.config("Demo", &["//app:Host"]);

    workspace
        .orchestrator(app_with_suite())
        .generate(&config, &workspace.output())
        .unwrap();

    let project: serde_json::Value =
        serde_json::from_str(&read(workspace.bundle("Demo").join("project.pbxproj"))).unwrap();
    let children = project["mainGroup"]["children"].as_array().unwrap();
    let names: Vec<&str> = children.iter().filter_map(|c| c["name"].as_str()).collect();

    assert!(!names.contains(&"external"), "{:?}", names);
    let deps = children.iter().find(|c| c["name"] == "@deps").unwrap();
    let expected = workspace.output_base().join("external/deps");
    assert_eq!(deps["path"].as_str(), expected.to_str());
}

#[test]
fn test_same_name_in_two_repositories() {
    let workspace = Workspace::new();
    let config = workspace.config("Demo", &["//lib:Net", "@deps//lib:Net"]);
    let rules = vec![
        RuleEntry::new(label("//lib:Net"), "ios_application")
            .with_target_type(TargetType::Application)
            .with_sources(["lib/Net.m"]),
        RuleEntry::new(label("@deps//lib:Net"), "ios_application")
            .with_target_type(TargetType::Application)
            .with_sources(["external/deps/lib/Net.m"]),
    ];

    let report = workspace
        .orchestrator(rules)
        .generate(&config, &workspace.output())
        .unwrap();

    let manifest = report.manifest.unwrap();
    assert!(manifest.targets.contains("lib-Net"), "{:?}", manifest.targets);
    assert!(manifest.targets.contains("deps-lib-Net"), "{:?}", manifest.targets);
    let schemes = workspace.bundle("Demo").join("xcshareddata/xcschemes");
    assert!(schemes.join("lib-Net.xcscheme").is_file());
    assert!(schemes.join("deps-lib-Net.xcscheme").is_file());
}

#[test]
fn test_support_files_and_manifest() {
    let workspace = Workspace::new();
    let config = workspace.config("Demo", &["//app:Host", "//t:Suite"]);

    let report = workspace
        .orchestrator(app_with_suite())
        .generate(&config, &workspace.output())
        .unwrap();

    let support = workspace.bundle("Demo").join(".tulsi");
    let build_script = support.join("Scripts/bazel_build.sh");
    let mode = std::fs::metadata(&build_script).unwrap().permissions().mode();
    assert_ne!(mode & 0o111, 0);
    assert!(read(&build_script).contains("--config=ios"));
    assert!(support.join("Configs/Demo.tulsigen").is_file());
    assert!(support
        .join(format!("Configs/{}.tulsigen-user", TEST_USER))
        .is_file());
    assert!(support.join("Resources/Stub-Info.plist").is_file());

    let manifest: GeneratorManifest =
        serde_json::from_str(&read(support.join("generatorManifest.json"))).unwrap();
    assert_eq!(Some(&manifest), report.manifest.as_ref());
    let expected_targets: BTreeSet<String> = ["ATests", "BTests", "Host"]
        .iter()
        .map(|t| t.to_string())
        .collect();
    assert!(expected_targets.is_subset(&manifest.targets), "{:?}", manifest.targets);
    assert!(!manifest.targets.contains("Lib"), "{:?}", manifest.targets);
    assert!(manifest.targets.iter().any(|t| t.starts_with("_idx_Lib_")));
    assert!(manifest.file_references.contains("app/main.m"));
    assert!(manifest
        .artifacts
        .iter()
        .any(|a| a.ends_with("Model.pb.m")));

    assert!(workspace.root().join("bazel-genfiles/app").is_dir());
}

#[test]
fn test_regeneration_keeps_user_settings() {
    let workspace = Workspace::new();
    let config = workspace.config("Demo", &["//app:Host"]);
    let orchestrator = workspace.orchestrator(app_with_suite());
    orchestrator.generate(&config, &workspace.output()).unwrap();

    let user_settings = workspace.bundle("Demo").join(format!(
        "project.xcworkspace/xcuserdata/{}.xcuserdatad/WorkspaceSettings.xcsettings",
        TEST_USER
    ));
    std::fs::write(&user_settings, "customized").unwrap();

    orchestrator.generate(&config, &workspace.output()).unwrap();

    assert_eq!(read(&user_settings), "customized");
}

#[test]
fn test_output_is_deterministic() {
    let workspace = Workspace::new();
    let config = workspace.config("Demo", &["//t:Suite", "//app:Host"]);
    let orchestrator = workspace.orchestrator(app_with_suite());

    orchestrator.generate(&config, &workspace.output()).unwrap();
    let bundle = workspace.bundle("Demo");
    let first_project = read(bundle.join("project.pbxproj"));
    let first_suite = read(bundle.join("xcshareddata/xcschemes/Suite_Suite.xcscheme"));

    orchestrator.generate(&config, &workspace.output()).unwrap();

    assert_eq!(read(bundle.join("project.pbxproj")), first_project);
    assert_eq!(
        read(bundle.join("xcshareddata/xcschemes/Suite_Suite.xcscheme")),
        first_suite
    );
}
