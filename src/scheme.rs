//! Launch and test schemes
//!
//! An [`XcodeScheme`] describes how the IDE builds, runs and tests one
//! target. Schemes are rendered to the IDE's XML scheme format and written
//! to `xcshareddata/xcschemes` inside the project bundle.

use crate::project::graph::{ProductType, Target};
use crate::xml::escape;
use std::fmt::Write;

const DEBUGGER_IDENTIFIER: &str = "Xcode.DebuggerFoundation.Debugger.LLDB";
const LAUNCHER_IDENTIFIER: &str = "Xcode.DebuggerFoundation.Launcher.LLDB";
const LAUNCH_CONFIGURATION: &str = "Debug";
const RELEASE_CONFIGURATION: &str = "Release";

/// File extension of scheme files
pub const SCHEME_EXTENSION: &str = "xcscheme";

/// How the run action starts the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchStyle {
    #[default]
    Normal,
    /// Ask for a host app and attach to the extension it launches
    AppExtension,
}

/// The subset of a target a scheme refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeTarget {
    pub id: String,
    pub name: String,
    pub product_name: String,
    pub product_type: Option<ProductType>,
}

impl From<&Target> for SchemeTarget {
    fn from(target: &Target) -> Self {
        Self {
            id: target.id.clone(),
            name: target.name.clone(),
            product_name: target.product_name(),
            product_type: target.product_type(),
        }
    }
}

impl SchemeTarget {
    fn is_runnable(&self) -> bool {
        matches!(
            self.product_type,
            Some(ProductType::Application) | Some(ProductType::AppExtension) | Some(ProductType::WatchApp)
        )
    }

    fn is_test(&self) -> bool {
        self.product_type.map_or(false, |p| p.is_test())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XcodeScheme {
    pub target: SchemeTarget,
    pub project_bundle_name: String,
    pub test_configuration: String,
    pub launch_style: LaunchStyle,
    pub app_extension: bool,
    /// Tests run by the test action in place of the target itself
    pub explicit_tests: Vec<SchemeTarget>,
}

impl XcodeScheme {
    pub fn new(
        target: &Target,
        project_bundle_name: impl Into<String>,
        test_configuration: impl Into<String>,
    ) -> Self {
        Self {
            target: SchemeTarget::from(target),
            project_bundle_name: project_bundle_name.into(),
            test_configuration: test_configuration.into(),
            launch_style: LaunchStyle::Normal,
            app_extension: false,
            explicit_tests: Vec::new(),
        }
    }

    pub fn with_launch_style(mut self, launch_style: LaunchStyle) -> Self {
        self.launch_style = launch_style;
        self.app_extension = launch_style == LaunchStyle::AppExtension;
        self
    }

    pub fn with_explicit_tests<'a>(mut self, tests: impl IntoIterator<Item = &'a Target>) -> Self {
        self.explicit_tests = tests.into_iter().map(SchemeTarget::from).collect();
        self
    }

    fn testables(&self) -> Vec<&SchemeTarget> {
        if !self.explicit_tests.is_empty() {
            self.explicit_tests.iter().collect()
        } else if self.target.is_test() {
            vec![&self.target]
        } else {
            Vec::new()
        }
    }

    /// Renders the scheme as IDE scheme XML
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        let target_ref = self.buildable_reference(&self.target, 12);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<Scheme\n   LastUpgradeVersion = \"1000\"\n   version = \"1.3\">\n");

        xml.push_str("   <BuildAction\n      parallelizeBuildables = \"YES\"\n      buildImplicitDependencies = \"YES\">\n");
        xml.push_str("      <BuildActionEntries>\n");
        xml.push_str("         <BuildActionEntry\n            buildForTesting = \"YES\"\n            buildForRunning = \"YES\"\n            buildForProfiling = \"YES\"\n            buildForArchiving = \"YES\"\n            buildForAnalyzing = \"YES\">\n");
        xml.push_str(&target_ref);
        xml.push_str("         </BuildActionEntry>\n");
        xml.push_str("      </BuildActionEntries>\n");
        xml.push_str("   </BuildAction>\n");

        let _ = writeln!(
            xml,
            "   <TestAction\n      buildConfiguration = \"{}\"\n      selectedDebuggerIdentifier = \"{}\"\n      selectedLauncherIdentifier = \"{}\"\n      shouldUseLaunchSchemeArgsEnv = \"YES\">",
            escape(&self.test_configuration),
            DEBUGGER_IDENTIFIER,
            LAUNCHER_IDENTIFIER
        );
        xml.push_str("      <Testables>\n");
        for testable in self.testables() {
            xml.push_str("         <TestableReference\n            skipped = \"NO\">\n");
            xml.push_str(&self.buildable_reference(testable, 12));
            xml.push_str("         </TestableReference>\n");
        }
        xml.push_str("      </Testables>\n");
        xml.push_str("   </TestAction>\n");

        let (debugger, substyle) = match self.launch_style {
            LaunchStyle::Normal => (DEBUGGER_IDENTIFIER, ""),
            LaunchStyle::AppExtension => ("", "\n      launchAutomaticallySubstyle = \"2\""),
        };
        let ask_for_app = if self.app_extension {
            "\n      askForAppToLaunch = \"Yes\""
        } else {
            ""
        };
        let _ = writeln!(
            xml,
            "   <LaunchAction\n      buildConfiguration = \"{}\"\n      selectedDebuggerIdentifier = \"{}\"\n      selectedLauncherIdentifier = \"{}\"\n      launchStyle = \"0\"{}{}\n      useCustomWorkingDirectory = \"NO\"\n      debugDocumentVersioning = \"YES\"\n      allowLocationSimulation = \"YES\">",
            LAUNCH_CONFIGURATION, debugger, LAUNCHER_IDENTIFIER, ask_for_app, substyle
        );
        if self.target.is_runnable() {
            xml.push_str("      <BuildableProductRunnable\n         runnableDebuggingMode = \"0\">\n");
            xml.push_str(&target_ref);
            xml.push_str("      </BuildableProductRunnable>\n");
        } else {
            xml.push_str("      <MacroExpansion>\n");
            xml.push_str(&target_ref);
            xml.push_str("      </MacroExpansion>\n");
        }
        xml.push_str("   </LaunchAction>\n");

        let _ = writeln!(
            xml,
            "   <ProfileAction\n      buildConfiguration = \"{}\"\n      shouldUseLaunchSchemeArgsEnv = \"YES\"\n      debugDocumentVersioning = \"YES\">\n   </ProfileAction>",
            RELEASE_CONFIGURATION
        );
        let _ = writeln!(
            xml,
            "   <AnalyzeAction\n      buildConfiguration = \"{}\">\n   </AnalyzeAction>",
            LAUNCH_CONFIGURATION
        );
        let _ = writeln!(
            xml,
            "   <ArchiveAction\n      buildConfiguration = \"{}\"\n      revealArchiveInOrganizer = \"YES\">\n   </ArchiveAction>",
            RELEASE_CONFIGURATION
        );
        xml.push_str("</Scheme>\n");
        xml
    }

    fn buildable_reference(&self, target: &SchemeTarget, indent: usize) -> String {
        let pad = " ".repeat(indent);
        format!(
            "{pad}<BuildableReference\n{pad}   BuildableIdentifier = \"primary\"\n{pad}   BlueprintIdentifier = \"{}\"\n{pad}   BuildableName = \"{}\"\n{pad}   BlueprintName = \"{}\"\n{pad}   ReferencedContainer = \"container:{}\">\n{pad}</BuildableReference>\n",
            escape(&target.id),
            escape(&target.product_name),
            escape(&target.name),
            escape(&self.project_bundle_name),
            pad = pad
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn testable_names(xml: &str) -> Vec<String> {
        let doc = roxmltree::Document::parse(xml).unwrap();
        doc.descendants()
            .filter(|n| n.has_tag_name("TestableReference"))
            .filter_map(|n| n.children().find(|c| c.has_tag_name("BuildableReference")))
            .filter_map(|n| n.attribute("BlueprintName").map(str::to_string))
            .collect()
    }

    fn launch_action(doc: &roxmltree::Document<'_>) -> roxmltree::NodeId {
        doc.descendants()
            .find(|n| n.has_tag_name("LaunchAction"))
            .unwrap()
            .id()
    }

    #[test]
    fn test_application_scheme() {
        let app = Target::native("App", ProductType::Application, None);
        let xml = XcodeScheme::new(&app, "Demo.xcodeproj", "__TulsiTestRunner_Debug").to_xml();

        let doc = roxmltree::Document::parse(&xml).unwrap();
        let test_action = doc.descendants().find(|n| n.has_tag_name("TestAction")).unwrap();
        assert_eq!(test_action.attribute("buildConfiguration"), Some("__TulsiTestRunner_Debug"));

        let launch = doc.get_node(launch_action(&doc)).unwrap();
        assert!(launch.attribute("launchAutomaticallySubstyle").is_none());
        assert!(launch
            .descendants()
            .any(|n| n.has_tag_name("BuildableProductRunnable")));

        let reference = doc.descendants().find(|n| n.has_tag_name("BuildableReference")).unwrap();
        assert_eq!(reference.attribute("BuildableName"), Some("App.app"));
        assert_eq!(reference.attribute("ReferencedContainer"), Some("container:Demo.xcodeproj"));
        assert_eq!(reference.attribute("BlueprintIdentifier"), Some(app.id.as_str()));
        assert!(testable_names(&xml).is_empty());
    }

    #[test]
    fn test_app_extension_scheme() {
        let ext = Target::native("Share", ProductType::AppExtension, None);
        let xml = XcodeScheme::new(&ext, "Demo.xcodeproj", "__TulsiTestRunner_Debug")
            .with_launch_style(LaunchStyle::AppExtension)
            .to_xml();

        let doc = roxmltree::Document::parse(&xml).unwrap();
        let launch = doc.get_node(launch_action(&doc)).unwrap();
        assert_eq!(launch.attribute("launchAutomaticallySubstyle"), Some("2"));
        assert_eq!(launch.attribute("askForAppToLaunch"), Some("Yes"));
        assert_eq!(launch.attribute("selectedDebuggerIdentifier"), Some(""));
    }

    #[test]
    fn test_test_target_is_its_own_testable() {
        let tests = Target::native("AppTests", ProductType::UnitTest, None);
        let xml = XcodeScheme::new(&tests, "Demo.xcodeproj", "X_Debug").to_xml();

        assert_eq!(testable_names(&xml), vec!["AppTests"]);
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let launch = doc.get_node(launch_action(&doc)).unwrap();
        assert!(launch.descendants().any(|n| n.has_tag_name("MacroExpansion")));
    }

    #[test]
    fn test_explicit_tests_replace_target() {
        let host = Target::native("Host", ProductType::Application, None);
        let a = Target::native("ATests", ProductType::UnitTest, None);
        let b = Target::native("BTests", ProductType::UnitTest, None);
        let xml = XcodeScheme::new(&host, "Demo.xcodeproj", "X_Debug")
            .with_explicit_tests([&a, &b])
            .to_xml();

        assert_eq!(testable_names(&xml), vec!["ATests", "BTests"]);
    }

    #[test]
    fn test_attribute_escaping() {
        let odd = Target::native("A&B", ProductType::StaticLibrary, None);
        let xml = XcodeScheme::new(&odd, "Demo.xcodeproj", "X_Debug").to_xml();
        assert!(roxmltree::Document::parse(&xml).is_ok());
    }
}
