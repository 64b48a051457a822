//! Output formatting for CLI results
//!
//! Generation reports, resolved rule listings and unresolved-label failures
//! can be rendered as JSON, YAML or human-readable text.
//!
//! # Example
//!
//! ```ignore
//! use tulsigen::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! println!("{}", formatter.format_report(&report)?);
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::label::BuildLabel;
use crate::pipeline::{GenerationReport, GeneratorManifest};
use crate::rule::RuleEntry;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportView<'a> {
    project_path: String,
    warnings: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest: Option<&'a GeneratorManifest>,
}

#[derive(Serialize)]
struct ResolvedRule<'a> {
    label: &'a str,
    kind: &'a str,
}

#[derive(Serialize)]
struct ResolutionView<'a> {
    resolved: Vec<ResolvedRule<'a>>,
}

#[derive(Serialize)]
struct UnresolvedView<'a> {
    unresolved: Vec<&'a str>,
}

/// Output formatter for generation results
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the report of a successful generation run
    pub fn format_report(&self, report: &GenerationReport) -> Result<String> {
        let view = ReportView {
            project_path: report.project_path.display().to_string(),
            warnings: &report.warnings,
            manifest: report.manifest.as_ref(),
        };
        match self.format {
            OutputFormat::Json => to_json(&view, "generation report"),
            OutputFormat::Yaml => to_yaml(&view, "generation report"),
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    /// Formats the rules returned by a resolve-only run
    pub fn format_resolution(&self, rules: &BTreeMap<BuildLabel, RuleEntry>) -> Result<String> {
        let view = ResolutionView {
            resolved: rules
                .values()
                .map(|rule| ResolvedRule {
                    label: rule.label.as_str(),
                    kind: &rule.kind,
                })
                .collect(),
        };
        match self.format {
            OutputFormat::Json => to_json(&view, "resolved rules"),
            OutputFormat::Yaml => to_yaml(&view, "resolved rules"),
            OutputFormat::Human => {
                let mut output = format!("\u{2713} Resolved {} rule(s)\n{}\n\n", rules.len(), RULE);
                for rule in rules.values() {
                    output.push_str(&format!("  {}  ({})\n", rule.label, rule.kind));
                }
                Ok(output)
            }
        }
    }

    /// Formats the labels that failed to resolve
    pub fn format_unresolved(&self, labels: &BTreeSet<BuildLabel>) -> Result<String> {
        let view = UnresolvedView {
            unresolved: labels.iter().map(BuildLabel::as_str).collect(),
        };
        match self.format {
            OutputFormat::Json => to_json(&view, "unresolved labels"),
            OutputFormat::Yaml => to_yaml(&view, "unresolved labels"),
            OutputFormat::Human => {
                let mut output =
                    format!("\u{2717} {} label(s) could not be resolved\n{}\n\n", labels.len(), RULE);
                for label in labels {
                    output.push_str(&format!("  - {}\n", label));
                }
                Ok(output)
            }
        }
    }

    fn format_report_human(&self, report: &GenerationReport) -> String {
        let mut output = String::new();
        output.push_str("\u{2713} Generated Xcode Project\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!("Project:  {}\n", report.project_path.display()));

        if let Some(manifest) = &report.manifest {
            output.push_str(&format!(
                "\u{251C}\u{2500} Targets:    {}\n",
                manifest.targets.len()
            ));
            output.push_str(&format!(
                "\u{251C}\u{2500} Files:      {}\n",
                manifest.file_references.len()
            ));
            output.push_str(&format!(
                "\u{2514}\u{2500} Artifacts:  {}\n",
                manifest.artifacts.len()
            ));
        }

        if !report.warnings.is_empty() {
            output.push_str("\n\u{26A0} Warnings:\n");
            for warning in &report.warnings {
                output.push_str(&format!("  - {}\n", warning));
            }
        }
        output
    }
}

fn to_json<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value).with_context(|| format!("Failed to serialize {} to JSON", what))
}

fn to_yaml<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{label, rule};
    use std::path::PathBuf;

    fn report(warnings: &[&str]) -> GenerationReport {
        GenerationReport {
            project_path: PathBuf::from("/out/App.xcodeproj"),
            warnings: warnings.iter().map(|w| w.to_string()).collect(),
            manifest: Some(GeneratorManifest {
                manifest_version: 1,
                file_references: ["app/main.m".to_string()].into_iter().collect(),
                targets: ["App".to_string()].into_iter().collect(),
                artifacts: BTreeSet::new(),
            }),
        }
    }

    #[test]
    fn test_json_report() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_report(&report(&["Missing host"]))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["projectPath"], "/out/App.xcodeproj");
        assert_eq!(value["warnings"], serde_json::json!(["Missing host"]));
        assert_eq!(value["manifest"]["targets"], serde_json::json!(["App"]));
    }

    #[test]
    fn test_yaml_report() {
        let output = OutputFormatter::new(OutputFormat::Yaml)
            .format_report(&report(&[]))
            .unwrap();
        assert!(output.contains("projectPath: /out/App.xcodeproj"));
    }

    #[test]
    fn test_human_report() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_report(&report(&["Missing host"]))
            .unwrap();

        assert!(output.contains("Generated Xcode Project"));
        assert!(output.contains("Project:  /out/App.xcodeproj"));
        assert!(output.contains("Targets:    1"));
        assert!(output.contains("  - Missing host"));
    }

    #[test]
    fn test_human_report_without_warnings() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_report(&report(&[]))
            .unwrap();
        assert!(!output.contains("Warnings"));
    }

    #[test]
    fn test_unresolved_lists_every_label() {
        let labels: BTreeSet<BuildLabel> = [label("//b:B"), label("//a:A")].into_iter().collect();

        let human = OutputFormatter::new(OutputFormat::Human)
            .format_unresolved(&labels)
            .unwrap();
        assert!(human.contains("2 label(s)"));
        assert!(human.find("//a:A").unwrap() < human.find("//b:B").unwrap());

        let json = OutputFormatter::new(OutputFormat::Json)
            .format_unresolved(&labels)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["unresolved"], serde_json::json!(["//a:A", "//b:B"]));
    }

    #[test]
    fn test_resolution_listing() {
        let rules: BTreeMap<BuildLabel, RuleEntry> = [rule("//app:App", "ios_application")]
            .into_iter()
            .map(|r| (r.label.clone(), r))
            .collect();

        let json = OutputFormatter::new(OutputFormat::Json)
            .format_resolution(&rules)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["resolved"][0]["label"], "//app:App");
        assert_eq!(value["resolved"][0]["kind"], "ios_application");
    }
}
