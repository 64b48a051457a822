//! Command handlers
//!
//! Each handler wires the real collaborators into a pipeline, runs it and
//! prints the formatted result. Handlers return the process exit code.

use super::commands::{GenerateArgs, OutputFormatArg, ResolveArgs};
use super::output::OutputFormatter;
use crate::config::{GeneratorConfig, GeneratorSettings};
use crate::error::GeneratorError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::{PipelineConfig, PipelineContext, PipelineOrchestrator};
use crate::progress::NoOpHandler;
use crate::query::{JsonRuleLookup, OutputBaseResolver};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_UNRESOLVED_LABELS: i32 = 2;

/// Loads and validates the generator config plus the per-user settings
fn load_inputs(
    config_path: &Path,
    output_base: Option<&PathBuf>,
) -> Result<(GeneratorConfig, GeneratorSettings)> {
    let config = GeneratorConfig::load(config_path)?;
    config.validate()?;

    let mut settings = GeneratorSettings::default();
    if let Some(output_base) = output_base {
        settings.output_base = Some(output_base.clone());
    }
    settings.validate()?;

    debug!(
        project = %config.project_name,
        targets = config.build_targets.len(),
        user = %settings.user,
        "Loaded generator config"
    );
    Ok((config, settings))
}

fn build_orchestrator(
    rules_path: &Path,
    settings: GeneratorSettings,
    quiet: bool,
) -> Result<PipelineOrchestrator> {
    let lookup = JsonRuleLookup::from_file(rules_path)?;
    info!(rules = lookup.len(), path = %rules_path.display(), "Loaded rule dump");

    let file_system: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
    let resolver = OutputBaseResolver::new(settings.output_base.clone(), file_system.clone());

    let mut pipeline_config = PipelineConfig::new().with_settings(settings);
    if quiet {
        pipeline_config = pipeline_config.with_progress(Arc::new(NoOpHandler));
    }

    let context = PipelineContext::new(
        Arc::new(lookup),
        Arc::new(resolver),
        file_system,
        pipeline_config,
    );
    Ok(PipelineOrchestrator::new(context))
}

fn print(text: Result<String>) -> i32 {
    match text {
        Ok(text) => {
            println!("{}", text.trim_end());
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

fn report_failure(formatter: &OutputFormatter, error: &GeneratorError) -> i32 {
    if let Some(labels) = error.unresolved_labels() {
        error!("{}", error);
        return match print(formatter.format_unresolved(labels)) {
            EXIT_SUCCESS => EXIT_UNRESOLVED_LABELS,
            code => code,
        };
    }
    error!("Generation failed: {}", error);
    eprintln!("Error: {}", error);
    EXIT_FAILURE
}

fn setup_failed(error: anyhow::Error) -> i32 {
    error!("{:#}", error);
    eprintln!("Error: {:#}", error);
    EXIT_FAILURE
}

pub fn handle_generate(args: &GenerateArgs, quiet: bool) -> i32 {
    let formatter = OutputFormatter::new(args.format.into());

    let prepared = load_inputs(&args.config, args.output_base.as_ref()).and_then(
        |(config, settings)| {
            build_orchestrator(&args.rules, settings, quiet).map(|orchestrator| (config, orchestrator))
        },
    );
    let (config, orchestrator) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => return setup_failed(e),
    };

    match orchestrator.generate(&config, &args.output) {
        Ok(report) => {
            if quiet && args.format == OutputFormatArg::Human {
                return EXIT_SUCCESS;
            }
            print(formatter.format_report(&report))
        }
        Err(e) => report_failure(&formatter, &e),
    }
}

pub fn handle_resolve(args: &ResolveArgs, quiet: bool) -> i32 {
    let formatter = OutputFormatter::new(args.format.into());

    let prepared = load_inputs(&args.config, None).and_then(|(config, settings)| {
        build_orchestrator(&args.rules, settings, quiet).map(|orchestrator| (config, orchestrator))
    });
    let (config, orchestrator) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => return setup_failed(e),
    };

    match orchestrator.resolve(&config) {
        Ok(rules) => print(formatter.format_resolution(&rules)),
        Err(e) => report_failure(&formatter, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    const RULES: &str = r#"{"rules": [
        {"label": "//app:App", "type": "ios_application", "targetType": "application",
         "sourceFiles": [{"path": "app/main.m"}]}
    ]}"#;

    fn write_inputs(dir: &TempDir, targets: &[&str]) -> (PathBuf, PathBuf) {
        let config = serde_json::json!({
            "projectName": "App",
            "buildTargets": targets,
            "workspaceRoot": dir.path(),
        });
        let config_path = dir.path().join("App.tulsigen");
        let rules_path = dir.path().join("rules.json");
        fs::write(&config_path, config.to_string()).unwrap();
        fs::write(&rules_path, RULES).unwrap();
        (config_path, rules_path)
    }

    fn generate_args(dir: &TempDir, config: PathBuf, rules: PathBuf) -> GenerateArgs {
        GenerateArgs {
            config,
            rules,
            output: dir.path().join("out"),
            output_base: None,
            format: OutputFormatArg::Json,
        }
    }

    #[test]
    #[serial]
    fn test_generate_succeeds() {
        let dir = TempDir::new().unwrap();
        let (config, rules) = write_inputs(&dir, &["//app:App"]);
        let args = generate_args(&dir, config, rules);

        assert_eq!(handle_generate(&args, true), EXIT_SUCCESS);
        assert!(dir.path().join("out/App.xcodeproj/project.pbxproj").is_file());
    }

    #[test]
    #[serial]
    fn test_generate_unresolved_labels() {
        let dir = TempDir::new().unwrap();
        let (config, rules) = write_inputs(&dir, &["//app:App", "//missing:Lib"]);
        let args = generate_args(&dir, config, rules);

        assert_eq!(handle_generate(&args, true), EXIT_UNRESOLVED_LABELS);
        assert!(!dir.path().join("out/App.xcodeproj").exists());
    }

    #[test]
    #[serial]
    fn test_generate_missing_config() {
        let dir = TempDir::new().unwrap();
        let (_, rules) = write_inputs(&dir, &["//app:App"]);
        let args = generate_args(&dir, dir.path().join("absent.tulsigen"), rules);

        assert_eq!(handle_generate(&args, true), EXIT_FAILURE);
    }

    #[test]
    #[serial]
    fn test_generate_invalid_config() {
        let dir = TempDir::new().unwrap();
        let (config, rules) = write_inputs(&dir, &[]);
        let args = generate_args(&dir, config, rules);

        assert_eq!(handle_generate(&args, true), EXIT_FAILURE);
    }

    #[test]
    #[serial]
    fn test_resolve_exit_codes() {
        let dir = TempDir::new().unwrap();
        let (config, rules) = write_inputs(&dir, &["//app:App"]);
        let args = ResolveArgs {
            config,
            rules: rules.clone(),
            format: OutputFormatArg::Human,
        };
        assert_eq!(handle_resolve(&args, true), EXIT_SUCCESS);

        let (config, _) = write_inputs(&dir, &["//nowhere:X"]);
        let args = ResolveArgs {
            config,
            rules,
            format: OutputFormatArg::Human,
        };
        assert_eq!(handle_resolve(&args, true), EXIT_UNRESOLVED_LABELS);
    }
}
