use crate::error::GeneratorError;
use crate::pipeline::context::{GenerationState, PipelineContext};
use crate::pipeline::phase_trait::GenerationPhase;
use crate::xml::{plist_dict, PlistValue};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

pub const SCRIPTS_DIR: &str = "Scripts";
pub const CONFIGS_DIR: &str = "Configs";
pub const RESOURCES_DIR: &str = "Resources";

pub const BUILD_SCRIPT_NAME: &str = "bazel_build.sh";
pub const CLEAN_SCRIPT_NAME: &str = "bazel_clean.sh";
pub const ENV_SCRIPT_NAME: &str = "bazel_env.sh";
pub const STUB_PLIST_NAME: &str = "Stub-Info.plist";

const PHASE_NAME: &str = "support_files";

/// Per-user overrides stored next to the shared generator config
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserConfig<'a> {
    user: &'a str,
    build_options: &'a [String],
}

/// Quotes a word for a POSIX shell
fn shell_quote(word: &str) -> String {
    if !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=./:@%+,".contains(c))
    {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', "'\\''"))
}

fn env_script(workspace_root: &Path) -> String {
    format!(
        "#!/bin/bash\n# Environment shared by the generated build scripts.\n\nexport TULSI_WORKSPACE_ROOT={}\nexport BAZEL_PATH=\"${{BAZEL_PATH:-bazel}}\"\n",
        shell_quote(&workspace_root.to_string_lossy())
    )
}

fn build_script(build_options: &[String]) -> String {
    let options: Vec<String> = build_options.iter().map(|o| shell_quote(o)).collect();
    let options = if options.is_empty() {
        String::new()
    } else {
        format!(" {}", options.join(" "))
    };
    format!(
        "#!/bin/bash\n# Builds the labels given as arguments.\nset -euo pipefail\n\nsource \"$(dirname \"$0\")/{}\"\ncd \"$TULSI_WORKSPACE_ROOT\"\nexec \"$BAZEL_PATH\" build{} \"$@\"\n",
        ENV_SCRIPT_NAME, options
    )
}

fn clean_script() -> String {
    format!(
        "#!/bin/bash\nset -euo pipefail\n\nsource \"$(dirname \"$0\")/{}\"\ncd \"$TULSI_WORKSPACE_ROOT\"\nexec \"$BAZEL_PATH\" clean\n",
        ENV_SCRIPT_NAME
    )
}

fn stub_plist() -> String {
    plist_dict(&[
        ("CFBundleExecutable", PlistValue::from("$(EXECUTABLE_NAME)")),
        ("CFBundleIdentifier", "$(PRODUCT_BUNDLE_IDENTIFIER)".into()),
        ("CFBundleName", "$(PRODUCT_NAME)".into()),
        ("CFBundlePackageType", "APPL".into()),
        ("CFBundleShortVersionString", "1.0".into()),
        ("CFBundleVersion", "1".into()),
    ])
}

/// Installs build scripts, generator configs and resources under `.tulsi`
///
/// Every file is independent; a failed write becomes a warning.
pub struct SupportFilesPhase;

impl SupportFilesPhase {
    fn install(
        context: &PipelineContext,
        path: &Path,
        contents: &[u8],
        executable: bool,
    ) -> Result<()> {
        let fs = &context.file_system;
        fs.write_atomic(path, contents)?;
        if executable {
            fs.set_executable(path)
                .context("Failed to mark script executable")?;
        }
        Ok(())
    }

    fn planned_files(context: &PipelineContext, state: &GenerationState) -> Result<Vec<(String, Vec<u8>, bool)>> {
        let support = state.support_dir();
        let scripts = support.join(SCRIPTS_DIR);
        let configs = support.join(CONFIGS_DIR);
        let config = &state.config;
        let user = &context.config.settings.user;

        let mut shared_config = serde_json::to_vec_pretty(config).context("Failed to encode generator config")?;
        shared_config.push(b'\n');
        let mut user_config = serde_json::to_vec_pretty(&UserConfig {
            user,
            build_options: &config.build_options,
        })
        .context("Failed to encode user config")?;
        user_config.push(b'\n');

        let path = |dir: &Path, name: &str| dir.join(name).to_string_lossy().into_owned();
        Ok(vec![
            (path(&scripts, BUILD_SCRIPT_NAME), build_script(&config.build_options).into_bytes(), true),
            (path(&scripts, CLEAN_SCRIPT_NAME), clean_script().into_bytes(), true),
            (path(&scripts, ENV_SCRIPT_NAME), env_script(&config.workspace_root).into_bytes(), true),
            (path(&configs, &format!("{}.tulsigen", config.project_name)), shared_config, false),
            (path(&configs, &format!("{}.tulsigen-user", user)), user_config, false),
            (path(&support.join(RESOURCES_DIR), STUB_PLIST_NAME), stub_plist().into_bytes(), false),
        ])
    }
}

impl GenerationPhase for SupportFilesPhase {
    fn name(&self) -> &'static str {
        PHASE_NAME
    }

    fn execute(
        &self,
        context: &PipelineContext,
        state: &mut GenerationState,
    ) -> Result<(), GeneratorError> {
        let files = match Self::planned_files(context, state) {
            Ok(files) => files,
            Err(e) => {
                state
                    .diagnostics
                    .warn(PHASE_NAME, format!("Failed to prepare support files: {:#}", e));
                return Ok(());
            }
        };

        let mut installed = 0;
        for (path, contents, executable) in &files {
            match Self::install(context, Path::new(path), contents, *executable) {
                Ok(()) => installed += 1,
                Err(e) => state
                    .diagnostics
                    .warn(PHASE_NAME, format!("Failed to install {}: {:#}", path, e)),
            }
        }

        info!(installed, total = files.len(), "Installed support files");
        Ok(())
    }
}
