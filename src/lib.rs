//! tulsigen - Xcode project generation from Bazel build graphs
//!
//! The library turns a set of requested build labels into a complete
//! `.xcodeproj` bundle. Rule information comes from the build tool through
//! the [`query::RuleLookup`] trait; everything after that is a deterministic
//! pipeline of phases that never talks to the build tool again.
//!
//! # Core Concepts
//!
//! - **Labels and rules**: [`BuildLabel`] names a build unit, [`RuleEntry`]
//!   is what the build tool knows about it
//! - **Project graph**: an in-memory model of groups, file references and
//!   targets ([`project::ProjectGraph`]) serialized into `project.pbxproj`
//! - **Pipeline**: [`PipelineOrchestrator`] runs resolution, expansion,
//!   project building and every file-writing phase in a fixed order
//! - **Diagnostics**: non-fatal problems are collected as warnings and
//!   returned in the [`GenerationReport`]; only a handful of errors abort a run
//!
//! # Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use tulsigen::fs::{FileSystem, RealFileSystem};
//! use tulsigen::query::{JsonRuleLookup, OutputBaseResolver};
//! use tulsigen::{GeneratorConfig, PipelineConfig, PipelineContext, PipelineOrchestrator};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = GeneratorConfig::load(Path::new("App.tulsigen"))?;
//! let file_system: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
//! let context = PipelineContext::new(
//!     Arc::new(JsonRuleLookup::from_file(Path::new("rules.json"))?),
//!     Arc::new(OutputBaseResolver::new(None, file_system.clone())),
//!     file_system,
//!     PipelineConfig::default(),
//! );
//!
//! let report = PipelineOrchestrator::new(context).generate(&config, Path::new("."))?;
//! for warning in &report.warnings {
//!     println!("warning: {}", warning);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`pipeline`]: orchestrator, context and the numbered generation phases
//! - [`project`]: project graph, object builder and serializer
//! - [`scheme`]: `.xcscheme` rendering
//! - [`query`]: build tool interfaces
//! - [`cli`]: command-line front end

pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod label;
pub mod path_trie;
pub mod pipeline;
pub mod progress;
pub mod project;
pub mod query;
pub mod rule;
pub mod scheme;
pub mod util;
pub mod xml;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types for convenient access
pub use config::{ConfigError, GeneratorConfig, GeneratorSettings};
pub use error::GeneratorError;
pub use label::BuildLabel;
pub use pipeline::{
    GenerationReport, GeneratorManifest, PipelineConfig, PipelineContext, PipelineOrchestrator,
};
pub use rule::RuleEntry;
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_tulsigen() {
        assert_eq!(NAME, "tulsigen");
    }
}
