//! Interfaces to the build tool
//!
//! The generator never talks to the build tool directly. Rule information
//! and the location of external repositories come through the traits in
//! this module, which keeps the pipeline testable and lets the CLI work from
//! exported rule dumps.

mod json;
mod output_base;

pub use json::JsonRuleLookup;
pub use output_base::OutputBaseResolver;

use crate::label::BuildLabel;
use crate::rule::RuleEntry;
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Resolves labels to rule entries
///
/// Implementations return entries for as many of the requested labels as
/// they know about, plus any related rules (dependencies, test hosts, suite
/// members) they can provide. Missing labels are simply absent from the map;
/// `Err` is reserved for failures of the query itself.
pub trait RuleLookup: Send + Sync {
    fn resolve(
        &self,
        labels: &BTreeSet<BuildLabel>,
        build_options: &[String],
    ) -> Result<BTreeMap<BuildLabel, RuleEntry>>;
}

/// Locates the on-disk checkout of an external repository
pub trait ExternalPathResolver: Send + Sync {
    /// Maps a synthetic path such as `external/deps` to an absolute directory
    fn resolve_external_path(&self, synthetic_path: &str) -> Option<PathBuf>;
}
