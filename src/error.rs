//! Errors that abort a generation run

use crate::label::BuildLabel;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    /// One or more requested labels were not known to the build tool
    #[error("Failed to resolve {} label(s): {}", .0.len(), format_labels(.0))]
    LabelResolutionFailed(BTreeSet<BuildLabel>),

    #[error("Build tool query failed: {0:#}")]
    RuleLookup(#[source] anyhow::Error),

    #[error("Failed to build project objects: {0:#}")]
    ProjectBuild(#[source] anyhow::Error),

    #[error("Failed to create project directory {path:?}: {source:#}")]
    ProjectDirectory {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to serialize project: {0:#}")]
    Serialization(#[source] anyhow::Error),

    #[error("Failed to write project file {path:?}: {source:#}")]
    ProjectWrite {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Pipeline state missing: {0}")]
    MissingState(&'static str),
}

impl GeneratorError {
    /// Labels the build tool could not resolve, if that is why the run failed
    pub fn unresolved_labels(&self) -> Option<&BTreeSet<BuildLabel>> {
        match self {
            GeneratorError::LabelResolutionFailed(labels) => Some(labels),
            _ => None,
        }
    }
}

fn format_labels(labels: &BTreeSet<BuildLabel>) -> String {
    labels
        .iter()
        .map(BuildLabel::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_resolution_error_lists_every_label() {
        let labels: BTreeSet<BuildLabel> = ["//b:Two", "//a:One"]
            .iter()
            .map(|s| BuildLabel::parse(s).unwrap())
            .collect();
        let error = GeneratorError::LabelResolutionFailed(labels.clone());

        assert_eq!(
            error.to_string(),
            "Failed to resolve 2 label(s): //a:One, //b:Two"
        );
        assert_eq!(error.unresolved_labels(), Some(&labels));
    }

    #[test]
    fn test_wrapped_errors_keep_context() {
        let error = GeneratorError::Serialization(anyhow!("bad graph").context("encoding"));
        assert_eq!(error.to_string(), "Failed to serialize project: encoding: bad graph");
        assert!(error.unresolved_labels().is_none());
    }
}
