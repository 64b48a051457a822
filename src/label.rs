//! Build labels
//!
//! A [`BuildLabel`] names one build unit in the build tool's graph, e.g.
//! `//app/ios:Main` or `@deps//lib:Utils`. Labels are compared and hashed by
//! their canonical string form and are used as map keys throughout the
//! generator.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors produced when parsing a label string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("Empty build label")]
    Empty,

    #[error("Malformed build label '{0}'. Expected [@repo]//package[:name]")]
    Malformed(String),
}

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(@[A-Za-z0-9_.\-]*)?//([^:]*)(:[^:]+)?$").expect("label pattern is valid")
    })
}

/// Fully-qualified identifier of a build unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BuildLabel(String);

impl BuildLabel {
    pub fn parse(value: &str) -> Result<Self, LabelError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(LabelError::Empty);
        }
        if !label_pattern().is_match(value) {
            return Err(LabelError::Malformed(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Package path without the repository prefix, e.g. `app/ios`
    pub fn package(&self) -> &str {
        let after_slashes = match self.0.find("//") {
            Some(idx) => &self.0[idx + 2..],
            None => self.0.as_str(),
        };
        match after_slashes.find(':') {
            Some(idx) => &after_slashes[..idx],
            None => after_slashes,
        }
    }

    /// Short, unqualified name: the part after `:` or the last package component
    pub fn target_name(&self) -> &str {
        if let Some(idx) = self.0.rfind(':') {
            return &self.0[idx + 1..];
        }
        let package = self.package();
        package.rsplit('/').next().unwrap_or(package)
    }

    /// Repository name without the leading `@`, if the label has one
    pub fn repository(&self) -> Option<&str> {
        let prefix = &self.0[..self.0.find("//")?];
        prefix.strip_prefix('@').filter(|repo| !repo.is_empty())
    }

    /// Name qualified by repository and package, safe for use as a target or
    /// file name
    ///
    /// `//app/ios:Main` becomes `app-ios-Main` and `@deps//lib:Net` becomes
    /// `deps-lib-Net`.
    pub fn full_target_name(&self) -> String {
        let package = self.package();
        let parts = self
            .repository()
            .into_iter()
            .chain((!package.is_empty()).then_some(package))
            .chain(std::iter::once(self.target_name()));
        parts.collect::<Vec<_>>().join("-").replace('/', "-")
    }
}

impl fmt::Display for BuildLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BuildLabel {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BuildLabel {
    type Error = LabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BuildLabel> for String {
    fn from(label: BuildLabel) -> Self {
        label.0
    }
}
