//! Non-fatal problems collected during a run

use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub phase: String,
    pub message: String,
}

/// Accumulates degraded outcomes; every entry is logged when recorded
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, phase: &str, message: impl Into<String>) {
        let message = message.into();
        warn!(phase, "{}", message);
        self.entries.push(Diagnostic {
            phase: phase.to_string(),
            message,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Entries recorded after the first `start` ones
    pub fn since(&self, start: usize) -> &[Diagnostic] {
        self.entries.get(start..).unwrap_or(&[])
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(|d| d.message.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());

        diagnostics.warn("expand", "first");
        diagnostics.warn("schemes", "second");

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.messages(), vec!["first", "second"]);
        assert_eq!(diagnostics.since(1)[0].phase, "schemes");
        assert!(diagnostics.since(5).is_empty());
    }
}
