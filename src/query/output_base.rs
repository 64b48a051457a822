use super::ExternalPathResolver;
use crate::fs::FileSystem;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Resolves external repositories below the build tool's output base
///
/// `external/<repo>` maps to `<output_base>/external/<repo>` when that
/// directory exists.
pub struct OutputBaseResolver {
    output_base: Option<PathBuf>,
    file_system: Arc<dyn FileSystem>,
}

impl OutputBaseResolver {
    pub fn new(output_base: Option<PathBuf>, file_system: Arc<dyn FileSystem>) -> Self {
        Self {
            output_base,
            file_system,
        }
    }
}

impl ExternalPathResolver for OutputBaseResolver {
    fn resolve_external_path(&self, synthetic_path: &str) -> Option<PathBuf> {
        let output_base = self.output_base.as_ref()?;
        let candidate = output_base.join(synthetic_path.trim_start_matches('/'));
        if candidate.is_absolute() && self.file_system.is_dir(&candidate) {
            Some(candidate)
        } else {
            debug!(path = %candidate.display(), "External repository not found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use std::path::Path;

    #[test]
    fn test_resolves_existing_repository() {
        let fs = Arc::new(MockFileSystem::new());
        fs.create_dir_all(Path::new("/cache/external/deps")).unwrap();
        let resolver = OutputBaseResolver::new(Some(PathBuf::from("/cache")), fs);

        assert_eq!(
            resolver.resolve_external_path("external/deps"),
            Some(PathBuf::from("/cache/external/deps"))
        );
        assert_eq!(resolver.resolve_external_path("external/missing"), None);
    }

    #[test]
    fn test_without_output_base() {
        let resolver = OutputBaseResolver::new(None, Arc::new(MockFileSystem::new()));
        assert_eq!(resolver.resolve_external_path("external/deps"), None);
    }
}
