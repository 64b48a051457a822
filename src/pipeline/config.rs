use crate::config::GeneratorSettings;
use crate::progress::{LoggingHandler, ProgressHandler};
use std::sync::Arc;

#[derive(Clone)]
pub struct PipelineConfig {
    pub settings: GeneratorSettings,
    pub progress: Arc<dyn ProgressHandler>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            settings: GeneratorSettings::default(),
            progress: Arc::new(LoggingHandler),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: GeneratorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }
}

impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoOpHandler;

    #[test]
    fn test_builder_pattern() {
        let settings = GeneratorSettings {
            user: "alice".to_string(),
            log_level: "debug".to_string(),
            output_base: None,
        };
        let config = PipelineConfig::new()
            .with_settings(settings.clone())
            .with_progress(Arc::new(NoOpHandler));

        assert_eq!(config.settings, settings);
        assert!(format!("{:?}", config).contains("alice"));
    }
}
