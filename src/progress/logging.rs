//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started {
                project_name,
                targets,
            } => {
                info!(project = %project_name, targets, "Starting project generation");
            }
            ProgressEvent::PhaseStarted { phase } => {
                debug!(phase = %phase, "Starting phase");
            }
            ProgressEvent::PhaseComplete { phase, duration } => {
                info!(
                    phase = %phase,
                    duration_ms = duration.as_millis(),
                    "Phase complete"
                );
            }
            ProgressEvent::Warning { phase, message } => {
                // Diagnostics already log at warn level when recorded
                debug!(phase = %phase, "Warning recorded: {}", message);
            }
            ProgressEvent::Completed {
                project_path,
                warnings,
                total_time,
            } => {
                if *warnings > 0 {
                    info!(
                        project = %project_path,
                        warnings,
                        total_time_ms = total_time.as_millis(),
                        "Generation complete with warnings"
                    );
                } else {
                    info!(
                        project = %project_path,
                        total_time_ms = total_time.as_millis(),
                        "Generation complete"
                    );
                }
            }
            ProgressEvent::Failed { error } => {
                warn!(error = %error, "Generation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_logging_all_events() {
        let handler = LoggingHandler;

        let events = vec![
            ProgressEvent::Started {
                project_name: "App".to_string(),
                targets: 3,
            },
            ProgressEvent::PhaseStarted {
                phase: "resolve".to_string(),
            },
            ProgressEvent::PhaseComplete {
                phase: "resolve".to_string(),
                duration: Duration::from_millis(10),
            },
            ProgressEvent::Warning {
                phase: "schemes".to_string(),
                message: "No target for //app:Gone".to_string(),
            },
            ProgressEvent::Completed {
                project_path: "/out/App.xcodeproj".to_string(),
                warnings: 1,
                total_time: Duration::from_millis(120),
            },
            ProgressEvent::Failed {
                error: "boom".to_string(),
            },
        ];

        for event in events {
            handler.on_progress(&event);
        }
    }
}
