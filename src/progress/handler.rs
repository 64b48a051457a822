//! Progress handler trait and events

use std::time::Duration;

/// Events emitted while a project is generated
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Generation started
    Started { project_name: String, targets: usize },

    /// A pipeline phase started
    PhaseStarted { phase: String },

    /// A pipeline phase finished
    PhaseComplete { phase: String, duration: Duration },

    /// A non-fatal problem was recorded
    Warning { phase: String, message: String },

    /// Generation completed
    Completed {
        project_path: String,
        warnings: usize,
        total_time: Duration,
    },

    /// Generation failed
    Failed { error: String },
}

/// Trait for handling progress events during generation
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
