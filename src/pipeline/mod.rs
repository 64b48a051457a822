pub mod config;
pub mod context;
pub mod diagnostics;
pub mod orchestrator;
pub mod phase_trait;
pub mod phases;

pub use config::PipelineConfig;
pub use context::{GeneratedProjectInfo, GenerationState, PipelineContext};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use orchestrator::{GenerationReport, PipelineOrchestrator};
pub use phase_trait::GenerationPhase;
pub use phases::manifest::GeneratorManifest;
