use super::context::{GenerationState, PipelineContext};
use crate::error::GeneratorError;

/// One stage of project generation
///
/// Phases run in order against the same state. Returning `Err` aborts the
/// run; degraded outcomes go to `state.diagnostics` instead.
pub trait GenerationPhase: Send + Sync {
    fn name(&self) -> &'static str;

    fn execute(
        &self,
        context: &PipelineContext,
        state: &mut GenerationState,
    ) -> Result<(), GeneratorError>;
}
