// Generation phases, in the order the orchestrator runs them
//
// Each phase reads what earlier phases left in the generation state and adds
// its own result. Phases 05 onwards only read the project graph.

#[path = "01_resolve.rs"]
pub mod resolve;
#[path = "02_expand.rs"]
pub mod expand;
#[path = "03_build_project.rs"]
pub mod build_project;
#[path = "04_external.rs"]
pub mod external;
#[path = "05_write_project.rs"]
pub mod write_project;
#[path = "06_schemes.rs"]
pub mod schemes;
#[path = "07_support_files.rs"]
pub mod support_files;
#[path = "08_artifact_dirs.rs"]
pub mod artifact_dirs;
#[path = "09_manifest.rs"]
pub mod manifest;
