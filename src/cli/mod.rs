pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, GenerateArgs, OutputFormatArg, ResolveArgs};
pub use handlers::{handle_generate, handle_resolve};
pub use output::{OutputFormat, OutputFormatter};
