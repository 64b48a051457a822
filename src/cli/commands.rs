use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Generates Xcode projects from Bazel build graphs
#[derive(Parser, Debug)]
#[command(
    name = "tulsigen",
    about = "Generates Xcode projects from Bazel build graphs",
    version,
    author,
    long_about = "tulsigen resolves a set of Bazel labels against an exported rule dump, \
                  expands their dependency graph and writes an .xcodeproj bundle with \
                  schemes, build scripts and a generator manifest."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate an Xcode project",
        long_about = "Resolves the configured labels, builds the project graph and writes \
                      <output>/<projectName>.xcodeproj.\n\n\
                      Examples:\n  \
                      tulsigen generate --config App.tulsigen --rules rules.json --output .\n  \
                      tulsigen generate --config app.yaml --rules rules.json --output out --format json\n  \
                      tulsigen generate --config App.tulsigen --rules rules.json --output . \\\n    \
                      --output-base /private/var/tmp/_bazel/abc123"
    )]
    Generate(GenerateArgs),

    #[command(
        about = "Check that every configured label resolves",
        long_about = "Runs only label resolution and reports labels the rule dump does not know.\n\n\
                      Examples:\n  \
                      tulsigen resolve --config App.tulsigen --rules rules.json"
    )]
    Resolve(ResolveArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(
        short = 'c',
        long,
        value_name = "FILE",
        help = "Generator config (.tulsigen, .json, .yaml or .yml)"
    )]
    pub config: PathBuf,

    #[arg(short = 'r', long, value_name = "FILE", help = "Rule dump exported from the build tool")]
    pub rules: PathBuf,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        help = "Directory that receives the .xcodeproj bundle"
    )]
    pub output: PathBuf,

    #[arg(
        long,
        value_name = "DIR",
        help = "Build tool output base used to locate external repositories (overrides TULSIGEN_OUTPUT_BASE)"
    )]
    pub output_base: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    #[arg(
        short = 'c',
        long,
        value_name = "FILE",
        help = "Generator config (.tulsigen, .json, .yaml or .yml)"
    )]
    pub config: PathBuf,

    #[arg(short = 'r', long, value_name = "FILE", help = "Rule dump exported from the build tool")]
    pub rules: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
