use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Design-token source detection and extraction
#[derive(Parser, Debug)]
#[command(
    name = "tokenscout",
    about = "Find and extract design tokens from a front-end project",
    version,
    long_about = "tokenscout scans a project for design-token sources (utility-CSS configs, \
                  component-library themes, CSS custom properties, token dictionaries, \
                  design-tool exports) and normalizes what it finds into one token tree. \
                  Every decision can be overridden with a tokenscout.config.json file."
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
        about = "List token sources in a project",
        long_about = "Runs the detection heuristics and operator overrides and prints the \
                      surviving token sources, highest confidence first.\n\n\
                      Examples:\n  \
                      tokenscout detect\n  \
                      tokenscout detect ./apps/web --format json\n  \
                      tokenscout detect --config ci/tokenscout.yaml"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Extract a normalized token tree",
        long_about = "Detects token sources, evaluates them and merges their tokens into one \
                      tree keyed by <ecosystem>-<name>. Writes token-detection-log.json to the \
                      output directory unless --no-log is given.\n\n\
                      Examples:\n  \
                      tokenscout extract\n  \
                      tokenscout extract ./apps/web -o tokens.json\n  \
                      tokenscout extract --output-dir /tmp/audit"
    )]
    Extract(ExtractArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(value_name = "PATH", help = "Project root (defaults to current directory)")]
    pub project_path: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Override config file to use instead of discovery")]
    pub config: Option<PathBuf>,

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
pub struct ExtractArgs {
    #[arg(value_name = "PATH", help = "Project root (defaults to current directory)")]
    pub project_path: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Override config file to use instead of discovery")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Directory for token-detection-log.json (default: TOKENSCOUT_OUTPUT_DIR)"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the token tree to a file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Do not write the detection log")]
    pub no_log: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_detect_args() {
        let args = CliArgs::parse_from(["tokenscout", "detect"]);
        match args.command {
            Commands::Detect(detect) => {
                assert_eq!(detect.format, OutputFormatArg::Human);
                assert!(detect.project_path.is_none());
                assert!(detect.config.is_none());
            }
            _ => panic!("Expected Detect command"),
        }
    }

    #[test]
    fn test_extract_args() {
        let args = CliArgs::parse_from([
            "tokenscout",
            "extract",
            "/tmp/app",
            "--config",
            "overrides.yaml",
            "-o",
            "tokens.json",
            "--no-log",
        ]);
        match args.command {
            Commands::Extract(extract) => {
                assert_eq!(extract.project_path, Some(PathBuf::from("/tmp/app")));
                assert_eq!(extract.config, Some(PathBuf::from("overrides.yaml")));
                assert_eq!(extract.output, Some(PathBuf::from("tokens.json")));
                assert!(extract.no_log);
                assert!(extract.output_dir.is_none());
            }
            _ => panic!("Expected Extract command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["tokenscout", "detect", "-v"]);
        assert!(args.verbose);
        assert!(CliArgs::try_parse_from(["tokenscout", "detect", "-v", "-q"]).is_err());

        let args = CliArgs::parse_from(["tokenscout", "--log-level", "trace", "extract"]);
        assert_eq!(args.log_level.as_deref(), Some("trace"));
    }
}
