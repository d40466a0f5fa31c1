use tokenscout::cli::commands::{CliArgs, Commands};
use tokenscout::cli::handlers::{handle_detect, handle_extract};
use tokenscout::util::logging::parse_level;
use tokenscout::util::{init_logging, LogFormat, LoggingConfig};
use tokenscout::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(
        LoggingConfig::with_level(log_level_from_args(&args)).with_format(LogFormat::from_env()),
    );

    debug!("tokenscout v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Detect(detect_args) => handle_detect(detect_args, args.quiet).await,
        Commands::Extract(extract_args) => handle_extract(extract_args, args.quiet).await,
    };

    std::process::exit(exit_code);
}

fn log_level_from_args(args: &CliArgs) -> Level {
    if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str = env::var("TOKENSCOUT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        parse_level(&level_str)
    }
}
