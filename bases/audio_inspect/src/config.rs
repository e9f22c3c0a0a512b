// bases/audio_inspect/src/config.rs
use crate::commands::Commands;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Output rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Default log filter, used when RUST_LOG is not set
    pub log_filter: String,

    pub output: OutputMode,
}

/// Inspect audio file types, tempos and loudness records
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    pub quiet: bool,

    /// Print machine readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Config {
    pub fn from_args(args: &CliArgs) -> Self {
        let level = if args.quiet {
            "error"
        } else {
            match args.verbose {
                0 => "warn",
                1 => "debug",
                _ => "trace",
            }
        };

        let output = if args.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        Self {
            log_filter: level.to_string(),
            output,
        }
    }

    /// Install the global subscriber; RUST_LOG overrides the flags
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_filter));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
