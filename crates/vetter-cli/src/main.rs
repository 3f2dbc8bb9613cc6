//! Vetter CLI - Dependency risk analyzer for npm projects.

use anyhow::Result;
use clap::{Args, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use vetter_cli::commands::{self, AnalyzeOptions, ConfigCommand};
use vetter_cli::formatters::OutputFormat;
use vetter_cli::logging;

#[derive(Parser, Debug)]
#[command(name = "vetter")]
#[command(about = "Dependency risk analyzer for npm projects", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file path
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Analyze a resolved dependency list
    ///
    /// Examples:
    ///   vetter analyze deps.json
    ///   cat deps.json | vetter analyze --json
    ///   vetter analyze deps.json --fixes | xargs npm install
    Analyze(AnalyzeArgs),

    /// Manage vetter configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// JSON dependency list (reads stdin when omitted or "-")
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Project license, overriding the input document and config
    #[arg(long, value_name = "SPDX")]
    license: Option<String>,

    /// Output format
    #[arg(short, long = "output", value_enum, default_value = "human")]
    format: OutputFormat,

    /// Output JSON format (alias for --output json)
    #[arg(long)]
    json: bool,

    /// Print only the space-separated fix specs
    #[arg(long)]
    fixes: bool,

    /// Use the built-in advisory table instead of the live service
    #[arg(long)]
    offline_advisories: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Analyze(args) => commands::run_analyze(&AnalyzeOptions {
            input: args.input,
            config: cli.config,
            license: args.license,
            format: if args.json {
                OutputFormat::Json
            } else {
                args.format
            },
            fixes_only: args.fixes,
            offline_advisories: args.offline_advisories,
        }),
        Command::Config { command } => {
            commands::handle_config_command(command, cli.config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
