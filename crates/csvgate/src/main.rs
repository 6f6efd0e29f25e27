//! csvgate command-line tool
//!
//! Classifies local files, answers upload events, and inspects the
//! signature table and configuration.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use csvgate_detect::SignatureMatcher;
use csvgate_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "csvgate", version, about = "Decide whether uploaded files are CSV")]
struct Cli {
    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Detector config file (TOML)
    #[arg(long, global = true, env = "CSVGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Also append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a local file
    Classify {
        /// File to classify
        file: PathBuf,

        /// Filename to judge the upload by (defaults to the file's name)
        #[arg(long)]
        filename: Option<String>,

        /// Output the verdict as JSON
        #[arg(long)]
        json: bool,

        /// Exit with status 2 when the file is not a CSV
        #[arg(long)]
        require_csv: bool,
    },

    /// Answer an upload event (JSON with base64 file_content)
    Invoke {
        /// Event file, or - for stdin
        #[arg(default_value = "-")]
        event: PathBuf,
    },

    /// List the signature table in match order
    Signatures {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Classify { json, .. } => *json,
        Commands::Signatures { json } => *json,
        Commands::Invoke { .. } => true,
        Commands::Config => false,
    }
}

fn run_command(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.as_deref();
    let config = cli::config::load_config(config_path)?;

    match cli.command {
        Commands::Classify {
            file,
            filename,
            json,
            require_csv,
        } => {
            let classifier = cli::config::build_classifier(&config, config_path)?;
            cli::classify::run(
                cli::classify::ClassifyArgs {
                    file,
                    filename,
                    json,
                    require_csv,
                },
                &classifier,
            )
        }
        Commands::Invoke { event } => {
            let classifier = cli::config::build_classifier(&config, config_path)?;
            cli::invoke::run(cli::invoke::InvokeArgs { event }, &classifier)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Signatures { json } => {
            let table = config
                .build_table()
                .context("Failed to build signature table")?;
            let matcher = SignatureMatcher::new(Arc::new(table));
            cli::signatures::run(&matcher, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config => {
            cli::config::run(&config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    if let Err(err) = init_logging(LogConfig {
        app_name: "csvgate",
        verbose: cli.verbose,
        quiet: json_mode,
        log_file: cli.log_file.as_deref(),
    }) {
        eprintln!("Warning: failed to initialize logging: {:#}", err);
    }

    match run_command(cli) {
        Ok(code) => code,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
