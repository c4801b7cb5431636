//! arksh CLI entry point.
//!
//! Usage:
//!   arksh                          # Interactive REPL (archive from config)
//!   arksh --archive disk.zip       # Interactive REPL over disk.zip
//!   arksh --config arksh.toml      # Use a specific config file
//!   arksh --archive disk.zip -c ls # Execute command and exit

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use arksh_kernel::KernelConfig;

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

/// Parsed command line.
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    archive: Option<PathBuf>,
    command: Option<String>,
}

enum Action {
    Run(Args),
    Help,
    Version,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Action> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Action::Help),
            "--version" | "-V" => return Ok(Action::Version),
            "--config" => {
                let path = args.next().context("--config requires a file path")?;
                parsed.config = Some(path.into());
            }
            "--archive" => {
                let path = args.next().context("--archive requires a zip path")?;
                parsed.archive = Some(path.into());
            }
            "-c" => {
                parsed.command = Some(args.next().context("-c requires a command argument")?);
            }
            _ => {
                if let Some(path) = arg.strip_prefix("--config=") {
                    parsed.config = Some(path.into());
                } else if let Some(path) = arg.strip_prefix("--archive=") {
                    parsed.archive = Some(path.into());
                } else {
                    bail!("Unknown option: {arg}\nRun 'arksh --help' for usage.");
                }
            }
        }
    }
    Ok(Action::Run(parsed))
}

/// Build the kernel config from the config file and `--archive`.
fn load_config(args: &Args) -> Result<KernelConfig> {
    let from_file = match &args.config {
        Some(path) => Some(KernelConfig::load_from(path)?),
        None => KernelConfig::load()?,
    };

    match (from_file, &args.archive) {
        (Some(config), Some(archive)) => Ok(config.with_vfs_path(archive)),
        (Some(config), None) => Ok(config),
        (None, Some(archive)) => Ok(KernelConfig::new(archive)),
        (None, None) => bail!(
            "No archive given. Pass --archive <zip> or set vfs_path in {}",
            arksh_kernel::paths::config_file().display()
        ),
    }
}

fn run() -> Result<ExitCode> {
    let args = match parse_args(env::args().skip(1))? {
        Action::Help => {
            print_help();
            return Ok(ExitCode::SUCCESS);
        }
        Action::Version => {
            println!(
                "arksh {} ({} {})",
                env!("CARGO_PKG_VERSION"),
                env!("ARKSH_GIT_HASH"),
                env!("ARKSH_BUILD_DATE")
            );
            return Ok(ExitCode::SUCCESS);
        }
        Action::Run(args) => args,
    };

    let config = load_config(&args)?;

    match args.command {
        Some(cmd) => {
            let result = arksh_repl::run_command(config, &cmd)?;
            if !result.out.is_empty() {
                println!("{}", result.out);
            }
            if !result.err.is_empty() {
                eprintln!("{}", result.err);
            }
            Ok(ExitCode::from(result.code.clamp(0, 255) as u8))
        }
        None => {
            arksh_repl::run(config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_help() {
    println!(
        r#"arksh v{}

Usage:
  arksh [OPTIONS]              Interactive shell over a zip archive
  arksh [OPTIONS] -c <command> Execute command and exit

Options:
  --archive <zip>              Archive to open (overrides vfs_path)
  --config <file>              Config file (default: {})
  -c <command>                 Execute command string and exit
  -h, --help                   Show this help
  -V, --version                Show version

Commands:
{}

Examples:
  arksh --archive disk.zip                 # Start interactive shell
  arksh --archive disk.zip -c 'tac a.txt'  # Print a file reversed
  RUST_LOG=arksh_kernel=debug arksh        # Trace dispatch and archive rewrites
"#,
        env!("CARGO_PKG_VERSION"),
        arksh_kernel::paths::config_file().display(),
        arksh_kernel::dispatch::help_text()
    );
}
