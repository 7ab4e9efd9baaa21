// crates/semspect-init-cli/src/main.rs
// ============================================================================
// Module: Semspect Init CLI Entry Point
// Description: Command dispatcher for semspect index batch runs.
// Purpose: Wire configuration, transport, and engine into one binary.
// Dependencies: clap, semspect-init-config, semspect-init-core, semspect-init-http
// ============================================================================

//! ## Overview
//! The CLI loads the configuration, builds the HTTP connector factory, runs
//! the batch, and maps the outcome onto process exit codes: 0 when every
//! target succeeded, 255 with a count and listing on partial failure, 1 on
//! fatal errors (configuration, connection acquisition). Diagnostics go to
//! stderr as JSON lines; result summaries go to stdout.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use semspect_init_config::ConnectionConfig;
use semspect_init_config::InitConfig;
use semspect_init_core::BatchReport;
use semspect_init_core::BatchRunner;
use semspect_init_core::DiagnosticLevel;
use semspect_init_core::JsonLineDiagnostics;
use semspect_init_http::HttpConnector;
use semspect_init_http::HttpConnectorConfig;
use thiserror::Error;

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

/// Exit code signaling that some targets failed while the batch completed.
const PARTIAL_FAILURE_EXIT_CODE: u8 = 255;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "semspect-init", version, about = "Initialize semspect indexes per user and database")]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every configured target against the graph database.
    Run(RunCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
struct RunCommand {
    /// Path to the configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Emit debug-level diagnostics.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

/// Supported config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration, then exit.
    Validate(ConfigValidateCommand),
}

/// Arguments for the `config validate` command.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Path to the configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: CLI Errors
// ============================================================================

/// CLI error carrying a printable message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Message shown on stderr before exiting.
    message: String,
}

impl CliError {
    /// Creates a CLI error from a printable message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(command) => command_run(&command),
        Commands::Config {
            command,
        } => {
            let ConfigCommand::Validate(command) = command;
            command_config_validate(&command)
        }
    }
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let config = InitConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    let password =
        config.connection.resolve_password().map_err(|err| CliError::new(err.to_string()))?;
    let connector_config = connector_config(&config.connection, password);
    let min_level = if command.verbose {
        DiagnosticLevel::Debug
    } else {
        DiagnosticLevel::Info
    };
    let diagnostics = Arc::new(JsonLineDiagnostics::with_min_level(io::stderr(), min_level));
    let runner = BatchRunner::new(diagnostics);
    let report = runner
        .run_all(|| HttpConnector::new(connector_config).map_err(Into::into), &config.targets)
        .map_err(|err| CliError::new(err.to_string()))?;
    report_outcome(&report)
}

/// Maps connection settings onto the HTTP connector configuration.
fn connector_config(connection: &ConnectionConfig, password: String) -> HttpConnectorConfig {
    HttpConnectorConfig {
        base_url: connection.uri.clone(),
        username: connection.username.clone(),
        password,
        allow_http: connection.allow_http,
        timeout_ms: connection.timeout_ms,
        max_response_bytes: connection.max_response_bytes,
        ..HttpConnectorConfig::default()
    }
}

/// Maps a batch report onto output lines and an exit code.
fn report_outcome(report: &BatchReport) -> CliResult<ExitCode> {
    if report.is_success() {
        write_stdout_line("all targets succeeded")
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    let summary = failure_summary(report)?;
    write_stderr_line(&summary).map_err(|err| CliError::new(output_error("stderr", &err)))?;
    Ok(ExitCode::from(outcome_code(report)))
}

/// Returns the exit code value for a batch report.
fn outcome_code(report: &BatchReport) -> u8 {
    if report.is_success() {
        0
    } else {
        PARTIAL_FAILURE_EXIT_CODE
    }
}

/// Formats the failure summary line for a partially failed batch.
fn failure_summary(report: &BatchReport) -> CliResult<String> {
    let listing = serde_json::to_string(report.failed())
        .map_err(|err| CliError::new(format!("report serialization failed: {err}")))?;
    Ok(format!("{} targets failed: {listing}", report.failure_count()))
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Executes the `config validate` command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = InitConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    write_stdout_line(&format!("config ok: {} targets", config.targets.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> io::Result<()> {
    let mut stderr = io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits a fatal error and returns the failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
