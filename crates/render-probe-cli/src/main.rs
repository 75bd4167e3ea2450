// crates/render-probe-cli/src/main.rs
// ============================================================================
// Module: Render Probe CLI Entry Point
// Description: Command dispatcher for conformance runs against worker bundles.
// Purpose: Provide a safe CLI surface over the harness with strict exit codes.
// Dependencies: clap, render-probe-{core,config,suite,fixture}, tokio, serde_json
// ============================================================================

//! ## Overview
//! The render-probe CLI provisions one endpoint per run, drives the built-in
//! probe battery against it, and reports every probe's outcome. Exit code
//! zero means every probe passed; any failure, error, or provisioning problem
//! yields a non-zero exit so the harness composes with automated runners.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use render_probe_config::FixtureKind;
use render_probe_config::HarnessConfig;
use render_probe_core::ConformanceReport;
use render_probe_core::ConformanceRunner;
use render_probe_core::FileAuditSink;
use render_probe_core::FixtureAuditEvent;
use render_probe_core::FixtureProvisioner;
use render_probe_core::NoopAuditSink;
use render_probe_core::Probe;
use render_probe_core::ProbeCatalog;
use render_probe_core::RunAuditSink;
use render_probe_core::RunStatus;
use render_probe_core::RunnerConfig;
use render_probe_core::StderrAuditSink;
use render_probe_fixture::ProcessProvisioner;
use render_probe_fixture::ProcessSpec;
use render_probe_fixture::RemoteProvisioner;
use render_probe_fixture::SimProvisioner;
use render_probe_suite::builtin_catalog;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "render-probe", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Provision an endpoint and run the conformance battery.
    Run(RunCommand),
    /// List the built-in probes in battery order.
    List(ListCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for the `run` command.
#[derive(clap::Args, Debug)]
struct RunCommand {
    /// Path to the harness configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Attach to a running deployment instead of the configured fixture.
    #[arg(long, value_name = "URL")]
    attach: Option<String>,
    /// Run only the named probes (repeatable); unknown names are an error.
    #[arg(long = "probe", value_name = "NAME")]
    probes: Vec<String>,
    /// Report output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for the `list` command.
#[derive(clap::Args, Debug)]
struct ListCommand {
    /// Listing output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a configuration file.
    Validate {
        /// Path to the harness configuration file.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

/// Output formats for reports and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable lines.
    Text,
    /// Machine-readable JSON.
    Json,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying one user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(command) => command_run(command).await,
        Commands::List(command) => command_list(&command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let config = HarnessConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    let catalog =
        builtin_catalog().map_err(|err| CliError::new(format!("battery init failed: {err}")))?;
    let probes = select_probes(&catalog, &command.probes)?;
    let audit = build_audit_sink(&config)?;
    let runner_config = RunnerConfig {
        probe_timeout: Duration::from_millis(config.harness.probe_timeout_ms),
        max_concurrency: config.harness.max_concurrency,
        capture_body_bytes: config.harness.capture_body_bytes,
        ..RunnerConfig::default()
    };
    let runner = ConformanceRunner::with_audit(runner_config, Arc::clone(&audit))
        .map_err(|err| CliError::new(format!("runner init failed: {err}")))?;
    let provisioner = build_provisioner(&config, command.attach)?;
    let acquire_started = Instant::now();
    let fixture = provisioner
        .acquire()
        .await
        .map_err(|err| CliError::new(format!("fixture provisioning failed: {err}")))?;
    audit.record_fixture(&FixtureAuditEvent::new(
        provisioner.kind(),
        fixture.endpoint().base_url().to_string(),
        u64::try_from(acquire_started.elapsed().as_millis()).unwrap_or(u64::MAX),
    ));
    let endpoint = fixture.endpoint().clone();
    let report = runner.run(&endpoint, &probes).await;
    fixture
        .shutdown()
        .await
        .map_err(|err| CliError::new(format!("fixture teardown failed: {err}")))?;
    let rendered = match command.format {
        OutputFormat::Text => render_report_text(&report),
        OutputFormat::Json => render_report_json(&report)?,
    };
    write_stdout_bytes(rendered.as_bytes())
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))?;
    Ok(exit_code_for(report.status()))
}

/// Selects probes by name in catalog order; empty selection means all.
fn select_probes(catalog: &ProbeCatalog, requested: &[String]) -> CliResult<Vec<Probe>> {
    if requested.is_empty() {
        return Ok(catalog.all().to_vec());
    }
    for name in requested {
        if catalog.get(name).is_none() {
            return Err(CliError::new(format!("unknown probe: {name}")));
        }
    }
    Ok(catalog
        .all()
        .iter()
        .filter(|probe| requested.iter().any(|name| name == probe.name.as_str()))
        .cloned()
        .collect())
}

/// Builds the audit sink declared by the configuration.
fn build_audit_sink(config: &HarnessConfig) -> CliResult<Arc<dyn RunAuditSink>> {
    if !config.harness.audit.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.harness.audit.path {
        Some(path) => {
            let sink = FileAuditSink::new(path)
                .map_err(|err| CliError::new(format!("audit file open failed: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

/// Builds the fixture provisioner for this run.
///
/// An explicit `--attach` URL forces remote attachment regardless of the
/// configured fixture kind.
fn build_provisioner(
    config: &HarnessConfig,
    attach: Option<String>,
) -> CliResult<Box<dyn FixtureProvisioner>> {
    let startup_timeout = Duration::from_millis(config.harness.startup_timeout_ms);
    if let Some(base_url) = attach {
        return Ok(Box::new(RemoteProvisioner::with_readiness(base_url, startup_timeout)));
    }
    match config.harness.fixture {
        FixtureKind::Process => {
            let script = config
                .bundle
                .script
                .clone()
                .ok_or_else(|| CliError::new("process fixture requires bundle.script".to_string()))?;
            Ok(Box::new(ProcessProvisioner::new(ProcessSpec {
                command: config.runtime.command.clone(),
                env: config.runtime.env.clone(),
                script,
                assets: config.bundle.assets.clone(),
                startup_timeout,
            })))
        }
        FixtureKind::Remote => {
            let base_url = config
                .harness
                .base_url
                .clone()
                .ok_or_else(|| CliError::new("remote fixture requires harness.base_url".to_string()))?;
            Ok(Box::new(RemoteProvisioner::with_readiness(base_url, startup_timeout)))
        }
        FixtureKind::Sim => Ok(Box::new(SimProvisioner::conformant())),
    }
}

/// Maps the aggregate run status onto the process exit code.
const fn exit_code_for(status: RunStatus) -> ExitCode {
    match status {
        RunStatus::Pass => ExitCode::SUCCESS,
        RunStatus::Fail => ExitCode::FAILURE,
    }
}

// ============================================================================
// SECTION: List Command
// ============================================================================

/// Executes the `list` command.
fn command_list(command: &ListCommand) -> CliResult<ExitCode> {
    let catalog =
        builtin_catalog().map_err(|err| CliError::new(format!("battery init failed: {err}")))?;
    let rendered = match command.format {
        OutputFormat::Text => {
            let mut output = String::new();
            for probe in catalog.all() {
                output.push_str(&format!("{}  {}\n", probe.name, probe.summary));
            }
            output
        }
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = catalog
                .all()
                .iter()
                .map(|probe| {
                    serde_json::json!({
                        "name": probe.name.as_str(),
                        "summary": probe.summary,
                    })
                })
                .collect();
            let mut payload = serde_json::to_string_pretty(&entries)
                .map_err(|err| CliError::new(format!("listing serialization failed: {err}")))?;
            payload.push('\n');
            payload
        }
    };
    write_stdout_bytes(rendered.as_bytes())
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Executes the `config` subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate {
            config,
        } => {
            HarnessConfig::load(config.as_deref())
                .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
            write_stdout_bytes(b"configuration valid\n")
                .map_err(|err| CliError::new(format!("stdout write failed: {err}")))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Report Rendering
// ============================================================================

/// Renders the report as one line per probe plus a summary line.
fn render_report_text(report: &ConformanceReport) -> String {
    let mut output = String::new();
    for result in report.results() {
        let label = result.outcome.label().to_uppercase();
        match result.outcome.detail() {
            Some(detail) => {
                output.push_str(&format!(
                    "{label:5} {} ({}ms): {detail}\n",
                    result.name, result.elapsed_ms
                ));
            }
            None => {
                output
                    .push_str(&format!("{label:5} {} ({}ms)\n", result.name, result.elapsed_ms));
            }
        }
    }
    let summary = report.summary();
    output.push_str(&format!(
        "summary: total={} passed={} failed={} errored={} status={}\n",
        summary.total,
        summary.passed,
        summary.failed,
        summary.errored,
        report.status()
    ));
    output
}

/// Renders the report as pretty-printed JSON.
fn render_report_json(report: &ConformanceReport) -> CliResult<String> {
    let mut payload = serde_json::to_string_pretty(report)
        .map_err(|err| CliError::new(format!("report serialization failed: {err}")))?;
    payload.push('\n');
    Ok(payload)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes raw bytes to stdout.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)?;
    stdout.flush()
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(&format!("error: {message}"));
    ExitCode::FAILURE
}
