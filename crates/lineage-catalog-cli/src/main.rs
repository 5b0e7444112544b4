// crates/lineage-catalog-cli/src/main.rs
// ============================================================================
// Module: Lineage Catalog CLI Entry Point
// Description: Command dispatcher for lineage ingestion and catalog inspection.
// Purpose: Ingest event files and browse the catalog from the command line.
// Dependencies: clap, lineage-catalog-config, lineage-catalog-core, lineage-catalog-store-sqlite
// ============================================================================

//! ## Overview
//! The `lineage-catalog` binary loads `lineage-catalog.toml`, opens the
//! configured store, and runs one command. `ingest` applies every event in a
//! file as its own transaction and reports each outcome; the read commands
//! print catalog projections as pretty JSON on stdout. Errors go to stderr
//! and produce a non-zero exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub(crate) mod input;
#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use lineage_catalog_config::LineageCatalogConfig;
use lineage_catalog_config::StoreType;
use lineage_catalog_core::AuditRequestId;
use lineage_catalog_core::CatalogError;
use lineage_catalog_core::CatalogQueries;
use lineage_catalog_core::CatalogStore;
use lineage_catalog_core::DatasetId;
use lineage_catalog_core::DatasetVersionId;
use lineage_catalog_core::ExternalRunId;
use lineage_catalog_core::InMemoryCatalogStore;
use lineage_catalog_core::IngestReceipt;
use lineage_catalog_core::JobId;
use lineage_catalog_core::JobVersionId;
use lineage_catalog_core::LineageIngestor;
use lineage_catalog_core::Run;
use lineage_catalog_core::RunId;
use lineage_catalog_core::Timestamp;
use lineage_catalog_store_sqlite::SqliteCatalogStore;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of an event file accepted by `ingest`.
const MAX_INGEST_FILE_BYTES: usize = 64 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "lineage-catalog", version, disable_help_subcommand = true)]
struct Cli {
    /// Optional config file path (defaults to lineage-catalog.toml or env override).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Commands that open the catalog store.
    #[command(flatten)]
    Catalog(CatalogCommand),
}

/// Subcommands that operate on the catalog.
#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Ingest lineage events from a file.
    Ingest(IngestCommand),
    /// Job inspection.
    Jobs {
        /// Selected jobs subcommand.
        #[command(subcommand)]
        command: JobsCommand,
    },
    /// Dataset inspection.
    Datasets {
        /// Selected datasets subcommand.
        #[command(subcommand)]
        command: DatasetsCommand,
    },
    /// Run inspection.
    Runs {
        /// Selected runs subcommand.
        #[command(subcommand)]
        command: RunsCommand,
    },
    /// Raw request audit log inspection.
    Requests {
        /// Selected requests subcommand.
        #[command(subcommand)]
        command: RequestsCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a lineage catalog configuration file.
    Validate,
}

/// Arguments for the `ingest` command.
#[derive(Args, Debug)]
struct IngestCommand {
    /// Event file: a JSON array, a single event, or newline-delimited JSON.
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

/// Jobs subcommands.
#[derive(Subcommand, Debug)]
enum JobsCommand {
    /// List every job.
    List,
    /// Show one job.
    Show(IdArg),
    /// List the versions of a job.
    Versions(IdArg),
    /// List the runs of a job version.
    Runs(IdArg),
}

/// Datasets subcommands.
#[derive(Subcommand, Debug)]
enum DatasetsCommand {
    /// List every dataset.
    List,
    /// Show one dataset.
    Show(IdArg),
    /// List the versions of a dataset.
    Versions(IdArg),
    /// List the fields of a dataset version.
    Fields(IdArg),
    /// Show the latest facets recorded for a dataset version.
    Facets(IdArg),
}

/// Runs subcommands.
#[derive(Subcommand, Debug)]
enum RunsCommand {
    /// Show one run.
    Show(RunArg),
    /// List the events of a run.
    Events(RunArg),
    /// List the dataset edges of a run.
    Edges(RunArg),
}

/// Requests subcommands.
#[derive(Subcommand, Debug)]
enum RequestsCommand {
    /// List every stored request.
    List,
}

/// Numeric catalog identifier argument.
#[derive(Args, Debug)]
struct IdArg {
    /// Catalog identifier.
    #[arg(value_name = "ID")]
    id: u64,
}

/// Run selector argument.
#[derive(Args, Debug)]
struct RunArg {
    /// Catalog run id or external run UUID.
    #[arg(value_name = "RUN")]
    run: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        Self::new(format!("{} error: {err}", err.kind()))
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
        Commands::Config {
            command,
        } => command_config(&command, cli.config.as_deref()),
        Commands::Catalog(command) => {
            let config = LineageCatalogConfig::load_or_default(cli.config.as_deref())
                .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
            match config.store.store_type {
                StoreType::Sqlite => {
                    let store = SqliteCatalogStore::new(config.store.sqlite_config())
                        .map_err(|err| CliError::new(format!("store open failed: {err}")))?;
                    command_catalog(store, &config, command)
                }
                StoreType::Memory => {
                    command_catalog(InMemoryCatalogStore::default(), &config, command)
                }
            }
        }
    }
}

/// Builds the ingestor over `store` and runs a catalog command.
fn command_catalog<S: CatalogStore>(
    store: S,
    config: &LineageCatalogConfig,
    command: CatalogCommand,
) -> CliResult<ExitCode> {
    let sink = config
        .logging
        .build_sink()
        .map_err(|err| CliError::new(format!("logging setup failed: {err}")))?;
    let ingestor = LineageIngestor::new(store, config.ingest)?.with_log_sink(sink);
    let queries = ingestor.queries();
    match command {
        CatalogCommand::Ingest(command) => command_ingest(&ingestor, &command),
        CatalogCommand::Jobs {
            command,
        } => command_jobs(&queries, &command),
        CatalogCommand::Datasets {
            command,
        } => command_datasets(&queries, &command),
        CatalogCommand::Runs {
            command,
        } => command_runs(&queries, &command),
        CatalogCommand::Requests {
            command: RequestsCommand::List,
        } => command_requests_list(&queries),
    }
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Executes the config subcommands.
fn command_config(command: &ConfigCommand, path: Option<&Path>) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => {
            let _config = LineageCatalogConfig::load(path)
                .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
            write_stdout_line("Config valid.")
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Ingest Command
// ============================================================================

/// Outcome of one event in an ingest file.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum EventOutcome {
    /// The event committed.
    Committed {
        /// Zero-based position in the file.
        index: usize,
        /// Engine receipt.
        receipt: IngestReceipt,
    },
    /// The event was rejected and rolled back.
    Failed {
        /// Zero-based position in the file.
        index: usize,
        /// Stable error label.
        error_kind: &'static str,
        /// Error message.
        error: String,
    },
}

/// Summary printed by the `ingest` command.
#[derive(Debug, Default, Serialize)]
struct IngestReport {
    /// Number of committed events.
    committed: usize,
    /// Number of failed events.
    failed: usize,
    /// Per-event outcomes in file order.
    events: Vec<EventOutcome>,
}

/// Executes the `ingest` command.
fn command_ingest<S: CatalogStore>(
    ingestor: &LineageIngestor<S>,
    command: &IngestCommand,
) -> CliResult<ExitCode> {
    let bytes = read_bytes_with_limit(&command.file, MAX_INGEST_FILE_BYTES)
        .map_err(|err| CliError::new(read_error(&command.file, &err)))?;
    let payloads = input::split_events(&bytes)
        .map_err(|err| CliError::new(format!("{}: {err}", command.file.display())))?;
    let mut report = IngestReport::default();
    for (index, payload) in payloads.into_iter().enumerate() {
        match ingestor.ingest_payload(payload) {
            Ok(receipt) => {
                report.committed += 1;
                report.events.push(EventOutcome::Committed {
                    index,
                    receipt,
                });
            }
            Err(err) => {
                report.failed += 1;
                report.events.push(EventOutcome::Failed {
                    index,
                    error_kind: err.kind(),
                    error: err.to_string(),
                });
            }
        }
    }
    write_json(&report)?;
    if report.failed == 0 { Ok(ExitCode::SUCCESS) } else { Ok(ExitCode::FAILURE) }
}

// ============================================================================
// SECTION: Read Commands
// ============================================================================

/// Executes the jobs subcommands.
fn command_jobs<S: CatalogStore>(
    queries: &CatalogQueries<'_, S>,
    command: &JobsCommand,
) -> CliResult<ExitCode> {
    match command {
        JobsCommand::List => write_json(&queries.list_jobs()?)?,
        JobsCommand::Show(arg) => write_json(&queries.get_job(surrogate(arg, JobId::from_raw)?)?)?,
        JobsCommand::Versions(arg) => {
            write_json(&queries.list_job_versions(surrogate(arg, JobId::from_raw)?)?)?;
        }
        JobsCommand::Runs(arg) => {
            let id = surrogate(arg, JobVersionId::from_raw)?;
            write_json(&queries.list_runs_for_job_version(id)?)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the datasets subcommands.
fn command_datasets<S: CatalogStore>(
    queries: &CatalogQueries<'_, S>,
    command: &DatasetsCommand,
) -> CliResult<ExitCode> {
    match command {
        DatasetsCommand::List => write_json(&queries.list_datasets()?)?,
        DatasetsCommand::Show(arg) => {
            write_json(&queries.get_dataset(surrogate(arg, DatasetId::from_raw)?)?)?;
        }
        DatasetsCommand::Versions(arg) => {
            write_json(&queries.list_dataset_versions(surrogate(arg, DatasetId::from_raw)?)?)?;
        }
        DatasetsCommand::Fields(arg) => {
            write_json(&queries.list_fields(surrogate(arg, DatasetVersionId::from_raw)?)?)?;
        }
        DatasetsCommand::Facets(arg) => {
            let id = surrogate(arg, DatasetVersionId::from_raw)?;
            write_json(&queries.latest_dataset_facets(id)?)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the runs subcommands.
fn command_runs<S: CatalogStore>(
    queries: &CatalogQueries<'_, S>,
    command: &RunsCommand,
) -> CliResult<ExitCode> {
    match command {
        RunsCommand::Show(arg) => write_json(&resolve_run(queries, arg)?)?,
        RunsCommand::Events(arg) => {
            let run = resolve_run(queries, arg)?;
            write_json(&queries.list_run_events(run.id)?)?;
        }
        RunsCommand::Edges(arg) => {
            let run = resolve_run(queries, arg)?;
            write_json(&queries.list_run_edges(run.id)?)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Audit request rendered with its payload as text.
#[derive(Debug, Serialize)]
struct RequestView {
    /// Request id.
    id: AuditRequestId,
    /// Receipt time.
    created_at: Timestamp,
    /// Stored payload, lossily decoded as UTF-8.
    payload: String,
}

/// Executes `requests list`.
fn command_requests_list<S: CatalogStore>(queries: &CatalogQueries<'_, S>) -> CliResult<ExitCode> {
    let requests: Vec<RequestView> = queries
        .list_audit_requests()?
        .into_iter()
        .map(|request| RequestView {
            id: request.id,
            created_at: request.created_at,
            payload: String::from_utf8_lossy(&request.payload).into_owned(),
        })
        .collect();
    write_json(&requests)?;
    Ok(ExitCode::SUCCESS)
}

/// Converts a numeric argument into a surrogate id.
fn surrogate<T>(arg: &IdArg, from_raw: fn(u64) -> Option<T>) -> CliResult<T> {
    from_raw(arg.id).ok_or_else(|| CliError::new("id must be greater than zero".to_string()))
}

/// Resolves a run by catalog id or external UUID.
fn resolve_run<S: CatalogStore>(queries: &CatalogQueries<'_, S>, arg: &RunArg) -> CliResult<Run> {
    if let Ok(raw) = arg.run.parse::<u64>() {
        let id = RunId::from_raw(raw)
            .ok_or_else(|| CliError::new("id must be greater than zero".to_string()))?;
        return Ok(queries.get_run(id)?);
    }
    let external = ExternalRunId::parse(&arg.run)?;
    Ok(queries.get_run_by_external_id(&external)?)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Formats a bounded read failure.
fn read_error(path: &Path, error: &ReadLimitError) -> String {
    match error {
        ReadLimitError::Io(err) => format!("failed to read {}: {err}", path.display()),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => format!("{} is {size} bytes; limit is {limit} bytes", path.display()),
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a value to stdout as pretty JSON.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to render output: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
