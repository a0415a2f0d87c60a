//! CLI binary for doc2deck.
//!
//! A thin shim over the library crate: `convert` maps flags to
//! `ConversionOptions` + `ServiceConfig` and converts one file; `serve` runs
//! the HTTP service until Ctrl-C.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use doc2deck::{
    convert_file, server, AudienceLevel, ConversionError, ConversionOptions, DelegateConfig,
    JobId, JobProgressCallback, JobState, Orchestrator, ProgressCallback, ServiceConfig,
    TargetLength,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Renders the job's state machine as a 0–100 bar.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl JobProgressCallback for CliProgressCallback {
    fn on_job_received(&self, _job: JobId, filename: &str) {
        self.bar.set_message(filename.to_string());
    }

    fn on_state_change(&self, _job: JobId, state: JobState, progress: u8) {
        self.bar.set_position(u64::from(progress));
        self.bar.set_message(state.to_string());
    }

    fn on_job_complete(&self, _job: JobId, slide_count: usize) {
        self.bar
            .finish_with_message(format!("{} {slide_count} slides", green("✔")));
    }

    fn on_job_failed(&self, _job: JobId, error: &ConversionError) {
        self.bar
            .abandon_with_message(format!("{} {}", red("✘"), error.kind()));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a Word document next to the input
  doc2deck convert report.docx

  # Short deck for experts, with an appendix
  doc2deck convert notes.txt -o talk.pptx --audience expert --length short --appendix

  # Hand the whole job to an external converter
  doc2deck convert paper.pdf --delegate python3 --delegate-arg main.py

  # Run the HTTP service
  doc2deck serve --bind 0.0.0.0:8080 --storage-dir /var/tmp/doc2deck

ENVIRONMENT VARIABLES:
  DOC2DECK_BIND            Listen address for `serve`
  DOC2DECK_STORAGE_DIR     Storage root for uploads and decks
  DOC2DECK_MAX_UPLOAD_MB   Upload size limit in MiB
  DOC2DECK_RETENTION_SECS  How long finished decks stay downloadable
  DOC2DECK_DELEGATE        External converter program
  RUST_LOG                 Overrides --verbose / --quiet
"#;

/// Convert documents into slide decks.
#[derive(Parser, Debug)]
#[command(
    name = "doc2deck",
    version,
    about = "Convert text, PDF and Word documents into PowerPoint decks",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOC2DECK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOC2DECK_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert one local file.
    Convert(ConvertArgs),
    /// Run the HTTP conversion service.
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Document to convert (.txt, .pdf or .docx).
    input: PathBuf,

    /// Deck path. Default: the input path with a `.pptx` extension.
    #[arg(short, long, env = "DOC2DECK_OUTPUT")]
    output: Option<PathBuf>,

    /// Who the deck is for.
    #[arg(long, env = "DOC2DECK_AUDIENCE", value_enum, default_value = "general")]
    audience: AudienceArg,

    /// How long the deck should be.
    #[arg(long, env = "DOC2DECK_LENGTH", value_enum, default_value = "medium")]
    length: LengthArg,

    /// Skip the summary slide.
    #[arg(long)]
    no_summary: bool,

    /// Add an appendix slide for content that does not fit.
    #[arg(long)]
    appendix: bool,

    /// External converter run as `PROGRAM [ARGS…] <input> <output>`.
    #[arg(long, env = "DOC2DECK_DELEGATE")]
    delegate: Option<PathBuf>,

    /// Argument passed to the external converter before the file paths.
    #[arg(long = "delegate-arg", requires = "delegate", allow_hyphen_values = true)]
    delegate_args: Vec<String>,

    /// Wall-clock limit per stage in seconds.
    #[arg(long, env = "DOC2DECK_STAGE_TIMEOUT_SECS", default_value_t = 60)]
    stage_timeout_secs: u64,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Listen address.
    #[arg(long, env = "DOC2DECK_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Storage root for uploads and generated decks.
    #[arg(long, env = "DOC2DECK_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Upload size limit in MiB.
    #[arg(long, env = "DOC2DECK_MAX_UPLOAD_MB", default_value_t = 10,
          value_parser = clap::value_parser!(u64).range(1..=1024))]
    max_upload_mb: u64,

    /// How long a finished job stays retrievable, in seconds.
    #[arg(long, env = "DOC2DECK_RETENTION_SECS", default_value_t = 900)]
    retention_secs: u64,

    /// Wall-clock limit per stage in seconds.
    #[arg(long, env = "DOC2DECK_STAGE_TIMEOUT_SECS", default_value_t = 60)]
    stage_timeout_secs: u64,

    /// External converter run as `PROGRAM [ARGS…] <input> <output>`.
    #[arg(long, env = "DOC2DECK_DELEGATE")]
    delegate: Option<PathBuf>,

    /// Argument passed to the external converter before the file paths.
    #[arg(long = "delegate-arg", requires = "delegate", allow_hyphen_values = true)]
    delegate_args: Vec<String>,

    /// Most external converters running at once.
    #[arg(long, env = "DOC2DECK_MAX_DELEGATES", default_value_t = 4)]
    max_delegates: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AudienceArg {
    Novice,
    General,
    Expert,
}

impl From<AudienceArg> for AudienceLevel {
    fn from(v: AudienceArg) -> Self {
        match v {
            AudienceArg::Novice => AudienceLevel::Novice,
            AudienceArg::General => AudienceLevel::General,
            AudienceArg::Expert => AudienceLevel::Expert,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LengthArg {
    Short,
    Medium,
    Long,
}

impl From<LengthArg> for TargetLength {
    fn from(v: LengthArg) -> Self {
        match v {
            LengthArg::Short => TargetLength::Short,
            LengthArg::Medium => TargetLength::Medium,
            LengthArg::Long => TargetLength::Long,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs for `convert`; `serve` keeps them.
    let show_progress = !cli.quiet && matches!(cli.command, Command::Convert(_));
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Convert(args) => run_convert(args, show_progress, cli.quiet).await,
        Command::Serve(args) => run_serve(args).await,
    }
}

async fn run_convert(args: ConvertArgs, show_progress: bool, quiet: bool) -> Result<()> {
    let options = ConversionOptions {
        audience_level: args.audience.into(),
        target_length: args.length.into(),
        include_summary: !args.no_summary,
        include_appendix: args.appendix,
    };

    let mut builder =
        ServiceConfig::builder().stage_timeout(Duration::from_secs(args.stage_timeout_secs));
    if let Some(program) = args.delegate {
        builder = builder.delegate(delegate_config(program, args.delegate_args, 1));
    }
    if show_progress {
        builder = builder.progress_callback(CliProgressCallback::new() as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;

    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("pptx"));
    let deck = convert_file(&args.input, &output, options, &config)
        .await
        .context("Conversion failed")?;

    if !quiet {
        eprintln!(
            "{}  {} slides  →  {}",
            green("✔"),
            deck.slide_count,
            bold(&output.display().to_string()),
        );
    }
    Ok(())
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut builder = ServiceConfig::builder()
        .max_upload_bytes(mib_to_bytes(args.max_upload_mb)?)
        .retention(Duration::from_secs(args.retention_secs))
        .stage_timeout(Duration::from_secs(args.stage_timeout_secs));
    if let Some(dir) = args.storage_dir {
        builder = builder.storage_root(dir);
    }
    if let Some(program) = args.delegate {
        builder = builder.delegate(delegate_config(
            program,
            args.delegate_args,
            args.max_delegates,
        ));
    }
    let config = builder.build().context("Invalid configuration")?;
    info!("Storage root: {}", config.storage_root.display());

    let orchestrator = Orchestrator::new(config);
    let janitor = orchestrator.spawn_janitor();

    server::serve(args.bind, orchestrator.clone(), shutdown_signal())
        .await
        .with_context(|| format!("HTTP server on {} failed", args.bind))?;

    orchestrator.shutdown().await;
    let _ = janitor.await;
    Ok(())
}

fn mib_to_bytes(mib: u64) -> Result<u64> {
    mib.checked_mul(1024 * 1024)
        .with_context(|| format!("--max-upload-mb {mib} does not fit in a byte count"))
}

fn delegate_config(program: PathBuf, args: Vec<String>, max_concurrent: usize) -> DelegateConfig {
    args.into_iter()
        .fold(DelegateConfig::new(program), |d, a| d.arg(a))
        .max_concurrent(max_concurrent)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_limit_in_bytes() {
        assert_eq!(mib_to_bytes(10).unwrap(), 10 * 1024 * 1024);
        assert!(mib_to_bytes(u64::MAX).is_err());
    }

    #[test]
    fn cli_rejects_out_of_range_upload_limit() {
        let parsed = Cli::try_parse_from(["doc2deck", "serve", "--max-upload-mb", "99999999999999"]);
        assert!(parsed.is_err());
    }
}
