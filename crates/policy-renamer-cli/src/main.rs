mod logging;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use policy_renamer::{
    load_config, validate_config, Config, RenameSession, SessionConfig, UploadedFile,
};

use logging::LogFormat;
use report::ReportFormat;

/// Exit code when the archive could not be built or saved.
const EXIT_ARCHIVE_FAILED: u8 = 1;
/// Exit code when none of the given files could be read.
const EXIT_NO_INPUT: u8 = 2;

#[derive(Parser)]
#[command(name = "policy-renamer")]
#[command(about = "Renames insurance policy PDFs after the policy named on their first page")]
#[command(version)]
struct Args {
    /// PDF files to process, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the archive is saved to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// File name of the archive
    #[arg(long)]
    archive_name: Option<String>,

    /// Pause between two files, in milliseconds
    #[arg(long)]
    throttle_ms: Option<u64>,

    /// Ignore files without a .pdf extension
    #[arg(long)]
    only_pdf: bool,

    /// Process and report only, without building an archive
    #[arg(long)]
    no_archive: bool,

    /// Format of the final report on stdout
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Table)]
    report: ReportFormat,

    /// Log filter directive, e.g. `debug` or `policy_renamer=trace`
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

/// Loads the config file, if any, and applies command-line overrides.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(dir) = &args.output_dir {
        config.output_directory = dir.to_string_lossy().into_owned();
    }
    if let Some(name) = &args.archive_name {
        config.archive_name = name.clone();
    }
    if let Some(ms) = args.throttle_ms {
        config.throttle_ms = ms;
    }

    validate_config(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Reads the given paths. Unreadable files are logged and counted.
fn read_files(paths: &[PathBuf], only_pdf: bool) -> (Vec<UploadedFile>, usize) {
    let mut files = Vec::with_capacity(paths.len());
    let mut unreadable = 0;

    for path in paths {
        match UploadedFile::from_path(path) {
            Ok(file) if only_pdf && !file.has_pdf_extension() => {
                info!("Skipping non-PDF file {}", file.name);
            }
            Ok(file) => files.push(file),
            Err(e) => {
                warn!("{}", e);
                unreadable += 1;
            }
        }
    }

    (files, unreadable)
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = resolve_config(&args)?;

    let (files, unreadable) = read_files(&args.files, args.only_pdf);
    if files.is_empty() {
        error!("No files to process ({} could not be read)", unreadable);
        return Ok(ExitCode::from(EXIT_NO_INPUT));
    }

    let mut builder = RenameSession::builder(SessionConfig::from_config(&config));
    if args.no_archive {
        builder = builder.without_archive();
    }
    let session = builder.start();

    session.add_files(files)?;
    session.wait_settled().await;

    let rendered = report::render(args.report, &session.snapshot(), &session.summary())
        .context("Failed to render report")?;
    print!("{}", rendered);

    let mut code = ExitCode::SUCCESS;
    if session.has_archive_support() {
        if session.can_download() {
            match session.download().await {
                Ok(path) => info!("Archive saved to {}", path.display()),
                Err(e) => {
                    error!("Could not create archive: {}", e);
                    code = ExitCode::from(EXIT_ARCHIVE_FAILED);
                }
            }
        } else {
            warn!("No file was processed successfully, no archive created");
        }
    }

    session.shutdown().await;
    Ok(code)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init(args.log_level.as_deref(), args.log_format) {
        eprintln!("Failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
