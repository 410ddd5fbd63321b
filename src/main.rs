//! sharesize - folder size calculator for SharePoint document libraries.
//!
//! Usage:
//!   sharesize --tenant-id T --client-id C --site-url URL [--folder-path PATH]
//!
//! The client secret is taken from `--client-secret` or `CLIENT_SECRET`.
//! Results are written to `folder_sizes.csv` and `folder_sizes.json` unless
//! other paths are given.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Context, Result};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sharesize_core::{FolderTree, TraversalConfig, TraversalError};
use sharesize_graph::{GraphClient, GraphConfig, normalize_folder_path};
use sharesize_report::{ReportAssembler, write_csv, write_json};
use sharesize_scan::{RetryPolicy, TraversalEngine, TraversalProgress};

/// Exit status after SIGINT/SIGTERM.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(
    name = "sharesize",
    version,
    about = "Calculate folder sizes in a SharePoint document library",
    long_about = "sharesize walks a folder of a SharePoint document library through \
                  the Microsoft Graph API, aggregates sizes bottom-up and writes a \
                  CSV and a JSON report."
)]
struct Cli {
    /// Directory (tenant) id
    #[arg(long)]
    tenant_id: String,

    /// Application (client) id
    #[arg(long)]
    client_id: String,

    /// Application secret
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Site URL, e.g. https://contoso.sharepoint.com/sites/Team
    #[arg(long)]
    site_url: String,

    /// Folder to analyze (defaults to the library root)
    #[arg(long, default_value = "")]
    folder_path: String,

    /// CSV report path
    #[arg(long, default_value = "folder_sizes.csv")]
    output_csv: PathBuf,

    /// JSON report path
    #[arg(long, default_value = "folder_sizes.json")]
    output_json: PathBuf,

    /// Maximum number of folders listed at once
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Attempts per request before a folder is given up on
    #[arg(long, default_value_t = 4)]
    max_attempts: u32,

    /// Number of largest files to show
    #[arg(short = 'n', long, default_value_t = 10)]
    top: usize,

    /// Also count system folders and files (`_catalogs`, `Forms`, ...)
    #[arg(long)]
    include_system: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    run(cli).await
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let traversal = TraversalConfig::builder()
        .root(normalize_folder_path(&cli.folder_path))
        .concurrency(cli.concurrency)
        .max_attempts(cli.max_attempts)
        .top_n(cli.top)
        .exclude_system(!cli.include_system)
        .build()
        .context("Invalid traversal settings")?;

    let graph = GraphConfig::builder()
        .tenant_id(cli.tenant_id.as_str())
        .client_id(cli.client_id.as_str())
        .client_secret(cli.client_secret.as_str())
        .site_url(cli.site_url.as_str())
        .build()
        .context("Invalid connection settings")?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    eprintln!("Connecting to {}...", graph.site_url);
    let policy = RetryPolicy::from_config(&traversal);
    let client = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(interrupted()),
        client = GraphClient::connect(&graph, &policy) => {
            client.context("Failed to connect to SharePoint")?
        }
    };

    eprintln!(
        "Scanning {} in {} / {}...",
        display_root(&traversal.root),
        client.site_name(),
        client.drive_name()
    );

    let engine = TraversalEngine::new(client, traversal).with_cancellation(cancel);
    let progress = spawn_progress(engine.subscribe());
    let result = engine.run().await;
    progress.abort();
    eprintln!();

    let tree = match result {
        Ok(tree) => tree,
        Err(TraversalError::Interrupted) => return Ok(interrupted()),
        Err(err) => return Err(err).context("Scan failed"),
    };

    print_summary(&tree);

    if export(&tree, &cli.output_csv, &cli.output_json) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Cancel `token` on Ctrl-C or SIGTERM.
async fn cancel_on_signal(token: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("Shutdown requested");
    eprintln!("\nInterrupted, waiting for in-flight requests...");
    token.cancel();
}

fn interrupted() -> ExitCode {
    eprintln!("Scan interrupted; no reports written.");
    ExitCode::from(EXIT_INTERRUPTED)
}

/// Print a running count to stderr as folders complete.
fn spawn_progress(mut rx: broadcast::Receiver<TraversalProgress>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(progress) if progress.is_terminal() => {
                    eprint!(
                        "\r Scanned {} folders, {} files ({})",
                        progress.folders_done,
                        progress.files_seen,
                        format_size(progress.bytes_seen)
                    );
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn print_summary(tree: &FolderTree) {
    println!();
    println!("{}", "─".repeat(60));
    println!(
        " {} - {}",
        display_root(&tree.root.path),
        format_size(tree.total_size())
    );
    println!(
        " {} files, {} folders",
        tree.total_files(),
        tree.total_folders()
    );
    println!(" Scanned in {:.2}s", tree.scan_duration.as_secs_f64());
    println!("{}", "─".repeat(60));

    if !tree.top_files.is_empty() {
        println!();
        println!(" Largest files:");
        for (i, file) in tree.top_files.iter().enumerate() {
            println!("  {:>3}. {:>10}  {}", i + 1, format_size(file.size), file.path);
        }
    }

    println!();
    if tree.warnings.is_empty() {
        println!(" No warnings.");
    } else {
        println!(" {} warning(s):", tree.warnings.len());
        for warning in &tree.warnings {
            println!("   {} - {}", display_root(&warning.path), warning.reason);
        }
    }
    println!();
}

/// Write both reports. A failing sink does not stop the other one.
fn export(tree: &FolderTree, csv_path: &Path, json_path: &Path) -> bool {
    let rows = ReportAssembler::new().flatten(&tree.root);
    let mut ok = true;

    match write_csv(&rows, csv_path) {
        Ok(()) => println!(" CSV report:  {}", csv_path.display()),
        Err(err) => {
            error!(error = %err, "CSV export failed");
            eprintln!("Error: {err}");
            ok = false;
        }
    }

    match write_json(&tree.root, json_path) {
        Ok(()) => println!(" JSON report: {}", json_path.display()),
        Err(err) => {
            error!(error = %err, "JSON export failed");
            eprintln!("Error: {err}");
            ok = false;
        }
    }

    ok
}

fn display_root(path: &str) -> &str {
    if path.is_empty() { "/" } else { path }
}

fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
