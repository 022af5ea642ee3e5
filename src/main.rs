// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, written to stderr)
// 3. Dispatch to the appropriate subcommand handler
// 4. Print the report
// 5. Exit with proper code (0 = all passed, 1 = failures or stopped, 2 = error)
//
// Rust concepts used:
// - async/await: Network requests without blocking the thread
// - Result<T, E>: For error handling (T = success type, E = error type)
// - Arc: Sharing the progress bar with the runner's callback
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - probing, classification, the run itself
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - shared settings and defaults
mod pages; // src/pages/ - manifest loading and sample selection
mod report; // src/report/ - text, JSON and HTML output

use anyhow::{Context, Result};
use checker::{
    cms_expected_statuses, ExpectedStatuses, HttpProbe, LinkCheckRunner, LinkPair, RunOutcome,
};
use clap::Parser; // Parser trait enables the parse() method
use cli::{Cli, Commands, HttpArgs, SiteArgs};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pages::{build_rows, find_row, load_manifest, PageTypeRow, SelectOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

const REPORT_TITLE: &str = "Page Type Tester";

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole anyhow context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every check passed
//   Ok(1) = at least one check failed, or the run was stopped
//   Err = bad manifest, bad arguments, or I/O trouble (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::List { site, json } => handle_list(&site, json),
        Commands::Check {
            site,
            http,
            actions,
            json,
            html,
            no_progress,
        } => {
            let options = CheckOptions {
                actions,
                json,
                html,
                progress: !no_progress,
            };
            handle_check(&site, &http, &options).await
        }
        Commands::Actions {
            site,
            page_type,
            http,
            json,
        } => handle_actions(&site, &page_type, &http, json).await,
        Commands::Recheck {
            url,
            expect,
            raw_redirects,
            http,
        } => handle_recheck(&url, expect, raw_redirects, &http).await,
    }
}

// RUST_LOG wins when set; otherwise warnings only, or debug with -v
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Loads the manifest and picks a sample page per page type
fn load_rows(site: &SiteArgs) -> Result<(Url, Vec<PageTypeRow>)> {
    let manifest = load_manifest(&site.manifest)?;
    let base_url = manifest.resolve_base_url(site.base_url.as_deref())?;
    let options = SelectOptions {
        randomise: site.randomise,
        cms_edit_path: site.cms_edit_path.clone(),
    };
    let rows = build_rows(&manifest, &base_url, &options);
    info!("{} page type(s) in {}", rows.len(), site.manifest.display());
    Ok((base_url, rows))
}

// Handles the 'list' subcommand (no network)
fn handle_list(site: &SiteArgs, json: bool) -> Result<i32> {
    let (_, rows) = load_rows(site)?;
    let zipped = report::zip_rows(&rows, None);

    if json {
        println!("{}", serde_json::to_string_pretty(&zipped)?);
    } else {
        print!("{}", report::render_listing(&zipped));
    }
    Ok(0)
}

struct CheckOptions {
    actions: bool,
    json: bool,
    html: Option<PathBuf>,
    progress: bool,
}

// Handles the 'check' subcommand
async fn handle_check(site: &SiteArgs, http: &HttpArgs, options: &CheckOptions) -> Result<i32> {
    let (base_url, rows) = load_rows(site)?;
    let pairs: Vec<LinkPair> = rows.iter().filter_map(PageTypeRow::link_pair).collect();

    let probe = HttpProbe::new(&http.to_config())
        .context("Failed to build HTTP client")?;
    let mut runner = LinkCheckRunner::new(probe, base_url.as_str());

    let bar = if options.progress {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} checked")?
                .progress_chars("=>-"),
        );
        let callback_bar = bar.clone();
        runner = runner.with_progress_callback(Arc::new(move |checked, total| {
            callback_bar.set_length(total as u64);
            callback_bar.set_position(checked as u64);
        }));
        Some(bar)
    } else {
        None
    };

    let ctrl_c = cancel_on_ctrl_c(&runner);
    let outcome = runner.run(&pairs, options.actions).await;
    ctrl_c.abort();
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    let run_report = match outcome {
        RunOutcome::Finished(run_report) => run_report,
        RunOutcome::CancelRequested => {
            // Only reachable if another run shares this runner
            anyhow::bail!("A check was already running");
        }
    };

    if options.json {
        let output = report::check_output(&rows, &run_report);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let zipped = report::zip_rows(&rows, Some(&run_report));
        print!("{}", report::render_check_report(&zipped, &run_report.summary));
    }

    if let Some(path) = &options.html {
        let zipped = report::zip_rows(&rows, Some(&run_report));
        let page = report::render_html(REPORT_TITLE, &zipped, &run_report.summary);
        std::fs::write(path, page)
            .with_context(|| format!("Failed to write HTML report to {}", path.display()))?;
        info!("HTML report written to {}", path.display());
    }

    let summary = &run_report.summary;
    if summary.failed > 0 || summary.cancelled {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Handles the 'actions' subcommand
async fn handle_actions(
    site: &SiteArgs,
    page_type: &str,
    http: &HttpArgs,
    json: bool,
) -> Result<i32> {
    let (base_url, rows) = load_rows(site)?;
    let row = find_row(&rows, page_type)
        .with_context(|| format!("No page type named {} in {}", page_type, site.manifest.display()))?;
    let pair = row
        .link_pair()
        .with_context(|| format!("{} has no pages to check", row.short_name))?;
    if pair.action_names.is_empty() {
        println!("{} has no allowed actions", row.short_name);
        return Ok(0);
    }

    let probe = HttpProbe::new(&http.to_config()).context("Failed to build HTTP client")?;
    let runner = LinkCheckRunner::new(probe, base_url.as_str());

    let ctrl_c = cancel_on_ctrl_c(&runner);
    let outcome = runner.check_actions(&pair).await;
    ctrl_c.abort();

    let RunOutcome::Finished(run_report) = outcome else {
        anyhow::bail!("A check was already running");
    };

    let rows = std::slice::from_ref(row);
    if json {
        let output = report::check_output(rows, &run_report);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let zipped = report::zip_rows(rows, Some(&run_report));
        print!("{}", report::render_check_report(&zipped, &run_report.summary));
    }

    let summary = &run_report.summary;
    Ok(if summary.failed > 0 || summary.cancelled { 1 } else { 0 })
}

// Ctrl-C asks the run to stop after the probe in flight
fn cancel_on_ctrl_c(runner: &LinkCheckRunner) -> JoinHandle<()> {
    let cancel = runner.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() && cancel.is_running() {
            warn!("Interrupted; stopping after the current check");
            cancel.cancel();
        }
    })
}

// Handles the 'recheck' subcommand
async fn handle_recheck(
    url: &str,
    expect: Vec<u16>,
    raw_redirects: bool,
    http: &HttpArgs,
) -> Result<i32> {
    let expected = ExpectedStatuses::new(expect).unwrap_or_else(cms_expected_statuses);
    let probe = HttpProbe::new(&http.to_config()).context("Failed to build HTTP client")?;
    let runner = LinkCheckRunner::new(probe, url);

    let result = runner.recheck(url, &expected, raw_redirects).await;

    let badge = if result.passed {
        format!("{} ✓", result.status).green()
    } else {
        format!("{} ✗", result.status).red()
    };
    println!("{}  {}  (expects {})", badge, result.url, expected);
    if let Some(message) = &result.message {
        println!("  {}", message.dimmed());
    }

    Ok(if result.passed { 0 } else { 1 })
}
