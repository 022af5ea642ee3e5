// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Subcommands:
// - list: Print the sample page and links for each page type (no network)
// - check: Probe every CMS and frontend link (and optionally actions)
// - actions: Find and probe the actions of one page type
// - recheck: Probe a single URL once
// =============================================================================

use crate::config::{CheckerConfig, DEFAULT_CMS_EDIT_PATH};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "page-type-tester",
    version,
    about = "Checks the CMS edit form and frontend of one page per page type",
    long_about = "page-type-tester takes the page types of a content-managed site, picks a sample page \
                  for each, and checks that its CMS edit view and frontend return the expected HTTP \
                  status. It can also find and check controller actions such as /rss. \
                  Useful for testing a site after a platform upgrade."
)]
pub struct Cli {
    /// Show debug logging (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the sample page, CMS link and frontend link for each page type
    ///
    /// Example: page-type-tester list pages.json
    List {
        #[command(flatten)]
        site: SiteArgs,

        /// Output the rows as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check the CMS edit form and frontend of every sample page
    ///
    /// Example: page-type-tester check pages.json --actions --html report.html
    Check {
        #[command(flatten)]
        site: SiteArgs,

        #[command(flatten)]
        http: HttpArgs,

        /// Also find and check controller actions (e.g. /rss)
        #[arg(long)]
        actions: bool,

        /// Output the full report as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Also write an HTML report to this file
        #[arg(long, value_name = "PATH")]
        html: Option<PathBuf>,

        /// Do not draw a progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Find and check the controller actions of one page type
    ///
    /// Loads that type's sample page, looks for each allowed action among its
    /// links and checks the ones it finds. Actions without a link are listed
    /// for a manual check.
    ///
    /// Example: page-type-tester actions pages.json BlogPage
    Actions {
        #[command(flatten)]
        site: SiteArgs,

        /// Short name (e.g. BlogPage) or full class name of the page type
        page_type: String,

        #[command(flatten)]
        http: HttpArgs,

        /// Output the row as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check a single URL once
    ///
    /// Example: page-type-tester recheck https://example.test/old-page --expect 301 --raw-redirects
    Recheck {
        url: String,

        /// Status codes that count as passing (default: 200)
        #[arg(long = "expect", value_name = "CODE", num_args = 1..)]
        expect: Vec<u16>,

        /// Report 3xx responses instead of following them
        #[arg(long)]
        raw_redirects: bool,

        #[command(flatten)]
        http: HttpArgs,
    },
}

// Where the page types come from and how samples are picked
#[derive(Args, Debug)]
pub struct SiteArgs {
    /// JSON manifest of page types written by the CMS
    pub manifest: PathBuf,

    /// Site base URL (overrides the manifest's base_url)
    #[arg(long, env = "PTT_BASE_URL")]
    pub base_url: Option<String>,

    /// Pick a random sample page per type instead of the first one
    #[arg(long)]
    pub randomise: bool,

    /// Path of the CMS page edit screen, relative to the base URL
    #[arg(long, default_value = DEFAULT_CMS_EDIT_PATH)]
    pub cms_edit_path: String,
}

// Request settings shared by the commands that make requests
#[derive(Args, Debug)]
pub struct HttpArgs {
    /// Cookie header to send with every request (e.g. a CMS session)
    #[arg(long, env = "PTT_COOKIE", hide_env_values = true)]
    pub cookie: Option<String>,

    /// Total time allowed per request, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Time allowed to connect, in seconds
    #[arg(long, default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Redirect hops to follow before giving up
    #[arg(long, default_value_t = 5)]
    pub max_redirects: usize,
}

impl HttpArgs {
    pub fn to_config(&self) -> CheckerConfig {
        CheckerConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            max_redirects: self.max_redirects,
            cookie: self.cookie.clone(),
            ..CheckerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_with_flags() {
        let cli = Cli::try_parse_from([
            "page-type-tester",
            "check",
            "pages.json",
            "--actions",
            "--html",
            "out.html",
            "--timeout-secs",
            "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Check { site, http, actions, html, json, .. } => {
                assert_eq!(site.manifest, PathBuf::from("pages.json"));
                assert_eq!(site.cms_edit_path, DEFAULT_CMS_EDIT_PATH);
                assert!(actions);
                assert!(!json);
                assert_eq!(html, Some(PathBuf::from("out.html")));
                let config = http.to_config();
                assert_eq!(config.timeout, Duration::from_secs(5));
                assert_eq!(config.max_redirects, 5);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_actions_for_one_type() {
        let cli = Cli::try_parse_from([
            "page-type-tester",
            "actions",
            "pages.json",
            "BlogPage",
            "--cookie",
            "session=abc",
        ])
        .unwrap();

        match cli.command {
            Commands::Actions { site, page_type, http, json } => {
                assert_eq!(site.manifest, PathBuf::from("pages.json"));
                assert_eq!(page_type, "BlogPage");
                assert_eq!(http.to_config().cookie.as_deref(), Some("session=abc"));
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_recheck_expectations() {
        let cli = Cli::try_parse_from([
            "page-type-tester",
            "recheck",
            "https://example.test/go",
            "--expect",
            "301",
            "302",
            "--raw-redirects",
        ])
        .unwrap();

        match cli.command {
            Commands::Recheck { url, expect, raw_redirects, .. } => {
                assert_eq!(url, "https://example.test/go");
                assert_eq!(expect, vec![301, 302]);
                assert!(raw_redirects);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
