// src/config.rs
// =============================================================================
// Settings shared by every probe in a run.
//
// Values come from command-line flags (see cli.rs), which fall back to
// environment variables for the site-wide bits, and finally to the defaults
// below.
// =============================================================================

use std::time::Duration;

/// Sent with every request so site logs can tell our traffic apart.
pub const USER_AGENT: &str = concat!("page-type-tester/", env!("CARGO_PKG_VERSION"));

/// Default path (relative to the base URL) of the CMS page edit screen.
pub const DEFAULT_CMS_EDIT_PATH: &str = "admin/pages/edit/show";

#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Upper bound for a whole request, body included
    pub timeout: Duration,
    /// Upper bound for establishing the TCP/TLS connection
    pub connect_timeout: Duration,
    /// Redirect hops followed before giving up
    pub max_redirects: usize,
    pub user_agent: String,
    /// Raw `Cookie` header value, usually a logged-in CMS session
    pub cookie: Option<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_redirects: 5,
            user_agent: USER_AGENT.to_string(),
            cookie: None,
        }
    }
}
