// src/checker/http.rs
// =============================================================================
// This module probes a single URL and reports the HTTP status it answered with.
//
// Key functionality:
// - Makes one HTTP GET per probe (we need the real page, not a HEAD shortcut)
// - Follows up to N redirects, unless the caller asks for raw redirects
// - Downloads the body only when asked AND the status is 200
// - Never fails: DNS errors, refused connections, timeouts and TLS problems
//   all come back as the status "ERR"
//
// Rust concepts:
// - async/await: For network I/O
// - Enums: To represent "a status code OR a transport error"
// - Custom Serialize: So the JSON report shows 200 or "ERR"
// =============================================================================

use crate::config::CheckerConfig;
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, COOKIE};
use reqwest::{redirect, Client, StatusCode};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

// The status a probe came back with
//
// Code(n) means the server answered, whatever the code was.
// Err means we never got an answer at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Code(u16),
    Err,
}

impl ProbeStatus {
    pub fn code(self) -> Option<u16> {
        match self {
            ProbeStatus::Code(code) => Some(code),
            ProbeStatus::Err => None,
        }
    }

    pub fn is_redirection(self) -> bool {
        matches!(self, ProbeStatus::Code(300..=399))
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Code(code) => write!(f, "{}", code),
            ProbeStatus::Err => f.write_str("ERR"),
        }
    }
}

// JSON shape: a bare number for real answers, the string "ERR" otherwise
impl Serialize for ProbeStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ProbeStatus::Code(code) => serializer.serialize_u16(*code),
            ProbeStatus::Err => serializer.serialize_str("ERR"),
        }
    }
}

// Why a probe ended without a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportFailure {
    Timeout,
    TooManyRedirects,
    DnsError,
    SslError,
    Connection,
    Body,
    Other,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeOptions {
    /// Download the body (only honoured when the status is 200)
    pub fetch_body: bool,
    /// Surface 3xx responses as-is instead of following them
    pub raw_redirects: bool,
}

impl ProbeOptions {
    pub fn with_body() -> Self {
        Self {
            fetch_body: true,
            raw_redirects: false,
        }
    }
}

// Everything one probe learned about a URL
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub url: String,
    pub status: ProbeStatus,
    /// Present only when requested and the status was 200
    pub body: Option<String>,
    /// Set when the status had to be guessed or the request failed
    pub message: Option<String>,
}

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid cookie header: {0}")]
    InvalidCookie(#[from] InvalidHeaderValue),
}

// Issues the GET requests for a run
//
// Holds two clients because reqwest fixes the redirect policy at build time:
// one follows redirects, the other hands back the 3xx untouched.
// Neither has a cookie store, so nothing learned in one probe leaks into the next.
pub struct HttpProbe {
    follow: Client,
    raw: Client,
}

impl HttpProbe {
    pub fn new(config: &CheckerConfig) -> Result<Self, ProbeError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.cookie {
            let mut value = HeaderValue::from_str(cookie)?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let build = |policy: redirect::Policy| {
            Client::builder()
                .user_agent(config.user_agent.clone())
                .timeout(config.timeout)
                .connect_timeout(config.connect_timeout)
                .default_headers(headers.clone())
                .redirect(policy)
                .build()
        };

        Ok(Self {
            follow: build(redirect::Policy::limited(config.max_redirects))?,
            raw: build(redirect::Policy::none())?,
        })
    }

    // Probes one URL and never returns an error
    //
    // Cancellation is the caller's business: once started, a probe always
    // runs to completion (or to its timeout).
    pub async fn probe(&self, url: &str, options: ProbeOptions) -> ProbeResult {
        let client = if options.raw_redirects {
            &self.raw
        } else {
            &self.follow
        };

        let result = match client.get(url).send().await {
            Ok(response) => read_response(url, response, options).await,
            Err(e) => categorize_error(url, e),
        };

        debug!("GET {} -> {}", url, result.status);
        result
    }
}

async fn read_response(url: &str, response: reqwest::Response, options: ProbeOptions) -> ProbeResult {
    let status = response.status();

    // Bodies of broken pages are never downloaded
    if !options.fetch_body || status != StatusCode::OK {
        return ProbeResult {
            url: url.to_string(),
            status: ProbeStatus::Code(status.as_u16()),
            body: None,
            message: None,
        };
    }

    match response.text().await {
        Ok(body) => ProbeResult {
            url: url.to_string(),
            status: ProbeStatus::Code(status.as_u16()),
            body: Some(body),
            message: None,
        },
        Err(e) => {
            warn!("Reading body of {} failed: {}", url, e);
            ProbeResult {
                url: url.to_string(),
                status: ProbeStatus::Err,
                body: None,
                message: Some(describe_failure(TransportFailure::Body).to_string()),
            }
        }
    }
}

// Turns a reqwest error into a result
//
// A redirect chain longer than the limit is the one case where we know the
// server redirected but cannot see where it ends. It is reported as a
// synthetic 302. That is an approximation, not the real final status.
fn categorize_error(url: &str, error: reqwest::Error) -> ProbeResult {
    let failure = classify_failure(&error);

    if failure == TransportFailure::TooManyRedirects {
        warn!(
            "{} exceeded the redirect limit; treating it as a 302 (approximate status)",
            url
        );
        return ProbeResult {
            url: url.to_string(),
            status: ProbeStatus::Code(StatusCode::FOUND.as_u16()),
            body: None,
            message: Some("redirect chain not followed to the end; status approximated".to_string()),
        };
    }

    warn!("Probe of {} failed: {}", url, error);
    ProbeResult {
        url: url.to_string(),
        status: ProbeStatus::Err,
        body: None,
        message: Some(describe_failure(failure).to_string()),
    }
}

fn classify_failure(error: &reqwest::Error) -> TransportFailure {
    // Convert error to string once so we can look for hints in the text
    let error_string = error.to_string().to_lowercase();

    if error.is_timeout() {
        TransportFailure::Timeout
    } else if error.is_redirect() {
        TransportFailure::TooManyRedirects
    } else if error.is_connect() {
        if error_string.contains("dns") {
            TransportFailure::DnsError
        } else {
            TransportFailure::Connection
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        TransportFailure::SslError
    } else if error.is_body() || error.is_decode() {
        TransportFailure::Body
    } else {
        TransportFailure::Other
    }
}

fn describe_failure(failure: TransportFailure) -> &'static str {
    match failure {
        TransportFailure::Timeout => "Request timed out",
        TransportFailure::TooManyRedirects => "Too many redirects",
        TransportFailure::DnsError => "Could not resolve hostname",
        TransportFailure::SslError => "SSL certificate error",
        TransportFailure::Connection => "Connection failed",
        TransportFailure::Body => "Response body could not be read",
        TransportFailure::Other => "Request failed",
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why two reqwest clients?
//    - The redirect policy belongs to the client, not to the request
//    - Redirector pages must show their 3xx code, everything else should
//      be followed to the final page, so we keep one client of each kind
//    - Clients are cheap to keep around and pool their connections
//
// 2. Why implement Serialize by hand for ProbeStatus?
//    - #[derive(Serialize)] would produce {"Code": 200} and "Err"
//    - The report wants just 200 or "ERR", so we write the few lines ourselves
//
// 3. Why does probe() return ProbeResult instead of Result<...>?
//    - A dead link is a finding, not a crash
//    - Callers always get something to tally, which keeps the run loop simple
// -----------------------------------------------------------------------------
