// src/checker/runner.rs
// =============================================================================
// This module drives a whole check run over every sampled page type.
//
// For each page type, in the order given:
// 1. Probe the CMS edit view (must be 200)
// 2. Probe the frontend view and keep its HTML (expected statuses depend on
//    the page category)
// 3. Count forms in that HTML
// 4. If action checking is on: find the action URLs in the HTML, probe the
//    ones we found (must be 200), and mark the rest for a manual check
//
// Probing is strictly one request at a time. The site under test is usually
// the same box that was just upgraded, so we keep the load gentle and the
// order fully predictable.
//
// Cancellation is cooperative: the flag is looked at between probes, never
// during one. Starting a run while another is in progress is how you stop it.
//
// Rust concepts:
// - Arc + AtomicBool: A cancel flag that another task (Ctrl-C) can flip
// - Drop guards: Reset the "running" flag however the run ends
// - Callbacks: Arc<dyn Fn(...)> for progress reporting
// =============================================================================

use super::actions::resolve_action_links;
use super::forms::count_forms;
use super::http::{HttpProbe, ProbeOptions, ProbeStatus};
use super::policy::{cms_expected_statuses, ExpectedStatuses};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Called after every tallied check with `(checked, total)`.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

// What to check for one sampled page
#[derive(Debug, Clone, Serialize)]
pub struct LinkPair {
    pub cms_url: String,
    pub frontend_url: String,
    pub expected_statuses: ExpectedStatuses,
    /// Probe the frontend without following redirects
    pub raw_redirects: bool,
    pub action_names: Vec<String>,
}

// Outcome of one probed URL
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub url: String,
    pub status: ProbeStatus,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    /// 3xx answer where something else was expected
    pub fn is_unexpected_redirect(&self) -> bool {
        !self.passed && self.status.is_redirection()
    }
}

// Outcome for one declared action
#[derive(Debug, Clone, Serialize)]
pub struct ActionCheck {
    pub action: String,
    /// None when no URL could be found (manual check needed)
    pub url: Option<String>,
    /// None when unresolved, or when the run stopped before probing it
    pub result: Option<CheckResult>,
}

impl ActionCheck {
    pub fn needs_manual_check(&self) -> bool {
        self.url.is_none()
    }
}

// Everything learned about one LinkPair
#[derive(Debug, Clone, Serialize)]
pub struct PairReport {
    #[serde(flatten)]
    pub pair: LinkPair,
    pub cms_result: Option<CheckResult>,
    pub frontend_result: Option<CheckResult>,
    pub forms_detected: usize,
    pub action_results: Vec<ActionCheck>,
}

impl PairReport {
    fn pending(pair: &LinkPair) -> Self {
        Self {
            pair: pair.clone(),
            cms_result: None,
            frontend_result: None,
            forms_detected: 0,
            action_results: Vec::new(),
        }
    }

    pub fn has_form(&self) -> bool {
        self.forms_detected > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub manual: usize,
    pub cancelled: bool,
    pub checked: usize,
    pub total: usize,
    /// Declared actions skipped because action checking was off
    pub actions_not_checked: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub pairs: Vec<PairReport>,
    pub summary: RunSummary,
}

// What calling run() did
#[derive(Debug)]
pub enum RunOutcome {
    /// A run happened (completed or cancelled part way)
    Finished(RunReport),
    /// A run was already in progress; it has been asked to stop
    CancelRequested,
}

// Counters for the run in progress
//
// Created fresh when a run starts and consumed into the summary at the end.
#[derive(Debug, Default)]
struct RunState {
    checked: usize,
    total: usize,
    passed: usize,
    failed: usize,
    manual: usize,
}

impl RunState {
    fn record(&mut self, passed: bool) {
        self.checked += 1;
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    fn record_manual(&mut self) {
        self.checked += 1;
        self.manual += 1;
    }

    fn into_summary(self, cancelled: bool, actions_not_checked: usize) -> RunSummary {
        RunSummary {
            passed: self.passed,
            failed: self.failed,
            manual: self.manual,
            cancelled,
            checked: self.checked,
            total: self.total,
            actions_not_checked,
        }
    }
}

#[derive(Debug, Default)]
struct RunControl {
    running: AtomicBool,
    cancel_requested: AtomicBool,
}

/// Lets another task stop the current run.
#[derive(Clone)]
pub struct CancelHandle(Arc<RunControl>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.cancel_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.0.running.load(Ordering::SeqCst)
    }
}

// Clears the running flag when a run ends, even if its future is dropped
struct RunningGuard<'a>(&'a RunControl);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.running.store(false, Ordering::SeqCst);
    }
}

pub struct LinkCheckRunner {
    probe: HttpProbe,
    base_url: String,
    control: Arc<RunControl>,
    progress_callback: Option<ProgressCallback>,
}

impl LinkCheckRunner {
    pub fn new(probe: HttpProbe, base_url: impl Into<String>) -> Self {
        Self {
            probe,
            base_url: base_url.into(),
            control: Arc::new(RunControl::default()),
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.control.clone())
    }

    // Starts a run, or stops the one already going
    pub async fn run(&self, pairs: &[LinkPair], include_actions: bool) -> RunOutcome {
        let Some(_guard) = self.start() else {
            return RunOutcome::CancelRequested;
        };
        RunOutcome::Finished(self.execute(pairs, include_actions).await)
    }

    // Checks the actions of one page type on their own
    //
    // Loads the frontend page, resolves its actions and probes the ones
    // found. The CMS view is not probed. Shares the running flag with run(),
    // so the two never overlap and the same cancel handle stops either.
    pub async fn check_actions(&self, pair: &LinkPair) -> RunOutcome {
        let Some(_guard) = self.start() else {
            return RunOutcome::CancelRequested;
        };

        let mut state = RunState {
            total: 1 + pair.action_names.len(),
            ..RunState::default()
        };
        let mut report = PairReport::pending(pair);
        info!(
            "Checking {} action(s) on {}",
            pair.action_names.len(),
            pair.frontend_url
        );

        let finished = self.check_frontend(pair, &mut report, &mut state, true).await;
        RunOutcome::Finished(RunReport {
            pairs: vec![report],
            summary: state.into_summary(!finished, 0),
        })
    }

    // Claims the running flag, or asks the current holder to stop
    fn start(&self) -> Option<RunningGuard<'_>> {
        if self.control.running.swap(true, Ordering::SeqCst) {
            info!("Check already running; requesting cancellation");
            self.control.cancel_requested.store(true, Ordering::SeqCst);
            return None;
        }
        self.control.cancel_requested.store(false, Ordering::SeqCst);
        Some(RunningGuard(&*self.control))
    }

    fn cancelled(&self) -> bool {
        self.control.cancel_requested.load(Ordering::SeqCst)
    }

    fn report_progress(&self, state: &RunState) {
        if let Some(callback) = &self.progress_callback {
            callback(state.checked, state.total);
        }
    }

    async fn execute(&self, pairs: &[LinkPair], include_actions: bool) -> RunReport {
        let declared_actions: usize = pairs.iter().map(|p| p.action_names.len()).sum();
        let mut state = RunState {
            total: 2 * pairs.len() + if include_actions { declared_actions } else { 0 },
            ..RunState::default()
        };
        let mut reports: Vec<PairReport> = pairs.iter().map(PairReport::pending).collect();

        info!(
            "Checking {} page types ({} checks, actions {})",
            pairs.len(),
            state.total,
            if include_actions { "on" } else { "off" }
        );

        let mut stopped = false;
        for (pair, report) in pairs.iter().zip(reports.iter_mut()) {
            if self.cancelled() {
                stopped = true;
                break;
            }
            if !self.check_pair(pair, report, &mut state, include_actions).await {
                stopped = true;
                break;
            }
        }

        let summary =
            state.into_summary(stopped, if include_actions { 0 } else { declared_actions });
        info!(
            "Run {}: {} passed, {} failed, {} manual",
            if stopped { "stopped" } else { "complete" },
            summary.passed,
            summary.failed,
            summary.manual
        );

        RunReport {
            pairs: reports,
            summary,
        }
    }

    // Checks one pair. Returns false when cancellation was observed.
    //
    // Whatever was recorded before the cancel stays in the report.
    async fn check_pair(
        &self,
        pair: &LinkPair,
        report: &mut PairReport,
        state: &mut RunState,
        include_actions: bool,
    ) -> bool {
        let cms = self.probe.probe(&pair.cms_url, ProbeOptions::default()).await;
        let cms = classify(cms.url, cms.status, cms.message, &cms_expected_statuses());
        state.record(cms.passed);
        report.cms_result = Some(cms);
        self.report_progress(state);

        if self.cancelled() {
            return false;
        }
        self.check_frontend(pair, report, state, include_actions).await
    }

    // Frontend probe, form count and (optionally) actions for one pair
    async fn check_frontend(
        &self,
        pair: &LinkPair,
        report: &mut PairReport,
        state: &mut RunState,
        include_actions: bool,
    ) -> bool {
        let options = ProbeOptions {
            raw_redirects: pair.raw_redirects,
            ..ProbeOptions::with_body()
        };
        let frontend = self.probe.probe(&pair.frontend_url, options).await;
        let body = frontend.body;
        let result = classify(
            frontend.url,
            frontend.status,
            frontend.message,
            &pair.expected_statuses,
        );
        state.record(result.passed);
        report.frontend_result = Some(result);
        self.report_progress(state);

        // No body means the page did not answer 200: nothing to scan
        let Some(body) = body else {
            return !self.cancelled();
        };
        report.forms_detected = count_forms(&body);

        if self.cancelled() {
            return false;
        }
        if !include_actions || pair.action_names.is_empty() {
            return true;
        }

        let resolution =
            resolve_action_links(&body, &pair.action_names, &pair.frontend_url, &self.base_url);
        let unresolved: Vec<&str> = resolution.unresolved().collect();
        if !unresolved.is_empty() {
            debug!("No link found on {} for: {}", pair.frontend_url, unresolved.join(", "));
        }
        for link in resolution.iter() {
            if self.cancelled() {
                return false;
            }
            let mut check = ActionCheck {
                action: link.action.clone(),
                url: link.url.clone(),
                result: None,
            };
            match &link.url {
                Some(url) => {
                    let probed = self.probe.probe(url, ProbeOptions::default()).await;
                    let result = classify(
                        probed.url,
                        probed.status,
                        probed.message,
                        &cms_expected_statuses(),
                    );
                    state.record(result.passed);
                    check.result = Some(result);
                }
                None => state.record_manual(),
            }
            report.action_results.push(check);
            self.report_progress(state);
        }

        !self.cancelled()
    }

    // Probes one URL on its own, outside any run (the "click to recheck" control)
    pub async fn recheck(
        &self,
        url: &str,
        expected: &ExpectedStatuses,
        raw_redirects: bool,
    ) -> CheckResult {
        let options = ProbeOptions {
            raw_redirects,
            ..ProbeOptions::default()
        };
        let probed = self.probe.probe(url, options).await;
        classify(probed.url, probed.status, probed.message, expected)
    }
}

fn classify(
    url: String,
    status: ProbeStatus,
    message: Option<String>,
    expected: &ExpectedStatuses,
) -> CheckResult {
    let passed = status.code().is_some_and(|code| expected.contains(code));
    CheckResult {
        url,
        status,
        passed,
        message,
    }
}
