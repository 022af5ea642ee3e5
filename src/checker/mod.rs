// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - policy: Which status codes count as passing for each kind of page
// - http: Makes one HTTP request and reports the status (never fails)
// - actions: Finds controller action URLs in a page's HTML
// - forms: Counts forms in a page's main content
// - runner: Drives a whole check run, with progress and cancellation
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

mod actions;
mod forms;
mod http;
mod policy;
mod runner;

// Re-export public items from submodules
// This lets users write `checker::HttpProbe` instead of
// `checker::http::HttpProbe`
pub use http::HttpProbe;
pub use policy::{cms_expected_statuses, expected_statuses, ExpectedStatuses, PageCategory};
pub use runner::{
    ActionCheck, CheckResult, LinkCheckRunner, LinkPair, PairReport, RunOutcome, RunReport,
    RunSummary,
};

#[cfg(test)]
pub use http::ProbeStatus;
