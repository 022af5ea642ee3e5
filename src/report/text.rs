// src/report/text.rs
// =============================================================================
// Terminal output.
//
// Three pieces:
// - render_listing: what `list` prints (no network involved)
// - render_check_report: per-row results after `check`
// - summary_line: the one-line verdict at the end of a run
// =============================================================================

use super::ReportRow;
use crate::checker::{ActionCheck, CheckResult, RunSummary};
use colored::Colorize;
use std::fmt::Write;

// Example output:
//   BlogPage (12 + 3): [has allowed_actions: rss, archive]
//     Frontend: https://example.test/blog/
//     CMS: https://example.test/admin/pages/edit/show/7
pub fn render_listing(rows: &[ReportRow<'_>]) -> String {
    let mut out = String::new();

    for ReportRow { row, .. } in rows {
        let actions = if row.action_names.is_empty() {
            String::new()
        } else {
            format!(" [has allowed_actions: {}]", row.action_names.join(", "))
        };

        match &row.sample {
            Some(sample) => {
                let _ = writeln!(
                    out,
                    "{} ({} + {}):{}\n  Frontend: {}\n  CMS: {}",
                    row.short_name.green(),
                    row.live_count,
                    row.draft_only_count(),
                    actions,
                    sample.frontend_url,
                    sample.cms_url
                );
            }
            None => {
                let _ = writeln!(out, "{} (0):{} (none)", row.short_name.yellow(), actions);
            }
        }
    }

    out
}

pub fn render_check_report(rows: &[ReportRow<'_>], summary: &RunSummary) -> String {
    let mut out = String::new();

    for ReportRow { row, checks } in rows {
        let Some(checks) = checks else {
            let _ = writeln!(out, "{} {}", row.short_name.yellow(), "(no pages)".dimmed());
            continue;
        };

        let form = if checks.has_form() {
            format!("  {}", "form".yellow())
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "{}  expects {}{}",
            row.short_name.bold(),
            checks.pair.expected_statuses,
            form
        );
        let _ = writeln!(out, "  CMS       {}  {}", badge(checks.cms_result.as_ref()), checks.pair.cms_url);
        let _ = writeln!(
            out,
            "  Frontend  {}  {}",
            badge(checks.frontend_result.as_ref()),
            checks.pair.frontend_url
        );
        for action in &checks.action_results {
            let _ = writeln!(out, "    {}", action_line(action));
        }
    }

    let _ = writeln!(out);
    let line = summary_line(summary);
    let line = if summary.cancelled {
        line.yellow()
    } else if summary.failed == 0 {
        line.green()
    } else {
        line.red()
    };
    let _ = writeln!(out, "{}", line);
    out
}

fn badge(result: Option<&CheckResult>) -> String {
    match result {
        None => "?".dimmed().to_string(),
        Some(result) if result.passed => format!("{} ✓", result.status).green().to_string(),
        Some(result) if result.is_unexpected_redirect() => {
            format!("{} ✗", result.status).yellow().to_string()
        }
        Some(result) => format!("{} ✗", result.status).red().to_string(),
    }
}

fn action_line(action: &ActionCheck) -> String {
    match &action.url {
        Some(url) if !action.needs_manual_check() => {
            format!("/{}  {}  {}", action.action, badge(action.result.as_ref()), url)
        }
        _ => format!("/{}  {}", action.action, "check manually".yellow()),
    }
}

// Plain-text verdict, e.g. "✗ 2 failed, 10 passed, 1 manual"
pub fn summary_line(summary: &RunSummary) -> String {
    let manual = if summary.manual > 0 {
        format!(", {} manual", summary.manual)
    } else {
        String::new()
    };

    if summary.cancelled {
        format!("Stopped: {} failed, {} passed{}", summary.failed, summary.passed, manual)
    } else if summary.failed == 0 {
        let skipped = if summary.actions_not_checked > 0 {
            format!(" ({} actions not checked)", summary.actions_not_checked)
        } else {
            String::new()
        };
        format!("✓ {} passed{}{}", summary.passed, manual, skipped)
    } else {
        format!("✗ {} failed, {} passed{}", summary.failed, summary.passed, manual)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{fixtures, zip_rows};
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_summary_all_passed() {
        let summary = RunSummary {
            passed: 6,
            ..RunSummary::default()
        };
        assert_eq!(summary_line(&summary), "✓ 6 passed");
    }

    #[test]
    fn test_summary_mentions_unchecked_actions_and_manual() {
        let summary = RunSummary {
            passed: 4,
            manual: 1,
            actions_not_checked: 3,
            ..RunSummary::default()
        };
        assert_eq!(summary_line(&summary), "✓ 4 passed, 1 manual (3 actions not checked)");
    }

    #[test]
    fn test_summary_with_failures() {
        let summary = RunSummary {
            passed: 3,
            failed: 2,
            ..RunSummary::default()
        };
        assert_eq!(summary_line(&summary), "✗ 2 failed, 3 passed");
    }

    #[test]
    fn test_summary_when_stopped() {
        let summary = RunSummary {
            passed: 1,
            failed: 1,
            manual: 2,
            cancelled: true,
            ..RunSummary::default()
        };
        assert_eq!(summary_line(&summary), "Stopped: 1 failed, 1 passed, 2 manual");
    }

    #[test]
    fn test_listing_output() {
        plain();
        let rows = fixtures::rows();
        let listing = render_listing(&zip_rows(&rows, None));

        assert!(listing.contains("BlogPage (2 + 1): [has allowed_actions: archive, secret]"));
        assert!(listing.contains("  Frontend: https://example.test/blog/"));
        assert!(listing.contains("  CMS: https://example.test/admin/pages/edit/show/5"));
        assert!(listing.contains("EmptyPage (0): [has allowed_actions: special] (none)"));
    }

    #[test]
    fn test_check_report_output() {
        plain();
        let rows = fixtures::rows();
        let report = fixtures::report(&rows);
        let text = render_check_report(&zip_rows(&rows, Some(&report)), &report.summary);

        assert!(text.contains("BlogPage  expects 200  form"));
        assert!(text.contains("CMS       200 ✓"));
        assert!(text.contains("Frontend  301 ✗"));
        assert!(text.contains("/archive  200 ✓  https://example.test/blog/archive"));
        assert!(text.contains("/secret  check manually"));
        assert!(text.contains("EmptyPage (no pages)"));
        assert!(text.trim_end().ends_with("✗ 1 failed, 2 passed, 1 manual"));
    }
}
