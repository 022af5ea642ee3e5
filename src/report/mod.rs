// src/report/mod.rs
// =============================================================================
// This module turns rows and check results into something people read.
//
// Submodules:
// - text: Terminal output (listing, per-row results, summary line)
// - html: A standalone HTML page with the same information
//
// JSON output needs no module of its own: ReportRow derives Serialize and
// main.rs hands it to serde_json.
// =============================================================================

mod html;
mod text;

use crate::checker::{PairReport, RunReport, RunSummary};
use crate::pages::PageTypeRow;
use serde::Serialize;

pub use html::render_html;
pub use text::{render_check_report, render_listing, summary_line};

// One page type plus, after a run, what was found for its sample page
#[derive(Debug, Serialize)]
pub struct ReportRow<'a> {
    #[serde(flatten)]
    pub row: &'a PageTypeRow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<&'a PairReport>,
}

#[derive(Debug, Serialize)]
pub struct CheckOutput<'a> {
    pub rows: Vec<ReportRow<'a>>,
    pub summary: &'a RunSummary,
}

// Lines rows up with the run's pair reports
//
// The runner only sees rows that have a sample page, in row order, so the
// n-th pair report belongs to the n-th row with a sample.
pub fn zip_rows<'a>(rows: &'a [PageTypeRow], report: Option<&'a RunReport>) -> Vec<ReportRow<'a>> {
    let mut pairs = report.map(|r| r.pairs.iter());
    rows.iter()
        .map(|row| {
            let checks = if row.sample.is_some() {
                pairs.as_mut().and_then(|it| it.next())
            } else {
                None
            };
            ReportRow { row, checks }
        })
        .collect()
}

pub fn check_output<'a>(rows: &'a [PageTypeRow], report: &'a RunReport) -> CheckOutput<'a> {
    CheckOutput {
        rows: zip_rows(rows, Some(report)),
        summary: &report.summary,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::checker::{ActionCheck, CheckResult, PairReport, ProbeStatus, RunReport, RunSummary};
    use crate::pages::{build_rows, Manifest, PageTypeRow, SelectOptions};
    use url::Url;

    pub fn rows() -> Vec<PageTypeRow> {
        let manifest = Manifest::from_json(
            r#"{"page_types": [
                {"class_name": "App\\BlogPage", "live_count": 2, "total_count": 3,
                 "pages": [{"id": 5, "title": "Blog <News>", "link": "/blog/", "live": true}],
                 "allowed_actions": ["archive", "secret"]},
                {"class_name": "App\\EmptyPage", "allowed_actions": ["special"]}
            ]}"#,
        )
        .unwrap();
        let options = SelectOptions {
            randomise: false,
            cms_edit_path: "admin/pages/edit/show".to_string(),
        };
        build_rows(&manifest, &Url::parse("https://example.test/").unwrap(), &options)
    }

    pub fn check(url: &str, code: u16, passed: bool) -> CheckResult {
        CheckResult {
            url: url.to_string(),
            status: ProbeStatus::Code(code),
            passed,
            message: None,
        }
    }

    pub fn report(rows: &[PageTypeRow]) -> RunReport {
        let pair = rows[0].link_pair().unwrap();
        RunReport {
            pairs: vec![PairReport {
                cms_result: Some(check(&pair.cms_url, 200, true)),
                frontend_result: Some(check(&pair.frontend_url, 301, false)),
                forms_detected: 1,
                action_results: vec![
                    ActionCheck {
                        action: "archive".to_string(),
                        url: Some("https://example.test/blog/archive".to_string()),
                        result: Some(check("https://example.test/blog/archive", 200, true)),
                    },
                    ActionCheck {
                        action: "secret".to_string(),
                        url: None,
                        result: None,
                    },
                ],
                pair,
            }],
            summary: RunSummary {
                passed: 2,
                failed: 1,
                manual: 1,
                cancelled: false,
                checked: 4,
                total: 4,
                actions_not_checked: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_without_sample_get_no_checks() {
        let rows = fixtures::rows();
        let report = fixtures::report(&rows);
        let zipped = zip_rows(&rows, Some(&report));

        assert_eq!(zipped.len(), 2);
        assert!(zipped[0].checks.is_some());
        assert!(zipped[1].checks.is_none());
    }

    #[test]
    fn test_json_output_shape() {
        let rows = fixtures::rows();
        let report = fixtures::report(&rows);
        let json = serde_json::to_value(check_output(&rows, &report)).unwrap();

        assert_eq!(json["rows"][0]["short_name"], "BlogPage");
        assert_eq!(json["rows"][0]["checks"]["frontend_result"]["status"], 301);
        assert_eq!(json["rows"][0]["checks"]["expected_statuses"][0], 200);
        assert!(json["rows"][1].get("checks").is_none());
        assert_eq!(json["summary"]["manual"], 1);
    }
}
