// src/report/html.rs
// =============================================================================
// Writes the check results as one self-contained HTML page.
//
// The page has a summary banner and a table with one row per page type:
// counts, CMS and frontend status badges with their links, a form marker,
// and the action links found on the page. Everything interpolated into the
// markup goes through escape() first; titles and URLs come from the CMS and
// may contain anything.
// =============================================================================

use super::{summary_line, ReportRow};
use crate::checker::{ActionCheck, CheckResult, RunSummary};
use std::fmt::Write;

const STYLE: &str = "
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 1400px; margin: 0 auto; padding: 20px; background: #f5f7fa; }
.ptt-header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 20px; padding-bottom: 16px; border-bottom: 2px solid #e9ecef; }
h1 { color: #212529; font-size: 22px; margin: 0 0 8px 0; }
.ptt-summary { font-size: 18px; font-weight: 600; padding: 8px 16px; border-radius: 6px; white-space: nowrap; }
.ptt-table { width: 100%; border-collapse: collapse; background: #fff; font-size: 14px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
.ptt-table th { background: #343a40; color: #fff; padding: 12px 16px; text-align: left; }
.ptt-table td { padding: 12px 16px; border-bottom: 1px solid #e9ecef; vertical-align: middle; }
.ptt-type { font-family: 'SF Mono', Monaco, monospace; font-weight: 600; }
.ptt-url { color: #adb5bd; font-size: 12px; font-family: 'SF Mono', Monaco, monospace; display: block; }
.ptt-badge { padding: 3px 6px; border-radius: 4px; font-size: 12px; display: inline-block; min-width: 46px; text-align: center; margin-right: 4px; }
.ptt-pending { background: #e9ecef; color: #adb5bd; }
.ptt-note { margin-left: 6px; padding: 3px 8px; border-radius: 4px; background: #fff3cd; color: #856404; font-size: 12px; }
.ptt-actions { display: grid; grid-template-columns: auto auto; gap: 4px 6px; margin-top: 8px; justify-content: start; }
.ptt-empty { color: #6c757d; font-style: italic; }
";

pub fn render_html(title: &str, rows: &[ReportRow<'_>], summary: &RunSummary) -> String {
    let mut out = String::new();

    let (background, color) = if summary.cancelled {
        ("#fff3cd", "#856404")
    } else if summary.failed == 0 {
        ("#d4edda", "#155724")
    } else {
        ("#f8d7da", "#721c24")
    };

    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html><head><meta charset='utf-8'><title>{title}</title><style>{STYLE}</style></head><body>\n\
         <div class='ptt-header'><div><h1>{title}</h1>\
         <p>Checks the HTTP status code of the frontend and CMS edit form for each page type.</p></div>\
         <span class='ptt-summary' style='background:{background};color:{color};'>{summary}</span></div>\n",
        title = escape(title),
        summary = escape(&summary_line(summary)),
    );

    out.push_str(
        "<table class='ptt-table'>\n<tr><th>Page Type</th><th>Count</th><th>CMS Edit Form</th><th>Frontend</th><th>Example Page</th></tr>\n",
    );

    for ReportRow { row, checks } in rows {
        let count = if row.draft_only_count() > 0 {
            format!("{} <span class='ptt-url'>+ {} draft</span>", row.live_count, row.draft_only_count())
        } else {
            row.live_count.to_string()
        };

        let Some(sample) = &row.sample else {
            let note = if row.action_names.is_empty() {
                String::new()
            } else {
                format!(
                    "<div class='ptt-note'>Has actions: {}</div>",
                    escape(&row.action_names.join(", "))
                )
            };
            let _ = writeln!(
                out,
                "<tr><td><span class='ptt-type'>{}</span></td><td>0</td>\
                 <td colspan='3' style='text-align:center;'><span class='ptt-empty'>no pages</span>{}</td></tr>",
                escape(&row.short_name),
                note
            );
            continue;
        };

        let cms_badge = badge(checks.and_then(|c| c.cms_result.as_ref()));
        let frontend_badge = badge(checks.and_then(|c| c.frontend_result.as_ref()));
        let form = if checks.is_some_and(|c| c.has_form()) {
            "<span class='ptt-note' title='Check the form manually'>form</span>"
        } else {
            ""
        };
        let actions = checks
            .filter(|c| !c.action_results.is_empty())
            .map(|c| {
                let cells: String = c.action_results.iter().map(action_cells).collect();
                format!("<div class='ptt-actions'>{}</div>", cells)
            })
            .unwrap_or_default();

        let _ = writeln!(
            out,
            "<tr><td><span class='ptt-type'>{name}</span></td><td>{count}</td>\
             <td>{cms_badge}<a href='{cms}' target='_blank'>Edit in CMS</a></td>\
             <td>{frontend_badge}<a href='{frontend}' target='_blank'>View Page</a>{form}{actions}</td>\
             <td>{page_title}<span class='ptt-url'>{path}</span></td></tr>",
            name = escape(&row.short_name),
            cms = escape(&sample.cms_url),
            frontend = escape(&sample.frontend_url),
            page_title = escape(&sample.title),
            path = escape(&sample.path),
        );
    }

    out.push_str("</table>\n</body></html>\n");
    out
}

fn badge(result: Option<&CheckResult>) -> String {
    let Some(result) = result else {
        return "<span class='ptt-badge ptt-pending'>?</span>".to_string();
    };

    let (background, color, mark) = if result.passed {
        ("#28a745", "#fff", "✓")
    } else if result.is_unexpected_redirect() {
        ("#ffc107", "#000", "✗")
    } else {
        ("#dc3545", "#fff", "✗")
    };
    format!(
        "<span class='ptt-badge' style='background:{};color:{};'>{} {}</span>",
        background, color, result.status, mark
    )
}

fn action_cells(action: &ActionCheck) -> String {
    match &action.url {
        Some(url) => format!(
            "{}<a href='{}' target='_blank' title='{}'>/{}</a>",
            badge(action.result.as_ref()),
            escape(url),
            escape(url),
            escape(&action.action)
        ),
        None => format!(
            "<span class='ptt-note' title='No link found on page for this action. Visit the page and manually verify it works.'>check</span><span class='ptt-url'>/{}</span>",
            escape(&action.action)
        ),
    }
}

// Minimal HTML escaping for text and single/double-quoted attributes
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::super::{fixtures, zip_rows};
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href='x'>&\"</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&quot;&lt;/a&gt;");
    }

    #[test]
    fn test_page_contains_rows_badges_and_actions() {
        let rows = fixtures::rows();
        let report = fixtures::report(&rows);
        let html = render_html("Page Type Tester", &zip_rows(&rows, Some(&report)), &report.summary);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("✗ 1 failed, 2 passed, 1 manual"));
        // Unexpected redirect renders in the warning colour
        assert!(html.contains("background:#ffc107;color:#000;'>301 ✗"));
        assert!(html.contains("background:#28a745;color:#fff;'>200 ✓"));
        assert!(html.contains(">/archive</a>"));
        assert!(html.contains(">check</span><span class='ptt-url'>/secret</span>"));
        assert!(html.contains("Blog &lt;News&gt;"));
        assert!(html.contains("2 <span class='ptt-url'>+ 1 draft</span>"));
        assert!(html.contains("Has actions: special"));
    }

    #[test]
    fn test_unchecked_rows_show_placeholders() {
        let rows = fixtures::rows();
        let html = render_html("t", &zip_rows(&rows, None), &RunSummary::default());
        assert!(html.contains("ptt-pending'>?</span>"));
        assert!(!html.contains("class='ptt-actions'"));
    }
}
