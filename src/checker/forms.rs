// src/checker/forms.rs
// =============================================================================
// Counts the forms in a page's main content.
//
// Forms are worth a manual look after an upgrade (we only know they exist,
// not that they submit). Search boxes in the header and newsletter sign-ups in
// the footer appear on every page, so <header> and <footer> blocks are cut out
// before counting. Forms belonging to the BetterNavigator dev toolbar are
// ignored as well.
// =============================================================================

use regex::Regex;
use std::sync::OnceLock;

/// Attribute text marking a form as part of the injected dev toolbar.
pub const NAVIGATOR_MARKER: &str = "BetterNavigator";

/// Number of `<form>` opening tags outside header, footer and the dev toolbar.
pub fn count_forms(html: &str) -> usize {
    static HEADER_RE: OnceLock<Regex> = OnceLock::new();
    static FOOTER_RE: OnceLock<Regex> = OnceLock::new();
    static FORM_TAG_RE: OnceLock<Regex> = OnceLock::new();
    let header = HEADER_RE.get_or_init(|| {
        Regex::new(r"(?is)<header[^>]*>.*?</header>").expect("header regex compiles")
    });
    let footer = FOOTER_RE.get_or_init(|| {
        Regex::new(r"(?is)<footer[^>]*>.*?</footer>").expect("footer regex compiles")
    });
    let form_tag =
        FORM_TAG_RE.get_or_init(|| Regex::new(r"(?i)<form[^>]*>").expect("form regex compiles"));

    let without_header = header.replace_all(html, "");
    let content = footer.replace_all(&without_header, "");

    form_tag
        .find_iter(&content)
        .filter(|tag| !tag.as_str().contains(NAVIGATOR_MARKER))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_form_is_excluded() {
        let html = "<header><form></form></header><form class='x'></form>";
        assert_eq!(count_forms(html), 1);
    }

    #[test]
    fn test_footer_form_is_excluded_across_lines() {
        let html = "<main></main>\n<FOOTER class=\"site\">\n  <form action=\"/subscribe\">\n  </form>\n</footer>";
        assert_eq!(count_forms(html), 0);
    }

    #[test]
    fn test_navigator_form_is_ignored() {
        let html = r#"<form class="BetterNavigator"></form>"#;
        assert_eq!(count_forms(html), 0);
    }

    #[test]
    fn test_counts_every_content_form() {
        let html = r#"<main><form id="a"></form><p>text</p><FORM method="post"></FORM></main>"#;
        assert_eq!(count_forms(html), 2);
    }

    #[test]
    fn test_each_header_block_removed_separately() {
        // Non-greedy: content between two headers is kept
        let html = "<header>a</header><form></form><header>b</header>";
        assert_eq!(count_forms(html), 1);
    }

    #[test]
    fn test_truncated_html() {
        assert_eq!(count_forms("<div><form action='/x'"), 0);
        assert_eq!(count_forms("<header><form>"), 1);
        assert_eq!(count_forms(""), 0);
    }
}
