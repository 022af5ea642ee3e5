// src/checker/actions.rs
// =============================================================================
// This module finds the URLs of a page's controller actions (e.g. /rss).
//
// A controller declares which actions it allows, but not where they live, so
// we look at the page itself:
// 1. Pull every href="..." out of the HTML, in document order
// 2. For each action, take the FIRST href containing "/<action>" followed by
//    "/", "?" or the end of the string ("news" must not match "newsletter")
// 3. Turn that href into an absolute URL
// 4. No match? "rss" and "index" live at <page>/<action> by convention, so we
//    build those URLs ourselves. Anything else stays unresolved and needs
//    a human to check it.
//
// We match with regular expressions instead of parsing the HTML. Page markup
// is often broken or cut short, and a pattern match shrugs that off.
//
// Rust concepts:
// - OnceLock: Compile a regex once, on first use
// - regex::escape: Treat the action name literally inside a pattern
// =============================================================================

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

/// Actions reachable at `<frontend URL>/<action>` without being linked.
pub const DIRECT_ACTIONS: &[&str] = &["rss", "index"];

/// Outcome of looking for one action on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionLink {
    pub action: String,
    /// Absolute URL, or None when the action could not be located
    pub url: Option<String>,
}

/// Resolution of every declared action, in the order they were declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActionResolution {
    links: Vec<ActionLink>,
}

impl ActionResolution {
    pub fn iter(&self) -> impl Iterator<Item = &ActionLink> {
        self.links.iter()
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.links
            .iter()
            .filter(|link| link.url.is_none())
            .map(|link| link.action.as_str())
    }
}

// Collects every href value in document order
pub fn extract_hrefs(html: &str) -> Vec<&str> {
    static HREF_RE: OnceLock<Regex> = OnceLock::new();
    let re = HREF_RE
        .get_or_init(|| Regex::new(r#"(?i)href=["']([^"']+)["']"#).expect("href regex compiles"));
    re.captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

// Resolves each action name to a URL found on the page
//
// Parameters:
//   html: body of the frontend page
//   actions: declared action names, in declaration order
//   frontend_url: absolute URL of the page itself
//   base_url: absolute base URL of the site
pub fn resolve_action_links(
    html: &str,
    actions: &[String],
    frontend_url: &str,
    base_url: &str,
) -> ActionResolution {
    let hrefs = extract_hrefs(html);

    let links = actions
        .iter()
        .map(|action| {
            let url = find_action_href(&hrefs, action)
                .map(|href| absolutize(href, frontend_url, base_url))
                .or_else(|| direct_action_url(action, frontend_url));
            debug!("action {} -> {:?}", action, url);
            ActionLink {
                action: action.clone(),
                url,
            }
        })
        .collect();

    ActionResolution { links }
}

fn action_pattern(action: &str) -> Option<Regex> {
    RegexBuilder::new(&format!(r"/{}(/|\?|$)", regex::escape(action)))
        .case_insensitive(true)
        .build()
        .ok()
}

// First href in document order wins
fn find_action_href<'a>(hrefs: &[&'a str], action: &str) -> Option<&'a str> {
    let pattern = action_pattern(action)?;
    hrefs.iter().copied().find(|href| pattern.is_match(href))
}

fn absolutize(href: &str, frontend_url: &str, base_url: &str) -> String {
    if has_scheme(href) {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", frontend_url.trim_end_matches('/'), href)
    }
}

fn has_scheme(href: &str) -> bool {
    Url::parse(href).is_ok()
}

fn direct_action_url(action: &str, frontend_url: &str) -> Option<String> {
    DIRECT_ACTIONS
        .iter()
        .any(|direct| direct.eq_ignore_ascii_case(action))
        .then(|| format!("{}/{}", frontend_url.trim_end_matches('/'), action))
}
