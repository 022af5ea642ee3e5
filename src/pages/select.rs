// src/pages/select.rs
// =============================================================================
// Turns manifest entries into report rows: one row per page type, each with a
// representative sample page (when the type has any pages at all).
//
// How a sample is picked:
// - Published (live) pages first, draft-only pages only if nothing is live
// - The first candidate by default, a random one with --randomise
//
// Rows come out sorted by total page count, most-used page types first.
// The sort is stable, so page types with equal counts keep manifest order.
// =============================================================================

use super::manifest::{Manifest, PageEntry, PageTypeEntry};
use crate::checker::{expected_statuses, LinkPair, PageCategory};
use serde::Serialize;
use url::Url;

#[derive(Debug, Clone, Serialize)]
pub struct SamplePage {
    pub id: u64,
    pub title: String,
    pub cms_url: String,
    pub frontend_url: String,
    /// Path part of the frontend URL, for display
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageTypeRow {
    pub class_name: String,
    pub short_name: String,
    pub category: PageCategory,
    pub sample: Option<SamplePage>,
    pub live_count: usize,
    pub total_count: usize,
    pub action_names: Vec<String>,
}

impl PageTypeRow {
    pub fn draft_only_count(&self) -> usize {
        self.total_count.saturating_sub(self.live_count)
    }

    // The URLs to check for this row; None when the type has no pages
    pub fn link_pair(&self) -> Option<LinkPair> {
        let sample = self.sample.as_ref()?;
        Some(LinkPair {
            cms_url: sample.cms_url.clone(),
            frontend_url: sample.frontend_url.clone(),
            expected_statuses: expected_statuses(self.category),
            raw_redirects: self.category.wants_raw_redirects(),
            action_names: self.action_names.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SelectOptions {
    pub randomise: bool,
    pub cms_edit_path: String,
}

// Derives the category from a page type's short name (exact match only)
pub fn category_for(short_name: &str) -> PageCategory {
    match short_name {
        "ErrorPage" => PageCategory::Error,
        "RedirectorPage" => PageCategory::Redirect,
        _ => PageCategory::Normal,
    }
}

// Joins URL parts with exactly one "/" between them
//
// Example: join_links("https://x.test/", &["admin/pages/edit/show", "7"])
//          -> "https://x.test/admin/pages/edit/show/7"
pub fn join_links(base: &str, parts: &[&str]) -> String {
    let mut joined = base.trim_end_matches('/').to_string();
    for part in parts {
        let part = part.trim_matches('/');
        if part.is_empty() {
            continue;
        }
        joined.push('/');
        joined.push_str(part);
    }
    joined
}

pub fn build_rows(manifest: &Manifest, base_url: &Url, options: &SelectOptions) -> Vec<PageTypeRow> {
    let mut rows: Vec<PageTypeRow> = manifest
        .page_types
        .iter()
        .map(|entry| build_row(entry, base_url, options))
        .collect();

    // Vec::sort_by is stable
    rows.sort_by(|a, b| b.total_count.cmp(&a.total_count));
    rows
}

// Finds a row by short name or full class name (exact match)
pub fn find_row<'a>(rows: &'a [PageTypeRow], name: &str) -> Option<&'a PageTypeRow> {
    rows.iter()
        .find(|row| row.short_name == name || row.class_name == name)
}

fn build_row(entry: &PageTypeEntry, base_url: &Url, options: &SelectOptions) -> PageTypeRow {
    let live: Vec<&PageEntry> = entry.pages.iter().filter(|p| p.live).collect();
    let all: Vec<&PageEntry> = entry.pages.iter().collect();

    let candidates = if live.is_empty() { &all } else { &live };
    let sample = pick(candidates, options.randomise).map(|page| sample_page(page, base_url, options));

    let short_name = entry.short_name();
    PageTypeRow {
        class_name: entry.class_name.clone(),
        category: category_for(&short_name),
        short_name,
        sample,
        live_count: entry.live_count.unwrap_or(live.len()),
        total_count: entry.total_count.unwrap_or(all.len()),
        action_names: entry.allowed_actions.names(),
    }
}

fn pick<'a>(candidates: &[&'a PageEntry], randomise: bool) -> Option<&'a PageEntry> {
    if candidates.is_empty() {
        return None;
    }
    let index = if randomise {
        fastrand::usize(..candidates.len())
    } else {
        0
    };
    Some(candidates[index])
}

fn sample_page(page: &PageEntry, base_url: &Url, options: &SelectOptions) -> SamplePage {
    let frontend_url = absolute_link(base_url, &page.link);
    let path = Url::parse(&frontend_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| page.link.clone());
    let id = page.id.to_string();
    let cms_url = page
        .cms_link
        .clone()
        .unwrap_or_else(|| join_links(base_url.as_str(), &[options.cms_edit_path.as_str(), id.as_str()]));

    SamplePage {
        id: page.id,
        title: page.title.clone(),
        cms_url,
        frontend_url,
        path,
    }
}

// Page links are either absolute already or paths on the site
fn absolute_link(base_url: &Url, link: &str) -> String {
    if Url::parse(link).is_ok() {
        return link.to_string();
    }
    match base_url.join(link) {
        Ok(url) => url.to_string(),
        Err(_) => join_links(base_url.as_str(), &[link]),
    }
}
