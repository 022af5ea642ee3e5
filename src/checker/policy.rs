// src/checker/policy.rs
// =============================================================================
// This module decides which HTTP status codes count as "passing" for a page.
//
// Every page type falls into one of three categories:
// - Normal pages must answer 200
// - Error pages are supposed to fail, so 404 or 500 is the expected answer
// - Redirector pages are supposed to redirect, so any 3xx redirect code passes
//
// The CMS edit view is different: it must always load, so it expects 200
// no matter what kind of page it edits.
//
// The policy does no name matching itself. The caller hands us a category.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Classification of a page type that drives its expected statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCategory {
    #[default]
    Normal,
    Error,
    Redirect,
}

impl PageCategory {
    /// Whether the frontend probe must see the raw 3xx instead of following it.
    pub fn wants_raw_redirects(self) -> bool {
        matches!(self, PageCategory::Redirect)
    }
}

impl fmt::Display for PageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageCategory::Normal => "normal",
            PageCategory::Error => "error",
            PageCategory::Redirect => "redirect",
        };
        f.write_str(name)
    }
}

/// A non-empty set of passing status codes.
///
/// The only ways to build one are the policy functions below and
/// `ExpectedStatuses::new`, which refuses an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExpectedStatuses(BTreeSet<u16>);

impl ExpectedStatuses {
    /// Builds a set from arbitrary codes. Returns None for an empty input.
    pub fn new(codes: impl IntoIterator<Item = u16>) -> Option<Self> {
        let set: BTreeSet<u16> = codes.into_iter().collect();
        if set.is_empty() {
            None
        } else {
            Some(Self(set))
        }
    }

    pub fn contains(&self, code: u16) -> bool {
        self.0.contains(&code)
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for ExpectedStatuses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<String> = self.iter().map(|c| c.to_string()).collect();
        f.write_str(&codes.join("/"))
    }
}

const OK: &[u16] = &[200];
const ERROR_PAGE: &[u16] = &[404, 500];
const REDIRECT: &[u16] = &[301, 302, 303, 307, 308];

// Returns the statuses a frontend view of this category may answer with
pub fn expected_statuses(category: PageCategory) -> ExpectedStatuses {
    let codes = match category {
        PageCategory::Normal => OK,
        PageCategory::Error => ERROR_PAGE,
        PageCategory::Redirect => REDIRECT,
    };
    ExpectedStatuses(codes.iter().copied().collect())
}

// CMS edit views and discovered action URLs always have to load
pub fn cms_expected_statuses() -> ExpectedStatuses {
    ExpectedStatuses(OK.iter().copied().collect())
}
