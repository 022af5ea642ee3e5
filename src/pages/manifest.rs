// src/pages/manifest.rs
// =============================================================================
// This module reads the page manifest: the list of page types the CMS knows
// about, with a few pages of each and the actions each controller allows.
//
// The CMS side writes this file; we only read it. Example:
//
//   {
//     "base_url": "https://example.test/",
//     "page_types": [
//       {
//         "class_name": "App\\Pages\\BlogPage",
//         "pages": [ { "id": 7, "title": "Blog", "link": "/blog/", "live": true } ],
//         "allowed_actions": ["rss", "archive"]
//       }
//     ]
//   }
//
// Rust concepts:
// - serde(untagged): Accept two JSON shapes for the same field
// - thiserror: A typed error enum with readable messages
// =============================================================================

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("could not read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("page {id} of {page_type} has no link")]
    MissingLink { page_type: String, id: u64 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub page_types: Vec<PageTypeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageTypeEntry {
    /// Fully qualified class name, e.g. `App\Pages\BlogPage`
    pub class_name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    /// Published pages of this type; defaults to the live pages listed
    #[serde(default)]
    pub live_count: Option<usize>,
    /// Live plus draft-only pages; defaults to the pages listed
    #[serde(default)]
    pub total_count: Option<usize>,
    #[serde(default)]
    pub pages: Vec<PageEntry>,
    #[serde(default)]
    pub allowed_actions: AllowedActions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    /// Absolute URL or site-relative path of the page
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub live: bool,
    /// Overrides the computed CMS edit URL
    #[serde(default)]
    pub cms_link: Option<String>,
}

// Controllers declare allowed actions either as a plain list
// (["rss", "archive"]) or as a map whose keys are the action names
// ({"rss": true, "archive": "->canView"}).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AllowedActions {
    List(Vec<String>),
    Map(Map<String, Value>),
}

impl Default for AllowedActions {
    fn default() -> Self {
        AllowedActions::List(Vec::new())
    }
}

impl AllowedActions {
    /// Action names in declaration order.
    pub fn names(&self) -> Vec<String> {
        match self {
            AllowedActions::List(names) => names.clone(),
            AllowedActions::Map(map) => map.keys().cloned().collect(),
        }
    }
}

impl PageTypeEntry {
    /// Class name without its namespace.
    pub fn short_name(&self) -> String {
        if let Some(name) = &self.short_name {
            return name.clone();
        }
        self.class_name
            .rsplit(['\\', '.', ':'])
            .next()
            .unwrap_or(&self.class_name)
            .to_string()
    }
}

impl Manifest {
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if let Some(base) = &self.base_url {
            parse_base_url(base)?;
        }
        for entry in &self.page_types {
            if let Some(page) = entry.pages.iter().find(|p| p.link.trim().is_empty()) {
                return Err(ManifestError::MissingLink {
                    page_type: entry.class_name.clone(),
                    id: page.id,
                });
            }
        }
        Ok(())
    }

    // Picks the base URL: the command-line override wins over the manifest
    pub fn resolve_base_url(&self, override_url: Option<&str>) -> Result<Url, ManifestError> {
        let raw = override_url
            .or(self.base_url.as_deref())
            .ok_or_else(|| ManifestError::InvalidBaseUrl {
                url: String::new(),
                reason: "no base URL in manifest or on the command line".to_string(),
            })?;
        parse_base_url(raw)
    }
}

// Parses a base URL and makes sure it ends in "/" so joins stay inside it
pub fn parse_base_url(raw: &str) -> Result<Url, ManifestError> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url = Url::parse(&with_slash).map_err(|e| ManifestError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ManifestError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let json = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Manifest::from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_list_and_map_actions() {
        let manifest = Manifest::from_json(
            r#"{
                "base_url": "https://example.test",
                "page_types": [
                    { "class_name": "App\\Pages\\BlogPage", "allowed_actions": ["rss", "archive"] },
                    { "class_name": "App\\Pages\\ShopPage", "allowed_actions": {"view": true, "cart": "->canBuy", "add": true} }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.page_types[0].allowed_actions.names(), vec!["rss", "archive"]);
        assert_eq!(
            manifest.page_types[1].allowed_actions.names(),
            vec!["view", "cart", "add"]
        );
    }

    #[test]
    fn test_missing_actions_default_to_empty() {
        let manifest = Manifest::from_json(r#"{"page_types": [{"class_name": "Page"}]}"#).unwrap();
        assert!(manifest.page_types[0].allowed_actions.names().is_empty());
    }

    #[test]
    fn test_short_name_strips_namespace() {
        let manifest = Manifest::from_json(
            r#"{"page_types": [
                {"class_name": "SilverStripe\\ErrorPage\\ErrorPage"},
                {"class_name": "Page"},
                {"class_name": "App\\Custom", "short_name": "Renamed"}
            ]}"#,
        )
        .unwrap();
        let names: Vec<_> = manifest.page_types.iter().map(|e| e.short_name()).collect();
        assert_eq!(names, vec!["ErrorPage", "Page", "Renamed"]);
    }

    #[test]
    fn test_page_without_link_is_rejected() {
        let result = Manifest::from_json(
            r#"{"page_types": [{"class_name": "Page", "pages": [{"id": 3, "link": ""}]}]}"#,
        );
        assert!(matches!(result, Err(ManifestError::MissingLink { id: 3, .. })));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("https://example.test/site").unwrap();
        assert_eq!(url.as_str(), "https://example.test/site/");
        assert!(parse_base_url("ftp://example.test").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_override_beats_manifest_base_url() {
        let manifest = Manifest::from_json(r#"{"base_url": "https://a.test/"}"#).unwrap();
        let url = manifest.resolve_base_url(Some("https://b.test")).unwrap();
        assert_eq!(url.as_str(), "https://b.test/");
        let none = Manifest::from_json("{}").unwrap();
        assert!(none.resolve_base_url(None).is_err());
    }

    #[test]
    fn test_load_manifest_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"{{"base_url": "https://example.test/", "page_types": [{{"class_name": "Page", "pages": [{{"id": 1, "title": "Home", "link": "/", "live": true}}]}}]}}"#
        )?;

        let manifest = load_manifest(file.path())?;
        assert_eq!(manifest.page_types.len(), 1);
        assert_eq!(manifest.page_types[0].pages[0].title, "Home");
        Ok(())
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = load_manifest(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(ManifestError::Io { .. })));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        assert!(matches!(
            Manifest::from_json("{not json"),
            Err(ManifestError::Parse(_))
        ));
    }
}
