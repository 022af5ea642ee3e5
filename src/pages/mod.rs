// src/pages/mod.rs
// =============================================================================
// This module is the boundary with the CMS.
//
// The CMS knows which page types exist, how many pages each has, and which
// actions each controller allows. It writes that into a JSON manifest; this
// module reads it and picks one sample page per page type.
//
// Submodules:
// - manifest: Reading and validating the manifest file
// - select: Choosing sample pages and building the sorted report rows
// =============================================================================

mod manifest;
mod select;

pub use manifest::load_manifest;
#[cfg(test)]
pub use manifest::Manifest;
pub use select::{build_rows, find_row, PageTypeRow, SelectOptions};
