//! Subject identifiers
//!
//! An fsid is the canonical identifier of a subject: `fsid_` followed by the
//! subject slug (`fsid_metaverse`). Slugs convert to fsids and back exactly;
//! free-text queries convert one way only.

use regex::Regex;
use std::sync::LazyLock;

pub const FSID_PREFIX: &str = "fsid_";

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("non-word pattern compiles"));

/// Build an fsid from a search query: lower-case, whitespace runs become `_`,
/// everything outside `[A-Za-z0-9_]` is dropped.
pub fn fsid_from_query(query: &str) -> String {
    let lowered = query.to_lowercase();
    let underscored = WHITESPACE.replace_all(&lowered, "_");
    let cleaned = NON_WORD.replace_all(&underscored, "");
    format!("{FSID_PREFIX}{cleaned}")
}

/// Prefix a slug as-is. [`slug_from_fsid`] is its exact inverse.
pub fn fsid_from_slug(slug: &str) -> String {
    format!("{FSID_PREFIX}{slug}")
}

/// Strip the fsid prefix. Identifiers without the prefix are returned as-is.
pub fn slug_from_fsid(fsid: &str) -> &str {
    fsid.strip_prefix(FSID_PREFIX).unwrap_or(fsid)
}
