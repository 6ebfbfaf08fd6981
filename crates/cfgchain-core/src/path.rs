//! Slash-delimited resource path helpers.
//!
//! Paths are absolute (`/conf/site/settings`). The root is `/`. Empty,
//! `.` and `..` segments are rejected rather than resolved.

use crate::error::StoreError;

pub const ROOT: &str = "/";
pub const SEPARATOR: char = '/';

/// Validate `path` and return its canonical form (no trailing slash).
pub fn normalize(path: &str) -> Result<String, StoreError> {
    if !path.starts_with(SEPARATOR) {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        return Ok(ROOT.to_string());
    }
    for segment in trimmed[1..].split(SEPARATOR) {
        if segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.chars().any(char::is_control)
        {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
    }
    Ok(trimmed.to_string())
}

/// Append a relative name (which may itself contain separators) to `base`.
pub fn join(base: &str, name: &str) -> String {
    let name = name.trim_matches(SEPARATOR);
    if name.is_empty() {
        return base.to_string();
    }
    if base == ROOT {
        format!("/{name}")
    } else {
        format!("{}/{name}", base.trim_end_matches(SEPARATOR))
    }
}

/// Parent path, or `None` for the root.
pub fn parent(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    match path.rfind(SEPARATOR) {
        Some(0) => Some(ROOT),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

/// Last segment of `path` (empty for the root).
pub fn name(path: &str) -> &str {
    path.rsplit(SEPARATOR).next().unwrap_or_default()
}

/// Segments below the root, in order.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// True when `path` equals `ancestor` or lies below it.
pub fn is_same_or_descendant(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT {
        return path.starts_with(SEPARATOR);
    }
    match path.strip_prefix(ancestor) {
        Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// `path` and each of its ancestors, nearest first, ending with the root.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(path), |p| parent(p))
}
