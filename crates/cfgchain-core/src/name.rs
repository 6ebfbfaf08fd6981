//! Collection item name rules.
//!
//! Which names are legal is a property of the store, so the rule set is a
//! trait object handed to [`CollectionPersistData`](crate::CollectionPersistData)
//! rather than a hard-coded check.

use std::borrow::Cow;

use regex::Regex;

pub const DEFAULT_MAX_NAME_LENGTH: usize = 255;

/// Valid-name predicate for collection item names.
pub trait NamePolicy: Send + Sync {
    /// `Ok(())` when `name` may be used as a single path segment, otherwise a
    /// human-readable reason.
    fn check(&self, name: &str) -> Result<(), String>;

    /// Equivalence key for duplicate detection. Two names with the same
    /// canonical form address the same node in the store.
    fn canonical<'n>(&self, name: &'n str) -> Cow<'n, str> {
        Cow::Borrowed(name)
    }
}

/// Checks shared by every policy: non-empty, not a relative segment, no
/// separator and no control characters.
fn check_segment_basics(name: &str, max_length: usize) -> Result<(), String> {
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    if name == "." || name == ".." {
        return Err(format!("'{name}' is a relative path segment"));
    }
    let length = name.chars().count();
    if length > max_length {
        return Err(format!(
            "name is {length} characters long (max {max_length})"
        ));
    }
    if let Some(c) = name.chars().find(|c| *c == '/' || c.is_control()) {
        return Err(format!("character {c:?} is not allowed"));
    }
    Ok(())
}

/// Default rule set: ASCII letters, digits, `-`, `_` and `.` only.
///
/// Rejects spaces, `#`, `:`, `/` and every other character that is not safe
/// as a single path segment.
#[derive(Debug, Clone)]
pub struct SegmentNamePolicy {
    max_length: usize,
    case_insensitive: bool,
}

impl Default for SegmentNamePolicy {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_NAME_LENGTH,
            case_insensitive: false,
        }
    }
}

impl SegmentNamePolicy {
    pub fn new(max_length: usize, case_insensitive: bool) -> Self {
        Self {
            max_length,
            case_insensitive,
        }
    }
}

fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

impl NamePolicy for SegmentNamePolicy {
    fn check(&self, name: &str) -> Result<(), String> {
        check_segment_basics(name, self.max_length)?;
        if let Some(c) = name.chars().find(|c| !is_segment_char(*c)) {
            return Err(format!("character {c:?} is not allowed"));
        }
        Ok(())
    }

    fn canonical<'n>(&self, name: &'n str) -> Cow<'n, str> {
        if self.case_insensitive && name.chars().any(|c| c.is_ascii_uppercase()) {
            Cow::Owned(name.to_ascii_lowercase())
        } else {
            Cow::Borrowed(name)
        }
    }
}

/// Regex-driven rule set. The basic segment checks still apply whatever the
/// pattern allows.
#[derive(Debug, Clone)]
pub struct PatternNamePolicy {
    pattern: Regex,
    max_length: usize,
    case_insensitive: bool,
}

impl PatternNamePolicy {
    pub fn new(
        pattern: &str,
        max_length: usize,
        case_insensitive: bool,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            max_length,
            case_insensitive,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl NamePolicy for PatternNamePolicy {
    fn check(&self, name: &str) -> Result<(), String> {
        check_segment_basics(name, self.max_length)?;
        if !self.pattern.is_match(name) {
            return Err(format!("does not match pattern '{}'", self.pattern));
        }
        Ok(())
    }

    fn canonical<'n>(&self, name: &'n str) -> Cow<'n, str> {
        if self.case_insensitive {
            Cow::Owned(name.to_lowercase())
        } else {
            Cow::Borrowed(name)
        }
    }
}
