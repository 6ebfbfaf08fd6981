use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shape of the configuration data a resource, path or name refers to.
///
/// A strategy transforms each role independently; the transform for one role
/// says nothing about the transform for another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigRole {
    Singleton,
    CollectionParent,
    CollectionItem,
}

impl ConfigRole {
    /// Returns the CLI-facing name for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Singleton => "singleton",
            Self::CollectionParent => "collection-parent",
            Self::CollectionItem => "collection-item",
        }
    }

    pub const ALL: [ConfigRole; 3] = [
        ConfigRole::Singleton,
        ConfigRole::CollectionParent,
        ConfigRole::CollectionItem,
    ];
}

impl std::fmt::Display for ConfigRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single stored property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Interpret a command-line literal: bool, then integer, then float, else string.
    pub fn parse_literal(raw: &str) -> Self {
        if let Ok(b) = raw.parse::<bool>() {
            return Self::Bool(b);
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Integer(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        Self::String(raw.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Property name -> value. Ordering is irrelevant to callers; `BTreeMap`
/// keeps serialized output stable.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Result of a persist or delete call on a single strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The strategy staged the change.
    Accepted,
    /// The operation does not apply to this strategy; try the next one.
    Declined,
}

impl WriteOutcome {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl From<bool> for WriteOutcome {
    fn from(accepted: bool) -> Self {
        if accepted {
            Self::Accepted
        } else {
            Self::Declined
        }
    }
}

/// Output format for CLI responses
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(ConfigRole::Singleton.as_str(), "singleton");
        assert_eq!(ConfigRole::CollectionParent.as_str(), "collection-parent");
        assert_eq!(ConfigRole::CollectionItem.as_str(), "collection-item");
    }

    #[test]
    fn test_role_display_matches_serde() {
        for role in ConfigRole::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }

    #[test]
    fn test_parse_literal_bool() {
        assert_eq!(PropertyValue::parse_literal("true"), PropertyValue::Bool(true));
        assert_eq!(
            PropertyValue::parse_literal("false"),
            PropertyValue::Bool(false)
        );
    }

    #[test]
    fn test_parse_literal_numbers() {
        assert_eq!(PropertyValue::parse_literal("42"), PropertyValue::Integer(42));
        assert_eq!(PropertyValue::parse_literal("-7"), PropertyValue::Integer(-7));
        assert_eq!(PropertyValue::parse_literal("1.5"), PropertyValue::Float(1.5));
    }

    #[test]
    fn test_parse_literal_string_fallback() {
        assert_eq!(
            PropertyValue::parse_literal("hello world"),
            PropertyValue::String("hello world".into())
        );
        // Non-finite floats stay strings
        assert_eq!(
            PropertyValue::parse_literal("NaN"),
            PropertyValue::String("NaN".into())
        );
        assert_eq!(
            PropertyValue::parse_literal(""),
            PropertyValue::String(String::new())
        );
    }

    #[test]
    fn test_display_list() {
        let v = PropertyValue::List(vec![1i64.into(), "a".into(), true.into()]);
        assert_eq!(v.to_string(), "[1, a, true]");
    }

    #[test]
    fn test_property_map_from_toml() {
        let map: PropertyMap = toml::from_str(
            r#"
            title = "Site"
            enabled = true
            depth = 3
            ratio = 0.25
            tags = ["a", "b"]
            "#,
        )
        .unwrap();
        assert_eq!(map["title"], PropertyValue::String("Site".into()));
        assert_eq!(map["enabled"], PropertyValue::Bool(true));
        assert_eq!(map["depth"], PropertyValue::Integer(3));
        assert_eq!(map["ratio"], PropertyValue::Float(0.25));
        assert_eq!(
            map["tags"],
            PropertyValue::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_write_outcome_from_bool() {
        assert!(WriteOutcome::from(true).is_accepted());
        assert!(!WriteOutcome::from(false).is_accepted());
    }
}
