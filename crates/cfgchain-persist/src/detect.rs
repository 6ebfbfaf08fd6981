//! Context resource detection.
//!
//! A detector maps an incoming request (a resource path plus free-form
//! attributes) to the context resource whose configuration applies. Detectors
//! are chained like strategies: the first one that finds a context wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use cfgchain_core::ResourceTree;
use cfgchain_core::path;
use tracing::debug;

pub const DEFAULT_CONFIG_REF_PROPERTY: &str = "configRef";
pub const DEFAULT_CONTEXT_ATTRIBUTE: &str = "context-path";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextRequest {
    pub path: String,
    pub attributes: BTreeMap<String, String>,
}

impl ContextRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

pub trait ContextResourceDetector: Send + Sync {
    fn name(&self) -> &str;

    /// Path of the context resource for `request`, `None` to let the next
    /// detector try.
    fn detect(&self, request: &ContextRequest, tree: &dyn ResourceTree) -> Option<String>;
}

#[derive(Clone, Default)]
pub struct DetectorChain {
    detectors: Vec<Arc<dyn ContextResourceDetector>>,
}

impl std::fmt::Debug for DetectorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorChain")
            .field("detectors", &self.names())
            .finish()
    }
}

impl DetectorChain {
    pub fn new(detectors: Vec<Arc<dyn ContextResourceDetector>>) -> Self {
        Self { detectors }
    }

    pub fn names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    pub fn detect(&self, request: &ContextRequest, tree: &dyn ResourceTree) -> Option<String> {
        for detector in &self.detectors {
            if let Some(context) = detector.detect(request, tree) {
                debug!(detector = detector.name(), context = %context, "context detected");
                return Some(context);
            }
        }
        debug!(path = %request.path, "no context detected");
        None
    }
}

/// Finds the nearest node at or above the request path that carries a
/// string-valued reference property.
#[derive(Debug, Clone)]
pub struct ConfigRefDetector {
    property: String,
}

impl Default for ConfigRefDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_REF_PROPERTY)
    }
}

impl ConfigRefDetector {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }
}

impl ContextResourceDetector for ConfigRefDetector {
    fn name(&self) -> &str {
        "config-ref"
    }

    fn detect(&self, request: &ContextRequest, tree: &dyn ResourceTree) -> Option<String> {
        let start = match path::normalize(&request.path) {
            Ok(p) => p,
            Err(e) => {
                debug!(error = %e, "request path rejected");
                return None;
            }
        };
        path::ancestors(&start)
            .find(|candidate| {
                tree.properties(candidate)
                    .and_then(|props| props.get(&self.property).cloned())
                    .is_some_and(|value| value.as_str().is_some_and(|s| !s.trim().is_empty()))
            })
            .map(str::to_string)
    }
}

/// Takes the context path from a request attribute, when it names an
/// existing node.
#[derive(Debug, Clone)]
pub struct AttributeDetector {
    key: String,
}

impl Default for AttributeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_ATTRIBUTE)
    }
}

impl AttributeDetector {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl ContextResourceDetector for AttributeDetector {
    fn name(&self) -> &str {
        "attribute"
    }

    fn detect(&self, request: &ContextRequest, tree: &dyn ResourceTree) -> Option<String> {
        let raw = request.attributes.get(&self.key)?;
        let normalized = path::normalize(raw).ok()?;
        tree.exists(&normalized).then_some(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgchain_core::{PropertyMap, PropertyValue, StoreSession};
    use cfgchain_store::MemoryStore;

    fn with_ref(value: PropertyValue) -> PropertyMap {
        let mut map = PropertyMap::new();
        map.insert(DEFAULT_CONFIG_REF_PROPERTY.to_string(), value);
        map
    }

    #[test]
    fn config_ref_walks_up_to_nearest_marked_ancestor() {
        let store = MemoryStore::new();
        let mut session = store.session().unwrap();
        session
            .put_properties("/content/site", with_ref("/conf/site".into()))
            .unwrap();
        session
            .put_properties("/content/site/en/page", PropertyMap::new())
            .unwrap();

        let detector = ConfigRefDetector::default();
        assert_eq!(
            detector
                .detect(&ContextRequest::new("/content/site/en/page"), &session)
                .as_deref(),
            Some("/content/site")
        );
        // Request paths need not exist.
        assert_eq!(
            detector
                .detect(&ContextRequest::new("/content/site/missing/leaf"), &session)
                .as_deref(),
            Some("/content/site")
        );
        assert!(detector.detect(&ContextRequest::new("/content"), &session).is_none());
    }

    #[test]
    fn config_ref_ignores_non_string_and_blank_values() {
        let store = MemoryStore::new();
        let mut session = store.session().unwrap();
        session
            .put_properties("/content/a", with_ref(PropertyValue::Bool(true)))
            .unwrap();
        session
            .put_properties("/content/b", with_ref("  ".into()))
            .unwrap();

        let detector = ConfigRefDetector::default();
        assert!(detector.detect(&ContextRequest::new("/content/a"), &session).is_none());
        assert!(detector.detect(&ContextRequest::new("/content/b"), &session).is_none());
        assert!(detector.detect(&ContextRequest::new("relative"), &session).is_none());
    }

    #[test]
    fn attribute_detector_requires_existing_node() {
        let store = MemoryStore::new();
        let mut session = store.session().unwrap();
        session.ensure_node("/content/tenant").unwrap();

        let detector = AttributeDetector::default();
        let hit = ContextRequest::new("/x").attribute("context-path", "/content/tenant/");
        let miss = ContextRequest::new("/x").attribute("context-path", "/content/none");
        assert_eq!(detector.detect(&hit, &session).as_deref(), Some("/content/tenant"));
        assert!(detector.detect(&miss, &session).is_none());
        assert!(detector.detect(&ContextRequest::new("/x"), &session).is_none());
    }

    #[test]
    fn chain_prefers_earlier_detectors() {
        let store = MemoryStore::new();
        let mut session = store.session().unwrap();
        session
            .put_properties("/content/site", with_ref("/conf/site".into()))
            .unwrap();
        session.ensure_node("/content/other").unwrap();

        let chain = DetectorChain::new(vec![
            Arc::new(AttributeDetector::default()) as Arc<dyn ContextResourceDetector>,
            Arc::new(ConfigRefDetector::default()),
        ]);
        assert_eq!(chain.names(), vec!["attribute", "config-ref"]);

        let request = ContextRequest::new("/content/site/page");
        assert_eq!(chain.detect(&request, &session).as_deref(), Some("/content/site"));

        let request = request.attribute("context-path", "/content/other");
        assert_eq!(chain.detect(&request, &session).as_deref(), Some("/content/other"));

        assert!(DetectorChain::default()
            .detect(&ContextRequest::new("/content/site"), &session)
            .is_none());
    }
}
