//! Host boundary
//!
//! The custom-element runtime (registry, DOM tree, rendering) is external.
//! [`ElementHost`] is the narrow contract the adapter needs from it:
//! shadow-root creation with template stamping, attribute enumeration, and
//! the element's tag name for diagnostics. [`MemoryHost`] is the in-memory
//! implementation used by tests and demos.

/// The callback contract an element host must provide.
pub trait ElementHost {
    /// Create the element's shadow root and stamp the template into it
    fn stamp_template(&mut self, template: &str);

    /// The element's current attributes, in document order
    fn attributes(&self) -> Vec<(String, String)>;

    /// The element's local (tag) name
    fn local_name(&self) -> &str;
}

/// In-memory host: records what the adapter asked for.
#[derive(Debug, Default)]
pub struct MemoryHost {
    local_name: String,
    attributes: Vec<(String, String)>,
    shadow_content: Option<String>,
}

impl MemoryHost {
    /// Create a host for the given tag name
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            attributes: Vec::new(),
            shadow_content: None,
        }
    }

    /// Pre-set an attribute (as if written in markup)
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// The stamped shadow content, if any
    pub fn shadow_content(&self) -> Option<&str> {
        self.shadow_content.as_deref()
    }
}

impl ElementHost for MemoryHost {
    fn stamp_template(&mut self, template: &str) {
        self.shadow_content = Some(template.to_string());
    }

    fn attributes(&self) -> Vec<(String, String)> {
        self.attributes.clone()
    }

    fn local_name(&self) -> &str {
        &self.local_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_host_records_stamp() {
        let mut host = MemoryHost::new("x-test").with_attribute("role", "button");
        assert_eq!(host.shadow_content(), None);
        host.stamp_template("<span>Hi</span>");
        assert_eq!(host.shadow_content(), Some("<span>Hi</span>"));
        assert_eq!(host.local_name(), "x-test");
        assert_eq!(host.attributes(), vec![("role".to_string(), "button".to_string())]);
    }
}
