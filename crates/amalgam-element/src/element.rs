//! Element lifecycle adapter
//!
//! Wires a composed definition into the custom-element lifecycle: on
//! creation the adapter stamps the chain's `template` property into the
//! host's shadow root, marshals already-present attributes onto properties,
//! and invokes the chain's `createdCallback` method (composed callbacks run
//! base-first per the propagate-function rule). Attribute-change
//! notifications from the host are routed to the camelCase property of the
//! same name, when the chain declares one.

use amalgam_core::{DefRef, Definition, DefinitionBuilder, EngineResult, Instance, Value};

use crate::host::ElementHost;
use crate::names::attribute_to_property_name;

/// Property consulted for shadow content at creation time
pub const TEMPLATE_MEMBER: &str = "template";

/// Method invoked after stamping and marshalling at creation time
pub const CREATED_CALLBACK: &str = "createdCallback";

/// The base definition custom elements compose onto.
///
/// Deliberately empty: the lifecycle behavior lives in [`Element`], not in
/// members, so element definitions stay pure data for the composition
/// engine.
pub fn element_base() -> DefRef {
    DefinitionBuilder::class("ElementBase")
        .base(Definition::root())
        .build()
}

/// A live element: a composed definition's instance bound to a host.
#[derive(Debug)]
pub struct Element<H: ElementHost> {
    host: H,
    instance: Instance,
}

impl<H: ElementHost> Element<H> {
    /// Create the element and run the creation lifecycle: template
    /// stamping, attribute marshalling, then `createdCallback`.
    pub fn new(definition: DefRef, host: H) -> EngineResult<Self> {
        let mut element = Self {
            host,
            instance: Instance::new(definition),
        };
        element.created()?;
        Ok(element)
    }

    fn created(&mut self) -> EngineResult<()> {
        // The template member may be declared as a getter or a method.
        let member_shape = self
            .instance
            .definition()
            .find_member(TEMPLATE_MEMBER)
            .map(|member| {
                let readable = member
                    .as_accessor()
                    .is_some_and(|(get, _)| get.is_some());
                (member.is_method(), readable)
            });
        let template = match member_shape {
            Some((true, _)) => Some(self.instance.call(TEMPLATE_MEMBER, &[])?),
            Some((_, true)) => Some(self.instance.get(TEMPLATE_MEMBER)?),
            // Setter-only template accessor: nothing to read.
            _ => None,
        };
        if let Some(html) = template.as_ref().and_then(|t| t.as_str()) {
            self.host.stamp_template(html);
        }
        for (name, value) in self.host.attributes() {
            self.attribute_changed(&name, None, &value)?;
        }
        if self.instance.definition().has_member(CREATED_CALLBACK) {
            self.instance.call(CREATED_CALLBACK, &[])?;
        }
        Ok(())
    }

    /// Handle an attribute-change notification from the host.
    ///
    /// If the hyphenated attribute name maps to a property the element
    /// exposes, the property is assigned the new value; unknown attributes
    /// are ignored.
    pub fn attribute_changed(
        &mut self,
        name: &str,
        _old: Option<&str>,
        new: &str,
    ) -> EngineResult<()> {
        let property = attribute_to_property_name(name);
        if self.instance.has_property(&property) {
            self.instance.set(&property, Value::str(new))?;
        }
        Ok(())
    }

    /// Simulate a markup attribute write: the host owns the attribute, the
    /// adapter only sees the change notification.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> EngineResult<()> {
        self.attribute_changed(name, None, value)
    }

    /// Format a diagnostic line prefixed with the element's tag name
    pub fn log(&self, text: &str) -> String {
        format!("{}: {}", self.host.local_name(), text)
    }

    /// The element's instance
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// The element's instance, mutable
    pub fn instance_mut(&mut self) -> &mut Instance {
        &mut self.instance
    }

    /// The bound host
    pub fn host(&self) -> &H {
        &self.host
    }
}
