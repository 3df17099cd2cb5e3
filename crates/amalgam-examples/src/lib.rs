//! Demo element definitions
//!
//! Small element classes built on the composition engine and the element
//! adapter, exercised by the crate's end-to-end tests.

#![warn(rust_2018_idioms)]

use amalgam_core::{Composable, DefRef, DefinitionBuilder, EngineResult, Instance, Value};
use amalgam_element::{element_base, CREATED_CALLBACK, TEMPLATE_MEMBER};

fn push_trace(instance: &mut Instance, entry: &str) {
    let mut trace = instance
        .own_property("createdTrace")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    if !trace.is_empty() {
        trace.push(',');
    }
    trace.push_str(entry);
    instance.set_own_property("createdTrace", Value::str(trace));
}

/// A greeting element: templated shadow content plus a `punctuation`
/// property controlling how the greeting ends.
pub fn greet_element() -> DefRef {
    DefinitionBuilder::class("GreetElement")
        .base(element_base())
        .getter(TEMPLATE_MEMBER, |_| {
            Ok(Value::str(
                "Hello, <content></content><span id=\"punctuation\">.</span>",
            ))
        })
        .getter("punctuation", |instance| {
            Ok(instance
                .own_property("punctuation_text")
                .cloned()
                .unwrap_or_else(|| Value::str(".")))
        })
        .setter("punctuation", |instance, value| {
            instance.set_own_property("punctuation_text", value);
            Ok(())
        })
        .method(CREATED_CALLBACK, |instance, _| {
            instance.set_own_property("greeted", Value::Bool(true));
            push_trace(instance, "greet");
            Ok(Value::Undefined)
        })
        .build()
}

/// A component class assembled purely through composition over plain-object
/// mixins, the engine's substitute for subclass declaration syntax.
pub fn composed_component() -> EngineResult<DefRef> {
    let members = DefinitionBuilder::plain()
        .getter("customProperty", |_| Ok(Value::str("property")))
        .method("method", |_, _| Ok(Value::str("method")))
        .getter("value", |_| Ok(Value::str("value")))
        .build();
    element_base().compose(&[members])
}

/// A mixin contributing a `createdCallback`; composing it onto a templated
/// element runs both callbacks, base first.
pub fn created_callback_mixin() -> DefRef {
    DefinitionBuilder::class("CreatedMixin")
        .method(CREATED_CALLBACK, |instance, _| {
            instance.set_own_property("mixinCallbackInvoked", Value::Bool(true));
            push_trace(instance, "mixin");
            Ok(Value::Undefined)
        })
        .build()
}
