//! End-to-end composition behavior tests.

use std::sync::Arc;

use amalgam_core::{
    Composable, DefRef, Definition, DefinitionBuilder, EngineError, Member, Rule, Value,
};

/// A base class with a method, a readable/writable property and a trace log.
fn base_definition() -> DefRef {
    DefinitionBuilder::class("Base")
        .base(Definition::root())
        .method("greet", |instance, _| {
            append_trace(instance, "base.greet");
            Ok(Value::str("base"))
        })
        .getter("value", |instance| {
            Ok(instance.own_property("stored").cloned().unwrap_or_default())
        })
        .setter("value", |instance, v| {
            let line = format!("base:{}", v);
            append_trace(instance, &line);
            instance.set_own_property("stored", v);
            Ok(())
        })
        .build()
}

fn append_trace(instance: &mut amalgam_core::Instance, entry: &str) {
    let mut trace = instance
        .own_property("trace")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    if !trace.is_empty() {
        trace.push(',');
    }
    trace.push_str(entry);
    instance.set_own_property("trace", Value::str(trace));
}

fn trace_of(instance: &amalgam_core::Instance) -> String {
    instance
        .own_property("trace")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

fn greeting_mixin(name: &str, reply: &'static str) -> DefRef {
    let label = format!("{}.greet", name.to_lowercase());
    DefinitionBuilder::class(name)
        .method("greet", move |instance, _| {
            append_trace(instance, &label);
            Ok(Value::str(reply))
        })
        .build()
}

#[test]
fn flat_composition_equals_stepwise_composition() {
    let a = greeting_mixin("A", "a");
    let c = greeting_mixin("C", "c");

    let flat = base_definition()
        .compose(&[Arc::clone(&a), Arc::clone(&c)])
        .unwrap();
    let stepwise = base_definition()
        .compose(&[a])
        .unwrap()
        .compose(&[c])
        .unwrap();

    let mut flat_instance = flat.instantiate();
    let mut step_instance = stepwise.instantiate();

    assert_eq!(
        flat_instance.call("greet", &[]).unwrap(),
        step_instance.call("greet", &[]).unwrap()
    );
    assert_eq!(trace_of(&flat_instance), trace_of(&step_instance));
    assert_eq!(trace_of(&flat_instance), "base.greet,a.greet,c.greet");
}

#[test]
fn composing_no_mixins_preserves_behavior() {
    let base = base_definition();
    let composed = base.compose(&[]).unwrap();
    let mut instance = composed.instantiate();

    assert_eq!(instance.call("greet", &[]).unwrap(), Value::str("base"));
    instance.set("value", Value::str("x")).unwrap();
    assert_eq!(instance.get("value").unwrap(), Value::str("x"));
}

#[test]
fn function_propagation_runs_base_then_returns_mixin_result() {
    let composed = base_definition()
        .compose(&[greeting_mixin("M", "mixin")])
        .unwrap();
    let mut instance = composed.instantiate();

    assert_eq!(instance.call("greet", &[]).unwrap(), Value::str("mixin"));
    assert_eq!(trace_of(&instance), "base.greet,m.greet");
}

#[test]
fn property_propagation_runs_setters_in_chain_order() {
    let mixin = DefinitionBuilder::class("M")
        .setter("value", |instance, v| {
            let line = format!("mixin:{}", v);
            append_trace(instance, &line);
            Ok(())
        })
        .build();
    let composed = base_definition().compose(&[mixin]).unwrap();
    let mut instance = composed.instantiate();

    instance.set("value", Value::str("x")).unwrap();
    assert_eq!(trace_of(&instance), "base:x,mixin:x");
    // Mixin declared no getter: the synthesized pass-through still reads
    // what the base setter stored.
    assert_eq!(instance.get("value").unwrap(), Value::str("x"));
}

#[test]
fn mixin_getter_replaces_base_getter_keeping_base_setter() {
    let mixin = DefinitionBuilder::class("M")
        .getter("value", |_| Ok(Value::str("mixin")))
        .build();
    let composed = base_definition().compose(&[mixin]).unwrap();
    let mut instance = composed.instantiate();

    assert_eq!(instance.get("value").unwrap(), Value::str("mixin"));
    // Writing still works through the synthesized pass-through setter.
    instance.set("value", Value::str("x")).unwrap();
    assert_eq!(instance.own_property("stored"), Some(&Value::str("x")));
}

#[test]
fn prefer_base_result_skips_mixin_when_base_answers() {
    let mixin = DefinitionBuilder::class("M")
        .member(
            "greet",
            Member::method(|instance, _| {
                instance.set_own_property("mixinRan", Value::Bool(true));
                Ok(Value::str("mixin"))
            })
            .with_rule(Rule::PreferBaseResult),
        )
        .build();
    let composed = base_definition().compose(&[mixin]).unwrap();
    let mut instance = composed.instantiate();

    assert_eq!(instance.call("greet", &[]).unwrap(), Value::str("base"));
    assert_eq!(instance.own_property("mixinRan"), None);
}

#[test]
fn prefer_mixin_result_skips_base_when_mixin_answers() {
    let mixin = DefinitionBuilder::class("M")
        .member(
            "greet",
            Member::method(|_, _| Ok(Value::str("mixin"))).with_rule(Rule::PreferMixinResult),
        )
        .build();
    let composed = base_definition().compose(&[mixin]).unwrap();
    let mut instance = composed.instantiate();

    assert_eq!(instance.call("greet", &[]).unwrap(), Value::str("mixin"));
    // Base body never ran, so no trace entry.
    assert_eq!(trace_of(&instance), "");
}

#[test]
fn named_mixin_installs_back_references() {
    let base = base_definition();
    let composed = base.compose(&[greeting_mixin("M", "mixin")]).unwrap();

    let frame = composed.mixin_frame("M").expect("frame for M");
    assert!(Arc::ptr_eq(frame, &composed));
    assert!(Arc::ptr_eq(frame.superclass().unwrap(), &base));
}

#[test]
fn super_delegation_through_back_reference() {
    // A mixin method that explicitly delegates to the definition beneath
    // its own frame, the engine's replacement for the `super` keyword.
    let mixin = DefinitionBuilder::class("M")
        .member(
            "greet",
            Member::method(|instance, args| {
                let chain = instance.definition().clone();
                let frame = chain.mixin_frame("M").expect("own frame");
                let below = frame.superclass().expect("super");
                let inherited = below
                    .find_member("greet")
                    .and_then(|m| m.as_method().cloned())
                    .expect("base greet");
                let prior = inherited(instance, args)?;
                Ok(Value::str(format!("{}+mixin", prior)))
            })
            .with_rule(Rule::Override),
        )
        .build();
    let composed = base_definition().compose(&[mixin]).unwrap();
    let mut instance = composed.instantiate();

    assert_eq!(instance.call("greet", &[]).unwrap(), Value::str("base+mixin"));
}

#[test]
fn base_error_prevents_mixin_body() {
    let failing_base = DefinitionBuilder::class("Failing")
        .method("go", |_, _| Err(EngineError::Runtime("boom".to_string())))
        .build();
    let mixin = DefinitionBuilder::class("M")
        .method("go", |instance, _| {
            instance.set_own_property("mixinRan", Value::Bool(true));
            Ok(Value::str("mixin"))
        })
        .build();
    let composed = failing_base.compose(&[mixin]).unwrap();
    let mut instance = composed.instantiate();

    let err = instance.call("go", &[]).unwrap_err();
    assert!(matches!(err, EngineError::Runtime(_)));
    assert_eq!(instance.own_property("mixinRan"), None);
}

#[test]
fn plain_object_chains_compose_like_classes() {
    let base = DefinitionBuilder::plain()
        .method("describe", |_, _| Ok(Value::str("plain-base")))
        .build();
    let mixin = DefinitionBuilder::plain()
        .name("Extras")
        .method("describe", |_, _| Ok(Value::str("extras")))
        .method("only", |_, _| Ok(Value::str("only")))
        .build();
    let composed = base.compose(&[mixin]).unwrap();
    assert!(!composed.is_class_like());

    let mut instance = composed.instantiate();
    assert_eq!(instance.call("describe", &[]).unwrap(), Value::str("extras"));
    assert_eq!(instance.call("only", &[]).unwrap(), Value::str("only"));
    assert!(composed.mixin_frame("Extras").is_some());
}

#[test]
fn three_mixin_chain_keeps_dependency_order() {
    let a = greeting_mixin("A", "a");
    let b = greeting_mixin("B", "b");
    let c = greeting_mixin("C", "c");
    let composed = base_definition().compose(&[a, b, c]).unwrap();
    let mut instance = composed.instantiate();

    assert_eq!(instance.call("greet", &[]).unwrap(), Value::str("c"));
    assert_eq!(trace_of(&instance), "base.greet,a.greet,b.greet,c.greet");

    // Every named frame is reachable, each above the previous.
    let c_frame = composed.mixin_frame("C").unwrap();
    let b_frame = c_frame.superclass().unwrap().mixin_frame("B").unwrap();
    let a_frame = b_frame.superclass().unwrap().mixin_frame("A").unwrap();
    assert_eq!(a_frame.applied_mixin(), Some("A"));
}
