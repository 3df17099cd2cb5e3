//! Definitions and the ownership chain
//!
//! A definition is a named or anonymous bundle of members plus a link to at
//! most one parent definition (its base). Member lookup is an explicit walk
//! over this owned structure rather than language-level delegation; the
//! chain is acyclic by construction and terminates at a root with no base.
//!
//! Definitions are immutable once built and shared via [`DefRef`]. Each
//! composition step produces a new child definition; a previously returned
//! definition is never edited in place.

use rustc_hash::FxHashMap;

use std::sync::Arc;

use crate::member::{GetterFn, Member, MemberKind, SetterFn};
use crate::rules::{root_rule_table, Rule};
use crate::value::Value;
use crate::{EngineResult, Instance};

/// Shared handle to an immutable definition.
pub type DefRef = Arc<Definition>;

/// Whether a definition is invocable as a constructor or a plain template.
///
/// An explicit tag rather than runtime type-sniffing; both variants share
/// the same composition algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    /// Invocable as a constructor; carries static members
    ClassLike,
    /// A plain data/object template
    Plain,
}

/// A class-like or plain bundle of members.
#[derive(Debug)]
pub struct Definition {
    name: Option<String>,
    kind: DefinitionKind,
    base: Option<DefRef>,
    members: FxHashMap<String, Member>,
    statics: FxHashMap<String, Member>,
    rules: FxHashMap<String, Rule>,
    applied_mixin: Option<String>,
}

impl Definition {
    /// The root definition: class-like, no base, default rule table.
    ///
    /// The default table leaves `constructor` to standard override
    /// semantics, so it is never merged anywhere down the chain.
    pub fn root() -> DefRef {
        Arc::new(Definition {
            name: None,
            kind: DefinitionKind::ClassLike,
            base: None,
            members: FxHashMap::default(),
            statics: FxHashMap::default(),
            rules: root_rule_table(),
            applied_mixin: None,
        })
    }

    pub(crate) fn from_parts(
        name: Option<String>,
        kind: DefinitionKind,
        base: Option<DefRef>,
        members: FxHashMap<String, Member>,
        statics: FxHashMap<String, Member>,
        rules: FxHashMap<String, Rule>,
        applied_mixin: Option<String>,
    ) -> Definition {
        Definition {
            name,
            kind,
            base,
            members,
            statics,
            rules,
            applied_mixin,
        }
    }

    /// The definition's identifying name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The definition's kind tag
    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    /// Whether this definition is class-like
    pub fn is_class_like(&self) -> bool {
        self.kind == DefinitionKind::ClassLike
    }

    /// The immediate parent definition ("super" in a composed chain)
    pub fn superclass(&self) -> Option<&DefRef> {
        self.base.as_ref()
    }

    /// Members declared directly on this definition (not inherited)
    pub fn own_members(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// A member declared directly on this definition
    pub fn own_member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    /// Static members declared directly on this definition
    pub fn own_statics(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.statics.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Rule-table entries declared directly on this definition
    pub(crate) fn own_rules(&self) -> &FxHashMap<String, Rule> {
        &self.rules
    }

    /// Look up a member, walking the ownership chain until found or
    /// exhausted.
    pub fn find_member(&self, name: &str) -> Option<&Member> {
        let mut current = self;
        loop {
            if let Some(member) = current.members.get(name) {
                return Some(member);
            }
            match &current.base {
                Some(base) => current = base.as_ref(),
                None => return None,
            }
        }
    }

    /// Whether the chain exposes a member with this name
    pub fn has_member(&self, name: &str) -> bool {
        self.find_member(name).is_some()
    }

    /// Look up a static member through the chain
    pub fn find_static(&self, name: &str) -> Option<&Member> {
        let mut current = self;
        loop {
            if let Some(member) = current.statics.get(name) {
                return Some(member);
            }
            match &current.base {
                Some(base) => current = base.as_ref(),
                None => return None,
            }
        }
    }

    /// Look up a per-member composition rule through the chain
    ///
    /// Rule tables are inherited the same way plain members are: the
    /// nearest table entry for the name wins.
    pub fn find_rule(&self, name: &str) -> Option<&Rule> {
        let mut current = self;
        loop {
            if let Some(rule) = current.rules.get(name) {
                return Some(rule);
            }
            match &current.base {
                Some(base) => current = base.as_ref(),
                None => return None,
            }
        }
    }

    /// The name of the mixin whose application produced this frame, if any
    pub fn applied_mixin(&self) -> Option<&str> {
        self.applied_mixin.as_deref()
    }
}

/// Fluent construction of definitions.
///
/// ```
/// use amalgam_core::{Definition, DefinitionBuilder, Value};
///
/// let greeter = DefinitionBuilder::class("Greeter")
///     .base(Definition::root())
///     .method("greet", |_, _| Ok(Value::str("hello")))
///     .build();
/// assert!(greeter.has_member("greet"));
/// ```
pub struct DefinitionBuilder {
    name: Option<String>,
    kind: DefinitionKind,
    base: Option<DefRef>,
    members: FxHashMap<String, Member>,
    statics: FxHashMap<String, Member>,
    rules: FxHashMap<String, Rule>,
}

impl DefinitionBuilder {
    /// Start a named class-like definition
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: DefinitionKind::ClassLike,
            base: None,
            members: FxHashMap::default(),
            statics: FxHashMap::default(),
            rules: FxHashMap::default(),
        }
    }

    /// Start an anonymous plain-object definition
    pub fn plain() -> Self {
        Self {
            name: None,
            kind: DefinitionKind::Plain,
            base: None,
            members: FxHashMap::default(),
            statics: FxHashMap::default(),
            rules: FxHashMap::default(),
        }
    }

    /// Name the definition (plain objects may be named mixins too)
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Link the definition to its base
    pub fn base(mut self, base: DefRef) -> Self {
        self.base = Some(base);
        self
    }

    /// Declare a method member
    pub fn method<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> EngineResult<Value> + Send + Sync + 'static,
    {
        self.member(name, Member::method(f))
    }

    /// Declare (or extend) a getter for a property
    pub fn getter<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Instance) -> EngineResult<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let get: GetterFn = Arc::new(f);
        self.merge_accessor(name, Some(get), None);
        self
    }

    /// Declare (or extend) a setter for a property
    pub fn setter<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Instance, Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        let name = name.into();
        let set: SetterFn = Arc::new(f);
        self.merge_accessor(name, None, Some(set));
        self
    }

    /// Declare a fully-built member (e.g. one annotated with a rule)
    pub fn member(mut self, name: impl Into<String>, member: Member) -> Self {
        self.members.insert(name.into(), member);
        self
    }

    /// Declare a static method member
    pub fn static_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> EngineResult<Value> + Send + Sync + 'static,
    {
        self.statics.insert(name.into(), Member::method(f));
        self
    }

    /// Add a rule-table entry: when the named member conflicts during a
    /// later composition, resolve it with this rule. Inherited by derived
    /// definitions via chain lookup.
    pub fn rule_for(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.rules.insert(name.into(), rule);
        self
    }

    fn merge_accessor(&mut self, name: String, get: Option<GetterFn>, set: Option<SetterFn>) {
        let merged = match self.members.remove(&name) {
            Some(existing) => match existing.kind() {
                MemberKind::Accessor {
                    get: old_get,
                    set: old_set,
                } => {
                    let rule = existing.rule().cloned();
                    let member = Member::accessor(
                        get.or_else(|| old_get.clone()),
                        set.or_else(|| old_set.clone()),
                    );
                    match rule {
                        Some(r) => member.with_rule(r),
                        None => member,
                    }
                }
                // A getter/setter declaration replaces a method of the
                // same name outright.
                MemberKind::Method(_) => Member::accessor(get, set),
            },
            None => Member::accessor(get, set),
        };
        self.members.insert(name, merged);
    }

    /// Build the immutable definition
    pub fn build(self) -> DefRef {
        Arc::new(Definition {
            name: self.name,
            kind: self.kind,
            base: self.base,
            members: self.members,
            statics: self.statics,
            rules: self.rules,
            applied_mixin: None,
        })
    }
}
