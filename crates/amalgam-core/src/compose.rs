//! Mixin application and the composition facade
//!
//! [`apply_mixin`] merges one mixin onto one base, producing a new derived
//! definition; [`Composable::compose`] folds an ordered mixin list through
//! it. Composition never mutates its inputs: every step returns a fresh
//! definition whose base link points at the previous step's result, so
//! `base.compose(&[a, b, c])` and
//! `base.compose(&[a])?.compose(&[b])?.compose(&[c])` are equivalent.

use rustc_hash::FxHashMap;

use std::sync::Arc;

use crate::definition::{DefRef, Definition};
use crate::instance::Instance;
use crate::member::Member;
use crate::rules::{Rule, RuleContext};
use crate::{EngineError, EngineResult};

/// Merge one mixin onto a base, returning the derived definition.
///
/// Steps:
/// - if the mixin has a non-trivial base of its own, apply that base to the
///   current base first, so the final chain includes the mixin's dependency
///   exactly once, in dependency order;
/// - copy the mixin's own members (never `constructor`) onto the new
///   definition, resolving every collision with the base chain through a
///   composition rule (explicit annotation, then rule table, then kind
///   default);
/// - for class-like pairs, copy the mixin's static members with plain
///   override semantics;
/// - if the mixin is named, mark the result as the frame for that name and
///   record the base as its superclass.
pub fn apply_mixin(base: &DefRef, mixin: &DefRef) -> EngineResult<DefRef> {
    let mut base = Arc::clone(base);
    if let Some(mixin_base) = mixin.superclass() {
        if !is_trivial_base(mixin_base) {
            base = apply_mixin(&base, mixin_base)?;
        }
    }

    // The derived definition takes the base's kind: subclassing a
    // class-like base, chaining a plain one.
    let kind = base.kind();

    let mut members: FxHashMap<String, Member> = FxHashMap::default();
    for (name, member) in mixin.own_members() {
        if name == "constructor" {
            continue;
        }
        members.insert(name.to_string(), member.clone());
    }

    let mut statics: FxHashMap<String, Member> = FxHashMap::default();
    if base.is_class_like() && mixin.is_class_like() {
        for (name, member) in mixin.own_statics() {
            statics.insert(name.to_string(), member.clone());
        }
    }

    // The new definition's own rule table comes from the mixin; entries
    // further down the chain stay reachable through chain lookup.
    let rules = mixin.own_rules().clone();

    let context = RuleContext::new(&base);
    let mut merged: FxHashMap<String, Member> = FxHashMap::default();
    for (name, member) in members {
        if base.has_member(&name) {
            let rule = member
                .rule()
                .cloned()
                .or_else(|| rules.get(&name).cloned())
                .or_else(|| base.find_rule(&name).cloned())
                .unwrap_or_else(|| Rule::default_for(member.kind()));
            if rule.is_override() {
                // The copied member already masks the base member.
                merged.insert(name, member);
            } else {
                let resolved = rule.apply(&context, &name, member)?;
                resolved.validate(&name)?;
                merged.insert(name, resolved);
            }
        } else {
            merged.insert(name, member);
        }
    }

    let applied_mixin = mixin.name().map(str::to_string);

    Ok(Arc::new(Definition::from_parts(
        None,
        kind,
        Some(base),
        merged,
        statics,
        rules,
        applied_mixin,
    )))
}

/// An anonymous, memberless, baseless definition (such as
/// [`Definition::root`]) contributes nothing to a chain; splicing it would
/// only add an inert frame.
fn is_trivial_base(definition: &DefRef) -> bool {
    definition.name().is_none()
        && definition.superclass().is_none()
        && definition.own_members().next().is_none()
}

/// The composition facade, implemented for [`DefRef`].
///
/// Definitions are always handled through shared [`DefRef`] handles, and
/// back-reference identity is handle identity, so the facade lives on the
/// handle type rather than on [`Definition`] itself.
pub trait Composable {
    /// Compose an ordered list of mixins onto this definition.
    ///
    /// Applies [`apply_mixin`] once per mixin, left to right, seeding with
    /// this definition, so `base.compose(&[a, b])` equals
    /// `base.compose(&[a])?.compose(&[b])`. An empty list yields a clone of
    /// this handle (observably identical).
    fn compose(&self, mixins: &[DefRef]) -> EngineResult<DefRef>;

    /// Retroactively annotate already-declared members with composition
    /// rules, returning a new definition.
    ///
    /// Declaration syntax alone cannot express "use this rule when merged";
    /// `decorate` attaches the rule after the fact. Every named member must
    /// be declared directly on this definition.
    fn decorate(&self, rules: &[(&str, Rule)]) -> EngineResult<DefRef>;

    /// Find the chain frame produced by applying the named mixin.
    ///
    /// Every composition step that applies a *named* mixin marks its result
    /// with the mixin's name. Code holding any later frame of the chain can
    /// use this to get back to "the point where mixin X was applied", most
    /// often combined with [`Definition::superclass`] to delegate to the
    /// definition beneath it. Frames are per chain: two chains that each
    /// apply mixin X have independent frames.
    fn mixin_frame(&self, name: &str) -> Option<&DefRef>;

    /// Instantiate this definition
    fn instantiate(&self) -> Instance;
}

impl Composable for DefRef {
    fn compose(&self, mixins: &[DefRef]) -> EngineResult<DefRef> {
        let mut current = Arc::clone(self);
        for mixin in mixins {
            current = apply_mixin(&current, mixin)?;
        }
        Ok(current)
    }

    fn decorate(&self, rules: &[(&str, Rule)]) -> EngineResult<DefRef> {
        let mut members: FxHashMap<String, Member> = FxHashMap::default();
        for (name, member) in self.own_members() {
            members.insert(name.to_string(), member.clone());
        }
        for (name, rule) in rules {
            let member = members
                .remove(*name)
                .ok_or_else(|| EngineError::UnknownMember(name.to_string()))?;
            members.insert(name.to_string(), member.with_rule(rule.clone()));
        }

        let mut statics: FxHashMap<String, Member> = FxHashMap::default();
        for (name, member) in self.own_statics() {
            statics.insert(name.to_string(), member.clone());
        }

        Ok(Arc::new(Definition::from_parts(
            self.name().map(str::to_string),
            self.kind(),
            self.superclass().cloned(),
            members,
            statics,
            self.own_rules().clone(),
            self.applied_mixin().map(str::to_string),
        )))
    }

    fn mixin_frame(&self, name: &str) -> Option<&DefRef> {
        let mut current = self;
        loop {
            if current.applied_mixin() == Some(name) {
                return Some(current);
            }
            match current.superclass() {
                Some(base) => current = base,
                None => return None,
            }
        }
    }

    fn instantiate(&self) -> Instance {
        Instance::new(Arc::clone(self))
    }
}
