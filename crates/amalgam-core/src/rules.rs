//! Composition rules
//!
//! When a mixin member collides with a member the base chain already
//! exposes, exactly one rule decides how the two are merged. Rules are pure:
//! they take the conflicting name, the incoming (mixin-side) member and a
//! read-only view of the base chain, and return the member to install.
//!
//! Rule selection priority (highest first):
//! 1. an explicit annotation on the incoming member ([`Member::with_rule`]);
//! 2. a rule-table entry for the name, found by chain lookup;
//! 3. the default for the member's kind: methods propagate
//!    ([`Rule::PropagateFunction`]), accessors propagate
//!    ([`Rule::PropagateProperty`]).

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use std::fmt;
use std::sync::Arc;

use crate::definition::DefRef;
use crate::member::{GetterFn, Member, MemberKind, MethodFn, SetterFn};
use crate::{EngineError, EngineResult};

/// A custom rule body: `(target view, member name, incoming member) ->
/// merged member`.
pub type RuleFn =
    Arc<dyn Fn(&RuleContext<'_>, &str, Member) -> EngineResult<Member> + Send + Sync>;

/// Merge strategy applied to one conflicting member.
#[derive(Clone)]
pub enum Rule {
    /// Mixin member wins outright. Recognized as a no-op: the copied mixin
    /// member already masks the base member, so nothing is reinstalled.
    Override,

    /// Run base then mixin; return the mixin's result. Default for methods.
    PropagateFunction,

    /// Compose setters base-first; a mixin getter replaces the base getter.
    /// Default for accessors.
    PropagateProperty,

    /// Run base; return its result if truthy, otherwise run mixin and
    /// return that.
    PreferBaseResult,

    /// Run mixin; return its result if truthy, otherwise run base and
    /// return that.
    PreferMixinResult,

    /// Author-supplied merge function (see [`Rule::from_fn`])
    Custom(RuleFn),
}

impl Rule {
    /// Wrap a raw rule function for attachment to a member declaration
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&RuleContext<'_>, &str, Member) -> EngineResult<Member> + Send + Sync + 'static,
    {
        Rule::Custom(Arc::new(f))
    }

    /// Whether this is the no-op override rule
    pub fn is_override(&self) -> bool {
        matches!(self, Rule::Override)
    }

    /// The default rule inferred from a member's kind
    pub fn default_for(kind: &MemberKind) -> Rule {
        match kind {
            MemberKind::Method(_) => Rule::PropagateFunction,
            MemberKind::Accessor { .. } => Rule::PropagateProperty,
        }
    }

    /// Apply this rule to one conflicting member.
    ///
    /// `incoming` is the mixin-side member; the base-side member is reached
    /// through `ctx`. If the base chain does not actually expose the name,
    /// the incoming member is returned unchanged (merge with nothing).
    pub fn apply(
        &self,
        ctx: &RuleContext<'_>,
        name: &str,
        incoming: Member,
    ) -> EngineResult<Member> {
        match self {
            Rule::Override => Ok(incoming),
            Rule::PropagateFunction => propagate_function(ctx, name, incoming),
            Rule::PropagateProperty => propagate_property(ctx, name, incoming),
            Rule::PreferBaseResult => prefer_result(ctx, name, incoming, Preference::Base),
            Rule::PreferMixinResult => prefer_result(ctx, name, incoming, Preference::Mixin),
            Rule::Custom(f) => {
                let merged = f(ctx, name, incoming)?;
                merged.validate(name)?;
                Ok(merged)
            }
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::Override => "Override",
            Rule::PropagateFunction => "PropagateFunction",
            Rule::PropagateProperty => "PropagateProperty",
            Rule::PreferBaseResult => "PreferBaseResult",
            Rule::PreferMixinResult => "PreferMixinResult",
            Rule::Custom(_) => "Custom",
        };
        write!(f, "{}", name)
    }
}

/// Read-only view of the composition target handed to rules.
///
/// Exposes the base chain beneath the definition being built, which is
/// where rules find the implementation they are composing over.
pub struct RuleContext<'a> {
    base: &'a DefRef,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(base: &'a DefRef) -> Self {
        Self { base }
    }

    /// Look up the base-side member for a name (chain lookup)
    pub fn base_member(&self, name: &str) -> Option<&Member> {
        self.base.find_member(name)
    }
}

enum Preference {
    Base,
    Mixin,
}

/// Run base, discard its result, run mixin, return mixin's result.
///
/// Both bodies run on every call with the original receiver and arguments;
/// an error from the base body propagates unchanged and the mixin body does
/// not run.
fn propagate_function(ctx: &RuleContext<'_>, name: &str, incoming: Member) -> EngineResult<Member> {
    let Some(base) = ctx.base_member(name) else {
        return Ok(incoming);
    };
    let base_impl = method_impl(base, name)?.clone();
    let mixin_impl = method_impl(&incoming, name)?.clone();
    Ok(Member::from_kind(MemberKind::Method(compose_methods(
        base_impl, mixin_impl,
    ))))
}

/// Compose accessor pairs.
///
/// Only setters compose (base first, then mixin, same value and receiver).
/// A mixin getter replaces the base getter outright. Asymmetric
/// declarations are reconciled so no read or write capability present on
/// the base is lost: the missing half falls through to the base's half.
fn propagate_property(ctx: &RuleContext<'_>, name: &str, incoming: Member) -> EngineResult<Member> {
    let Some(base) = ctx.base_member(name) else {
        return Ok(incoming);
    };
    let (base_get, base_set) = accessor_halves(base, name)?;
    let (mixin_get, mixin_set) = accessor_halves(&incoming, name)?;

    let get = match (mixin_get, base_get) {
        (Some(g), _) => Some(g.clone()),
        // Pass-through getter: simply calls the base getter.
        (None, Some(g)) => Some(g.clone()),
        (None, None) => None,
    };
    let set = match (mixin_set, base_set) {
        (Some(m), Some(b)) => Some(compose_setters(b.clone(), m.clone())),
        (Some(m), None) => Some(m.clone()),
        // Pass-through setter: simply calls the base setter.
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    };
    Ok(Member::accessor(get, set))
}

/// Short-circuit composition: evaluate the preferred side first and only
/// fall through to the other side when the result is falsy.
fn prefer_result(
    ctx: &RuleContext<'_>,
    name: &str,
    incoming: Member,
    preference: Preference,
) -> EngineResult<Member> {
    let Some(base) = ctx.base_member(name) else {
        return Ok(incoming);
    };
    let base_impl = method_impl(base, name)?.clone();
    let mixin_impl = method_impl(&incoming, name)?.clone();
    let (first, second) = match preference {
        Preference::Base => (base_impl, mixin_impl),
        Preference::Mixin => (mixin_impl, base_impl),
    };
    let composed: MethodFn = Arc::new(move |instance, args| {
        let result = first(instance, args)?;
        if result.is_truthy() {
            Ok(result)
        } else {
            second(instance, args)
        }
    });
    Ok(Member::from_kind(MemberKind::Method(composed)))
}

/// Sequence two method bodies; the composed body returns the second's
/// result.
fn compose_methods(first: MethodFn, second: MethodFn) -> MethodFn {
    Arc::new(move |instance, args| {
        first(instance, args)?;
        second(instance, args)
    })
}

/// Sequence two setter bodies over the same value.
fn compose_setters(first: SetterFn, second: SetterFn) -> SetterFn {
    Arc::new(move |instance, value| {
        first(instance, value.clone())?;
        second(instance, value)
    })
}

fn method_impl<'m>(member: &'m Member, name: &str) -> EngineResult<&'m MethodFn> {
    member
        .as_method()
        .ok_or_else(|| EngineError::MemberKindMismatch(name.to_string()))
}

fn accessor_halves<'m>(
    member: &'m Member,
    name: &str,
) -> EngineResult<(Option<&'m GetterFn>, Option<&'m SetterFn>)> {
    member
        .as_accessor()
        .ok_or_else(|| EngineError::MemberKindMismatch(name.to_string()))
}

static ROOT_RULES: Lazy<FxHashMap<String, Rule>> = Lazy::new(|| {
    let mut table = FxHashMap::default();
    // Constructors always use standard override semantics.
    table.insert("constructor".to_string(), Rule::Override);
    table
});

/// The rule table seeded onto the root definition
pub(crate) fn root_rule_table() -> FxHashMap<String, Rule> {
    ROOT_RULES.clone()
}
