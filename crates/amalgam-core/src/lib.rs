//! Amalgam composition engine
//!
//! This crate provides the mixin composition engine:
//! - Dynamic value model ([`Value`])
//! - Definitions with explicit ownership chains ([`Definition`])
//! - Per-member composition rules ([`Rule`])
//! - Mixin application and the `compose`/`decorate` facade
//! - Runtime instance dispatch ([`Instance`])
//!
//! A definition is a bundle of methods and accessor pairs plus a link to at
//! most one base definition. [`Composable::compose`] merges an ordered list
//! of mixin definitions onto a base, resolving member conflicts through a
//! pluggable per-member rule policy and recording back-references so
//! composed code can delegate to "superclass" behavior.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod compose;
pub mod definition;
pub mod instance;
pub mod member;
pub mod rules;
pub mod value;

pub use compose::{apply_mixin, Composable};
pub use definition::{DefRef, Definition, DefinitionBuilder, DefinitionKind};
pub use instance::Instance;
pub use member::{GetterFn, Member, MemberKind, MethodFn, SetterFn};
pub use rules::{Rule, RuleContext, RuleFn};
pub use value::Value;

/// Composition and dispatch errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Default resolution met a method/accessor kind conflict
    #[error("cannot merge member `{0}`: method and accessor kinds conflict")]
    MemberKindMismatch(String),

    /// A composition rule produced a member that cannot be installed
    #[error("composition rule for `{name}` produced an invalid member: {reason}")]
    InvalidRuleResult {
        /// The conflicting member's name
        name: String,
        /// Why the rule output was rejected
        reason: String,
    },

    /// No member with this name is declared
    #[error("unknown member `{0}`")]
    UnknownMember(String),

    /// The member is an accessor, not a method
    #[error("member `{0}` is not callable")]
    NotCallable(String),

    /// The member is a method, not a property
    #[error("member `{0}` is not a property")]
    NotAProperty(String),

    /// The property declares no getter
    #[error("property `{0}` has no getter")]
    NotReadable(String),

    /// The property declares no setter
    #[error("property `{0}` has no setter")]
    NotWritable(String),

    /// Error raised inside a composed member body; propagated unchanged
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Engine result alias
pub type EngineResult<T> = Result<T, EngineError>;
