//! Members: methods and accessor pairs
//!
//! A member is a named slot on a definition: either a callable method or a
//! getter/setter pair. Members may carry an explicit composition-rule
//! annotation chosen by their author; the annotation travels in the member
//! itself (an explicit side-table, not hidden metadata on the function
//! value) and takes priority over inherited rule tables during composition.

use std::fmt;
use std::sync::Arc;

use crate::instance::Instance;
use crate::rules::Rule;
use crate::value::Value;
use crate::{EngineError, EngineResult};

/// A method body: receives the original receiver and the call's arguments.
pub type MethodFn = Arc<dyn Fn(&mut Instance, &[Value]) -> EngineResult<Value> + Send + Sync>;

/// A getter body: receives the receiver read-only.
pub type GetterFn = Arc<dyn Fn(&Instance) -> EngineResult<Value> + Send + Sync>;

/// A setter body: receives the receiver and the new value.
pub type SetterFn = Arc<dyn Fn(&mut Instance, Value) -> EngineResult<()> + Send + Sync>;

/// The kind of a member.
#[derive(Clone)]
pub enum MemberKind {
    /// A callable method
    Method(MethodFn),

    /// A getter/setter pair; at least one side is present
    Accessor {
        /// Getter, if declared
        get: Option<GetterFn>,
        /// Setter, if declared
        set: Option<SetterFn>,
    },
}

impl MemberKind {
    /// Kind name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            MemberKind::Method(_) => "method",
            MemberKind::Accessor { .. } => "accessor",
        }
    }
}

impl fmt::Debug for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Method(_) => write!(f, "Method"),
            MemberKind::Accessor { get, set } => write!(
                f,
                "Accessor {{ get: {}, set: {} }}",
                get.is_some(),
                set.is_some()
            ),
        }
    }
}

/// A single member of a definition.
#[derive(Clone)]
pub struct Member {
    kind: MemberKind,
    rule: Option<Rule>,
}

impl Member {
    /// Create a method member
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> EngineResult<Value> + Send + Sync + 'static,
    {
        Self {
            kind: MemberKind::Method(Arc::new(f)),
            rule: None,
        }
    }

    /// Create a getter-only accessor member
    pub fn getter<F>(f: F) -> Self
    where
        F: Fn(&Instance) -> EngineResult<Value> + Send + Sync + 'static,
    {
        Self {
            kind: MemberKind::Accessor {
                get: Some(Arc::new(f)),
                set: None,
            },
            rule: None,
        }
    }

    /// Create a setter-only accessor member
    pub fn setter<F>(f: F) -> Self
    where
        F: Fn(&mut Instance, Value) -> EngineResult<()> + Send + Sync + 'static,
    {
        Self {
            kind: MemberKind::Accessor {
                get: None,
                set: Some(Arc::new(f)),
            },
            rule: None,
        }
    }

    /// Create an accessor member from optional getter/setter halves
    pub fn accessor(get: Option<GetterFn>, set: Option<SetterFn>) -> Self {
        Self {
            kind: MemberKind::Accessor { get, set },
            rule: None,
        }
    }

    /// Create a member from an already-built kind
    pub fn from_kind(kind: MemberKind) -> Self {
        Self { kind, rule: None }
    }

    /// Annotate this member with an explicit composition rule
    ///
    /// The annotated rule wins over any rule-table entry or kind default
    /// when this member conflicts with a base member during composition.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// The member's kind
    pub fn kind(&self) -> &MemberKind {
        &self.kind
    }

    /// The explicit composition-rule annotation, if any
    pub fn rule(&self) -> Option<&Rule> {
        self.rule.as_ref()
    }

    /// Whether this member is a method
    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method(_))
    }

    /// Whether this member is an accessor pair
    pub fn is_accessor(&self) -> bool {
        matches!(self.kind, MemberKind::Accessor { .. })
    }

    /// The method body, if this member is a method
    pub fn as_method(&self) -> Option<&MethodFn> {
        match &self.kind {
            MemberKind::Method(f) => Some(f),
            _ => None,
        }
    }

    /// The accessor halves, if this member is an accessor
    pub fn as_accessor(&self) -> Option<(Option<&GetterFn>, Option<&SetterFn>)> {
        match &self.kind {
            MemberKind::Accessor { get, set } => Some((get.as_ref(), set.as_ref())),
            _ => None,
        }
    }

    /// Check that the member is well-formed (used on rule output)
    ///
    /// An accessor with neither getter nor setter is not installable.
    pub(crate) fn validate(&self, name: &str) -> EngineResult<()> {
        if let MemberKind::Accessor {
            get: None,
            set: None,
        } = self.kind
        {
            return Err(EngineError::InvalidRuleResult {
                name: name.to_string(),
                reason: "accessor with neither getter nor setter".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("kind", &self.kind)
            .field("rule", &self.rule)
            .finish()
    }
}
