//! Runtime instances of composed definitions
//!
//! An instance pairs a definition chain with a plain property bag. Method
//! and accessor dispatch walks the chain; reads and writes of names the
//! chain does not declare fall through to the bag, which is also where
//! member bodies keep their state.

use rustc_hash::FxHashMap;

use crate::definition::DefRef;
use crate::member::MemberKind;
use crate::value::Value;
use crate::{EngineError, EngineResult};

/// A runtime object backed by a composed definition.
#[derive(Debug)]
pub struct Instance {
    definition: DefRef,
    properties: FxHashMap<String, Value>,
}

impl Instance {
    /// Create an instance of the given definition
    pub fn new(definition: DefRef) -> Self {
        Self {
            definition,
            properties: FxHashMap::default(),
        }
    }

    /// The instance's definition chain
    pub fn definition(&self) -> &DefRef {
        &self.definition
    }

    /// Invoke a method member by name.
    ///
    /// Errors from the member body propagate unchanged to the caller; the
    /// engine never intercepts them.
    pub fn call(&mut self, name: &str, args: &[Value]) -> EngineResult<Value> {
        let definition = self.definition.clone();
        match definition.find_member(name) {
            Some(member) => match member.kind() {
                MemberKind::Method(f) => {
                    let f = f.clone();
                    f(self, args)
                }
                MemberKind::Accessor { .. } => Err(EngineError::NotCallable(name.to_string())),
            },
            None => Err(EngineError::UnknownMember(name.to_string())),
        }
    }

    /// Read a property.
    ///
    /// Routes through the chain's getter when one is declared; names the
    /// chain does not declare read from the property bag (`Undefined` when
    /// absent).
    pub fn get(&self, name: &str) -> EngineResult<Value> {
        let definition = self.definition.clone();
        match definition.find_member(name) {
            Some(member) => match member.kind() {
                MemberKind::Accessor { get: Some(g), .. } => {
                    let g = g.clone();
                    g(self)
                }
                MemberKind::Accessor { get: None, .. } => {
                    Err(EngineError::NotReadable(name.to_string()))
                }
                MemberKind::Method(_) => Err(EngineError::NotAProperty(name.to_string())),
            },
            None => Ok(self
                .properties
                .get(name)
                .cloned()
                .unwrap_or(Value::Undefined)),
        }
    }

    /// Write a property.
    ///
    /// Routes through the chain's setter when one is declared; names the
    /// chain does not declare write to the property bag.
    pub fn set(&mut self, name: &str, value: Value) -> EngineResult<()> {
        let definition = self.definition.clone();
        match definition.find_member(name) {
            Some(member) => match member.kind() {
                MemberKind::Accessor { set: Some(s), .. } => {
                    let s = s.clone();
                    s(self, value)
                }
                MemberKind::Accessor { set: None, .. } => {
                    Err(EngineError::NotWritable(name.to_string()))
                }
                MemberKind::Method(_) => Err(EngineError::NotAProperty(name.to_string())),
            },
            None => {
                self.properties.insert(name.to_string(), value);
                Ok(())
            }
        }
    }

    /// Whether the chain or the property bag exposes this name
    pub fn has_property(&self, name: &str) -> bool {
        self.definition.has_member(name) || self.properties.contains_key(name)
    }

    /// Read a bag entry directly, bypassing accessors
    pub fn own_property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Write a bag entry directly, bypassing accessors
    pub fn set_own_property(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }
}
