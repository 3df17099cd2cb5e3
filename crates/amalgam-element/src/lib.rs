//! Custom-element lifecycle adapter
//!
//! Thin glue between composed definitions (`amalgam-core`) and an external
//! custom-element runtime:
//! - [`ElementHost`] — the narrow callback contract the runtime provides
//! - [`Element`] — creation-time template stamping, attribute marshalling
//!   and `createdCallback` dispatch
//! - name conversion between hyphenated attributes and camelCase properties
//!
//! The element registry, the DOM tree and rendering are out of scope; the
//! adapter only consumes lifecycle notifications and issues stamping calls
//! through the host trait.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod element;
pub mod host;
pub mod names;

pub use element::{element_base, Element, CREATED_CALLBACK, TEMPLATE_MEMBER};
pub use host::{ElementHost, MemoryHost};
pub use names::{attribute_to_property_name, property_to_attribute_name};
