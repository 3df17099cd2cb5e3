//! Attribute/property name conversion
//!
//! Attributes are hyphenated (`custom-property`), properties are camelCase
//! (`customProperty`). Marshalling between the two happens on every
//! attribute change, so the regexes are compiled once.

use once_cell::sync::Lazy;
use regex::Regex;

static HYPHENATED: Lazy<Regex> = Lazy::new(|| Regex::new(r"-([a-z])").expect("valid pattern"));

static CAMEL_HUMP: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid pattern"));

/// Convert a hyphenated attribute name to a camelCase property name.
///
/// `custom-property` becomes `customProperty`.
pub fn attribute_to_property_name(attribute_name: &str) -> String {
    HYPHENATED
        .replace_all(attribute_name, |captures: &regex::Captures<'_>| {
            captures[1].to_uppercase()
        })
        .into_owned()
}

/// Convert a camelCase property name to a hyphenated attribute name.
///
/// `customProperty` becomes `custom-property`.
pub fn property_to_attribute_name(property_name: &str) -> String {
    CAMEL_HUMP
        .replace_all(property_name, |captures: &regex::Captures<'_>| {
            format!("{}-{}", &captures[1], captures[2].to_lowercase())
        })
        .into_owned()
}
