//! Template filling and build-file generation.
//!
//! The fill engine is deliberately dumb: a flat key→value mapping whose
//! `{{key}}` placeholders are substituted literally. Anything structural
//! (library discovery, firmware targets) is generated in code by the
//! [`cmake`] module.

pub mod assets;
pub mod cmake;

use std::collections::BTreeMap;

/// Substitute every `{{key}}` placeholder with its mapped value.
///
/// Unknown placeholders are left in place.
pub fn fill(template: &str, data: &BTreeMap<&str, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in data {
        out = out.replace(&format!("{{{{{}}}}}", key), value);
    }
    out
}
