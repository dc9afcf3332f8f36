//! Xcode build-setting merge
//!
//! Later layers override earlier ones key by key. The exception is a key
//! whose *previous* value contains `$(inherited)`: the new value is appended
//! to it instead, and the combined value carries exactly one leading
//! `$(inherited)`.
//!
//! Only the previous value is inspected. A fresh `$(inherited)` in an
//! overriding value replaces the old value verbatim; it starts combining
//! only once a later layer lands on top of it.

use std::sync::OnceLock;

use regex_lite::Regex;
use xcodegen_spec::{ConfigurationMap, INHERITED};

fn inherited_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s*\$\(inherited\)\s*").expect("valid regex"))
}

/// Merge one incoming value onto the value already present for a key.
pub fn merge_value(previous: Option<&str>, next: &str) -> String {
    match previous {
        Some(prev) if prev.contains(INHERITED) => {
            let combined = format!("{} {}", prev, next);
            let collapsed = inherited_pattern().replace_all(&combined, " ");
            let rest = collapsed.trim();
            if rest.is_empty() {
                INHERITED.to_string()
            } else {
                format!("{} {}", INHERITED, rest)
            }
        }
        _ => next.to_string(),
    }
}

/// Merge build-setting layers, lowest precedence first.
pub fn merge_configs<'a, I>(layers: I) -> ConfigurationMap
where
    I: IntoIterator<Item = &'a ConfigurationMap>,
{
    let mut merged = ConfigurationMap::new();
    for layer in layers {
        for (key, value) in layer {
            let next = merge_value(merged.get(key).map(String::as_str), value);
            merged.insert(key.clone(), next);
        }
    }
    merged
}
