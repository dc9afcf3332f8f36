//! Bundle identifier naming convention
//!
//! `EXFoo` -> `expo.foo`, `UMBar_Baz` -> `unimodules.bar.baz`. This is a
//! naming convention, not a slugifier: it is neither reversible nor
//! collision-free.

use std::sync::OnceLock;

use regex_lite::{Captures, Regex};

const PREFIXES: &[(&str, &str)] = &[("UM", "unimodules"), ("EX", "expo")];

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^A-Za-z0-9.]+").expect("valid regex"))
}

fn uppercase_run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\.*([A-Z]+)").expect("valid regex"))
}

/// Derive a bundle identifier from a pod name
pub fn pod_name_to_bundle_id(pod_name: &str) -> String {
    let mut name = pod_name.to_string();
    for (prefix, namespace) in PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            name = format!("{}{}", namespace, rest);
        }
    }

    let dotted = separator_pattern().replace_all(&name, ".");
    uppercase_run_pattern()
        .replace_all(&dotted, |caps: &Captures| format!(".{}", caps[1].to_lowercase()))
        .into_owned()
}
