//! Unused-key guard.
//!
//! "Consumed pointers" are JSON Pointer prefixes of keys the code actually
//! reads. Any leaf in the effective config not under a consumed prefix is
//! unused: usually a typo (`max_capcity`) that would otherwise silently fall
//! back to a default.
//!
//! Callers pick `Warn` (report only) or `Fail` (error out).

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Must match what `settings::AllocationSettings::from_config_json` reads.
static CONSUMED: &[&str] = &[
    "/allocation/max_capacity",
    "/allocation/max_rounds",
    "/export/delimiter",
    "/export/allocations_file",
    "/export/unallocated_file",
    "/export/manifest_file",
];

pub fn consumed_pointers() -> &'static [&'static str] {
    CONSUMED
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnusedKeyReport {
    /// Sorted, unique.
    pub consumed_prefixes: Vec<String>,
    /// Sorted.
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let consumed: BTreeSet<String> = CONSUMED.iter().map(|p| normalize_pointer(p)).collect();
    let consumed_prefixes: Vec<String> = consumed.into_iter().collect();

    let mut leaves = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|leaf| !consumed_prefixes.iter().any(|p| is_prefix_pointer(p, leaf)))
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        consumed_prefixes,
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s): {:?}",
            report.unused_leaf_pointers.len(),
            report
                .unused_leaf_pointers
                .iter()
                .take(12)
                .collect::<Vec<_>>()
        );
    }

    Ok(report)
}

/// Leading "/" always, trailing "/" never (except the root pointer).
fn normalize_pointer(p: &str) -> String {
    let t = p.trim().trim_end_matches('/');
    if t.is_empty() {
        return "/".to_string();
    }
    if t.starts_with('/') {
        t.to_string()
    } else {
        format!("/{t}")
    }
}

/// "/a/b" covers "/a/b" and "/a/b/c" but not "/a/bc".
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if prefix == "/" || leaf == prefix {
        return true;
    }
    leaf.strip_prefix(prefix)
        .map(|rest| rest.starts_with('/'))
        .unwrap_or(false)
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) if !map.is_empty() => {
            for (k, child) in map {
                let token = k.replace('~', "~0").replace('/', "~1");
                collect_leaf_pointers(child, &format!("{prefix}/{token}"), out);
            }
        }
        Value::Array(arr) if !arr.is_empty() => {
            for (i, child) in arr.iter().enumerate() {
                collect_leaf_pointers(child, &format!("{prefix}/{i}"), out);
            }
        }
        // The empty root object has no leaves.
        Value::Object(_) if prefix.is_empty() => {}
        _ => out.push(if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.to_string()
        }),
    }
}
