//! btp-config
//!
//! Layered YAML configuration for allocation runs.
//!
//! - YAML documents are merged in order: earlier docs are the base, later
//!   docs override (maps merge key by key, everything else is replaced).
//! - The merged document is converted to JSON and serialized canonically
//!   (serde_json maps are key-sorted), then hashed with SHA-256 so a run can
//!   record exactly which settings produced it.
//! - No config at all is valid; every setting has a default.

mod consumption;
mod settings;

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

pub use consumption::{consumed_pointers, report_unused_keys, UnusedKeyPolicy, UnusedKeyReport};
pub use settings::{AllocationSettings, ExportSettings};

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Config built from no documents at all (all defaults).
    pub fn empty() -> Result<Self> {
        load_layered_yaml_from_strings(&[])
    }

    pub fn settings(&self) -> Result<AllocationSettings> {
        AllocationSettings::from_config_json(&self.config_json)
    }
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::with_capacity(paths.len());
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for (i, raw) in yaml_docs.iter().enumerate() {
        let v_yaml: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("invalid yaml (layer {i})"))?;
        // An empty document parses as null; treat it as "no overrides".
        if v_yaml.is_null() {
            continue;
        }
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let canonical_json = serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (k, v) in overlay_map {
                let prev = base_map.remove(&k).unwrap_or(Value::Null);
                base_map.insert(k, deep_merge(prev, v));
            }
            Value::Object(base_map)
        }
        (_, other) => other,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_merge_overrides_leaves_and_keeps_siblings() {
        let a = serde_json::json!({"allocation": {"max_capacity": 8, "max_rounds": 5}});
        let b = serde_json::json!({"allocation": {"max_capacity": 4}});
        let m = deep_merge(a, b);
        assert_eq!(m["allocation"]["max_capacity"], 4);
        assert_eq!(m["allocation"]["max_rounds"], 5);
    }

    #[test]
    fn empty_config_has_stable_hash() {
        let a = LoadedConfig::empty().unwrap();
        let b = load_layered_yaml_from_strings(&["", "# comment only\n"]).unwrap();
        assert_eq!(a.canonical_json, "{}");
        assert_eq!(a.config_hash, b.config_hash);
    }

    #[test]
    fn missing_file_error_names_path() {
        let err = load_layered_yaml(&["/no/such/btp.yaml"]).unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/btp.yaml"));
    }
}
