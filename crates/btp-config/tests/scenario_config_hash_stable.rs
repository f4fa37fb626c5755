//! Scenario: config hash stability
//!
//! GREEN when:
//! - Loading the same layers twice yields the same hash and canonical JSON.
//! - Reordering keys inside a YAML document does not change the hash.
//! - Changing a value changes the hash.
//! - An overlay layer overrides the base and the merged hash is stable.

use btp_config::load_layered_yaml_from_strings;

const BASE_YAML: &str = r#"
allocation:
  max_capacity: 8
  max_rounds: 5
export:
  delimiter: ", "
  allocations_file: "allocations.csv"
  unallocated_file: "unallocated_students.csv"
"#;

const BASE_YAML_REORDERED: &str = r#"
export:
  unallocated_file: "unallocated_students.csv"
  delimiter: ", "
  allocations_file: "allocations.csv"
allocation:
  max_rounds: 5
  max_capacity: 8
"#;

const OVERLAY_YAML: &str = r#"
allocation:
  max_capacity: 6
export:
  delimiter: "; "
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn reordered_keys_produce_same_hash() {
    let original = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let reordered = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(
        original.config_hash, reordered.config_hash,
        "key order in source must not change the hash"
    );
}

#[test]
fn different_values_produce_different_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, "allocation:\n  max_rounds: 4\n"]).unwrap();
    assert_ne!(a.config_hash, b.config_hash);
}

#[test]
fn overlay_overrides_base_and_keeps_siblings() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);

    let s = a.settings().unwrap();
    assert_eq!(s.max_capacity, 6, "overlay wins");
    assert_eq!(s.max_rounds, 5, "base sibling kept");
    assert_eq!(s.export.delimiter, "; ");
    assert_eq!(s.export.allocations_file, "allocations.csv");
}

#[test]
fn hash_is_64_hex_chars() {
    let loaded = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(loaded.config_hash.len(), 64);
    assert!(loaded.config_hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn layered_files_match_layered_strings() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let overlay = dir.path().join("overlay.yaml");
    std::fs::write(&base, BASE_YAML).unwrap();
    std::fs::write(&overlay, OVERLAY_YAML).unwrap();

    let base_s = base.to_string_lossy().to_string();
    let overlay_s = overlay.to_string_lossy().to_string();
    let from_files = btp_config::load_layered_yaml(&[base_s.as_str(), overlay_s.as_str()]).unwrap();
    let from_strings = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(from_files.config_hash, from_strings.config_hash);
}
