//! Typed view over the merged config JSON.
//!
//! Keys read (all optional):
//!
//! | pointer                     | default                      |
//! |-----------------------------|------------------------------|
//! | `/allocation/max_capacity`  | 8                            |
//! | `/allocation/max_rounds`    | 5                            |
//! | `/export/delimiter`         | `", "`                       |
//! | `/export/allocations_file`  | `allocations.csv`            |
//! | `/export/unallocated_file`  | `unallocated_students.csv`   |
//! | `/export/manifest_file`     | `manifest.json`              |
//!
//! Keep this table in sync with `consumption::CONSUMED`.

use anyhow::{anyhow, bail, Result};
use btp_alloc::{AllocationParams, MAX_CAPACITY, MAX_ROUNDS};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_DELIMITER: &str = ", ";
pub const DEFAULT_ALLOCATIONS_FILE: &str = "allocations.csv";
pub const DEFAULT_UNALLOCATED_FILE: &str = "unallocated_students.csv";
pub const DEFAULT_MANIFEST_FILE: &str = "manifest.json";

/// Where and how results are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSettings {
    /// Joins student ids inside one faculty cell.
    pub delimiter: String,
    pub allocations_file: String,
    pub unallocated_file: String,
    pub manifest_file: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            allocations_file: DEFAULT_ALLOCATIONS_FILE.to_string(),
            unallocated_file: DEFAULT_UNALLOCATED_FILE.to_string(),
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationSettings {
    pub max_capacity: usize,
    pub max_rounds: usize,
    pub export: ExportSettings,
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            max_capacity: MAX_CAPACITY,
            max_rounds: MAX_ROUNDS,
            export: ExportSettings::default(),
        }
    }
}

impl AllocationSettings {
    pub fn from_config_json(v: &Value) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            max_capacity: read_limit(v, "/allocation/max_capacity", d.max_capacity)?,
            max_rounds: read_limit(v, "/allocation/max_rounds", d.max_rounds)?,
            export: ExportSettings {
                delimiter: read_str(v, "/export/delimiter", &d.export.delimiter, true)?,
                allocations_file: read_str(
                    v,
                    "/export/allocations_file",
                    &d.export.allocations_file,
                    false,
                )?,
                unallocated_file: read_str(
                    v,
                    "/export/unallocated_file",
                    &d.export.unallocated_file,
                    false,
                )?,
                manifest_file: read_str(v, "/export/manifest_file", &d.export.manifest_file, false)?,
            },
        })
    }

    /// Replace limits with command-line overrides where given.
    pub fn with_overrides(mut self, max_capacity: Option<usize>, max_rounds: Option<usize>) -> Self {
        if let Some(c) = max_capacity {
            self.max_capacity = c;
        }
        if let Some(r) = max_rounds {
            self.max_rounds = r;
        }
        self
    }

    pub fn params(&self) -> Result<AllocationParams> {
        AllocationParams::new(self.max_capacity, self.max_rounds)
            .map_err(|e| anyhow!("CONFIG_INVALID_LIMITS: {e}"))
    }
}

/// Positive integer at `ptr`, or `default` when absent.
fn read_limit(v: &Value, ptr: &str, default: usize) -> Result<usize> {
    match v.pointer(ptr) {
        None | Some(Value::Null) => Ok(default),
        Some(x) => {
            let n = x
                .as_u64()
                .ok_or_else(|| anyhow!("CONFIG_TYPE_ERROR {ptr}: expected a non-negative integer, got {x}"))?;
            if n == 0 {
                bail!("CONFIG_INVALID_LIMITS {ptr}: must be > 0");
            }
            usize::try_from(n).map_err(|_| anyhow!("CONFIG_TYPE_ERROR {ptr}: {n} out of range"))
        }
    }
}

/// String at `ptr`, or `default` when absent. Empty strings are rejected
/// unless `allow_empty`.
fn read_str(v: &Value, ptr: &str, default: &str, allow_empty: bool) -> Result<String> {
    match v.pointer(ptr) {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::String(s)) => {
            if !allow_empty && s.trim().is_empty() {
                bail!("CONFIG_INVALID_VALUE {ptr}: must not be empty");
            }
            Ok(s.clone())
        }
        Some(x) => bail!("CONFIG_TYPE_ERROR {ptr}: expected a string, got {x}"),
    }
}
