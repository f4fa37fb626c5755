//! Command handler modules for btp-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod allocate;
pub mod inspect;

use anyhow::{bail, Context, Result};
use btp_config::LoadedConfig;
use btp_ingest::{FacultySheet, IngestReport, StudentSheet};
use std::path::Path;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Layered config from `paths`, or all defaults when none are given.
pub fn load_config(paths: &[String]) -> Result<LoadedConfig> {
    if paths.is_empty() {
        return LoadedConfig::empty();
    }
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    btp_config::load_layered_yaml(&path_refs)
}

/// Both sheets must be present before anything runs.
pub fn load_sheets(students: &str, faculty: &str) -> Result<(StudentSheet, FacultySheet)> {
    for (label, p) in [("students", students), ("faculty", faculty)] {
        if p.trim().is_empty() {
            bail!("missing --{label} sheet path");
        }
    }

    let s = btp_ingest::parse_students_file(Path::new(students))
        .with_context(|| format!("read students sheet failed: {students}"))?;
    let f = btp_ingest::parse_faculty_file(Path::new(faculty))
        .with_context(|| format!("read faculty sheet failed: {faculty}"))?;
    Ok((s, f))
}

pub fn print_ingest_report(prefix: &str, r: &IngestReport) {
    println!(
        "{prefix} rows_read={} rows_ok={} rows_skipped_blank_id={} duplicate_ids={} blank_cells_dropped={}",
        r.rows_read,
        r.rows_ok,
        r.rows_skipped_blank_id,
        r.duplicate_ids.len(),
        r.blank_cells_dropped
    );
}
