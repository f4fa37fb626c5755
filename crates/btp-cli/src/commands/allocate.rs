//! `btp allocate`: config -> ingest -> allocate -> verify -> export.
//!
//! Fail-closed: if the outcome breaks any allocation invariant nothing is
//! written and the command exits non-zero.

use anyhow::{bail, Result};
use btp_alloc::{verify_outcome, Allocator};
use btp_artifacts::{write_run_artifacts, WriteRunArtifactsArgs};
use btp_config::{report_unused_keys, UnusedKeyPolicy};
use std::path::Path;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{load_config, load_sheets, print_ingest_report};

const MANIFEST_SCHEMA_VERSION: i32 = 1;

pub struct AllocateArgs {
    pub students: String,
    pub faculty: String,
    pub config_paths: Vec<String>,
    pub out: String,
    pub capacity: Option<usize>,
    pub rounds: Option<usize>,
    pub strict_config: bool,
}

pub fn run_allocate(args: AllocateArgs) -> Result<()> {
    let loaded = load_config(&args.config_paths)?;

    let policy = if args.strict_config {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let unused = report_unused_keys(&loaded.config_json, policy)?;
    for p in &unused.unused_leaf_pointers {
        warn!(pointer = %p, "config key is not read by anything");
    }

    let settings = loaded.settings()?.with_overrides(args.capacity, args.rounds);
    let params = settings.params()?;

    let (students, faculty) = load_sheets(&args.students, &args.faculty)?;

    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        students = students.students.len(),
        faculties = faculty.order.len(),
        max_capacity = params.max_capacity,
        max_rounds = params.max_rounds,
        "allocation run start"
    );

    // The allocator consumes the lists; verification replays against a copy.
    let original = faculty.preferences.clone();
    let outcome = Allocator::new(params).run(&students.students, faculty.preferences);

    let violations = verify_outcome(&students.students, &original, &outcome, &params);
    if !violations.is_empty() {
        for v in &violations {
            error!(violation = %v, "allocation invariant violated");
        }
        bail!(
            "ALLOCATION_INVARIANT_VIOLATION: {} violation(s); nothing written",
            violations.len()
        );
    }

    let export = &settings.export;
    let res = write_run_artifacts(WriteRunArtifactsArgs {
        out_dir: Path::new(&args.out),
        schema_version: MANIFEST_SCHEMA_VERSION,
        run_id,
        config_hash: &loaded.config_hash,
        students_path: &args.students,
        faculty_path: &args.faculty,
        params: &params,
        outcome: &outcome,
        faculty_order: &faculty.order,
        delimiter: &export.delimiter,
        allocations_file: &export.allocations_file,
        unallocated_file: &export.unallocated_file,
        manifest_file: &export.manifest_file,
    })?;

    let summary = &res.manifest.summary;
    info!(
        %run_id,
        allocated = summary.allocated,
        unallocated = summary.unallocated,
        rounds_executed = summary.rounds_executed,
        "allocation run finished"
    );

    println!("run_id={run_id}");
    println!("config_hash={}", loaded.config_hash);
    println!("max_capacity={}", params.max_capacity);
    println!("max_rounds={}", params.max_rounds);
    print_ingest_report("students", &students.report);
    print_ingest_report("faculty", &faculty.report);
    println!("students={}", summary.students);
    println!("faculties={}", summary.faculties);
    println!("allocated={}", summary.allocated);
    println!("unallocated={}", summary.unallocated);
    println!("faculties_at_capacity={}", summary.faculties_at_capacity);
    println!("rounds_executed={}", summary.rounds_executed);
    println!("allocations_path={}", res.allocations_path.display());
    println!("unallocated_path={}", res.unallocated_path.display());
    println!("manifest_path={}", res.manifest_path.display());

    Ok(())
}
